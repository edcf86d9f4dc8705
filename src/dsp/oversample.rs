//! Fixed 4x interpolation/decimation for anti-aliased non-linear stages.
//!
//! Non-linear waveshaping creates harmonics above Nyquist that fold back
//! into the audible band. Running the shaper at four times the sample rate
//! keeps those harmonics representable; a sharp FIR lowpass then removes
//! them before decimating back down.
//!
//! One [`OverlapAddConvolver`] carries the anti-imaging and anti-aliasing
//! duty for both directions: interpolation pushes the input followed by
//! three zeros (then scales by the up-factor to restore amplitude), and
//! decimation pushes four samples and keeps the last output.

use crate::dsp::convolve::OverlapAddConvolver;
use crate::dsp::{Audio, Filter};

/// Fixed oversampling factor. The interpolation filter below is designed
/// for exactly this ratio.
pub const UP_FACTOR: usize = 4;

/// Tap count of the interpolation lowpass. Odd, so the filter is symmetric
/// around a whole-sample group delay.
pub const INTERP_FIR_TAPS: usize = 769;

/// Windowed-sinc lowpass for 4x interpolation: cutoff at the original
/// Nyquist (1/8 of the oversampled rate), Blackman window, taps normalised
/// to unity DC gain.
pub fn interpolation_fir<S: Audio>(taps: usize, factor: usize) -> Vec<S> {
    assert!(taps % 2 == 1, "interpolation filter needs odd symmetry");
    assert!(factor >= 2, "interpolation factor must upsample");

    let cutoff = 1.0 / (2.0 * factor as f64);
    let mid = (taps / 2) as f64;
    let span = (taps - 1) as f64;

    let mut coeffs: Vec<f64> = (0..taps)
        .map(|n| {
            let t = n as f64 - mid;
            let sinc = if t == 0.0 {
                2.0 * cutoff
            } else {
                (2.0 * std::f64::consts::PI * cutoff * t).sin() / (std::f64::consts::PI * t)
            };
            let phase = 2.0 * std::f64::consts::PI * n as f64 / span;
            let window = 0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos();
            sinc * window
        })
        .collect();

    let sum: f64 = coeffs.iter().sum();
    for coeff in &mut coeffs {
        *coeff /= sum;
    }
    coeffs.into_iter().map(S::lit).collect()
}

/// Paired 4x interpolator and decimator sharing one convolver.
pub struct PairedInterpolatorDecimator<S: Audio> {
    convolver: OverlapAddConvolver<S>,
}

impl<S: Audio> PairedInterpolatorDecimator<S> {
    pub fn new(window_size: usize) -> Self {
        let filter = interpolation_fir::<S>(INTERP_FIR_TAPS, UP_FACTOR);
        Self {
            convolver: OverlapAddConvolver::new(window_size, &filter),
        }
    }

    /// Expand one sample into `UP_FACTOR` consecutive oversampled outputs:
    /// zero-stuff, lowpass, and scale by the up-factor to restore level.
    pub fn interpolate(&mut self, input: S) -> [S; UP_FACTOR] {
        let scale = S::lit(UP_FACTOR as f64);
        let mut block = [S::zero(); UP_FACTOR];
        for (i, slot) in block.iter_mut().enumerate() {
            let fed = if i == 0 { input } else { S::zero() };
            *slot = scale * self.convolver.advance(fed);
        }
        block
    }

    /// Collapse `UP_FACTOR` oversampled samples back to one: lowpass, then
    /// keep only the final output.
    pub fn decimate(&mut self, block: [S; UP_FACTOR]) -> S {
        let mut output = S::zero();
        for input in block {
            output = self.convolver.advance(input);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolation_fir_has_unity_dc_gain() {
        let coeffs = interpolation_fir::<f64>(INTERP_FIR_TAPS, UP_FACTOR);
        assert_eq!(coeffs.len(), INTERP_FIR_TAPS);
        let sum: f64 = coeffs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn interpolation_fir_is_symmetric() {
        let coeffs = interpolation_fir::<f64>(129, UP_FACTOR);
        for i in 0..coeffs.len() / 2 {
            let mirrored = coeffs[coeffs.len() - 1 - i];
            assert!(
                (coeffs[i] - mirrored).abs() < 1e-15,
                "tap {i} not mirrored"
            );
        }
    }

    #[test]
    fn interpolate_then_decimate_stays_finite() {
        let mut interp_dec = PairedInterpolatorDecimator::<f64>::new(2);
        for &x in &[1.0, 2.0, 3.0, 4.0, 5.0] {
            let block = interp_dec.interpolate(x);
            for sample in block {
                assert!(sample.is_finite());
            }
            let out = interp_dec.decimate(block);
            assert!(out.is_finite());
        }
    }

    #[test]
    fn interpolator_passes_dc_after_settling() {
        // Feed a constant; once the filter's group delay has elapsed the
        // oversampled stream should settle near the same constant.
        let mut interp_dec = PairedInterpolatorDecimator::<f32>::new(64);
        let mut last = [0.0f32; UP_FACTOR];
        for _ in 0..2000 {
            last = interp_dec.interpolate(1.0);
        }
        for sample in last {
            assert!((sample - 1.0).abs() < 0.05, "settled at {sample}");
        }
    }
}
