//! Frequency-domain convolution: a block DFT convolver and a streaming
//! overlap-add wrapper.
//!
//! Convolving a signal with an m-tap filter costs O(m) per sample in the
//! time domain. In the frequency domain a whole block is convolved with two
//! FFTs and a point-wise multiply, which amortises to
//! O((w + m) log(w + m) / w) per sample for window size w.
//!
//! # Overlap-add
//!
//! Each input window of `window_size` samples convolves to
//! `window_size + filter_size - 1` outputs, so consecutive blocks overlap by
//! `filter_size - 1` samples. The streaming wrapper sums the overlapping
//! tails in a circular output buffer:
//!
//! ```text
//!            block k            block k+1
//!   ring: [ fresh ........ | tail of k ...... ]
//!            ^ read here      ^ summed when k+1 lands
//! ```
//!
//! Slots that have already been read are zeroed before the next block is
//! accumulated, so every output is the sum of exactly the blocks that
//! overlap it.

use std::sync::Arc;

use rayon::prelude::*;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::dsp::{Audio, Filter};

/// Block convolution engine: multiply by a pre-transformed filter spectrum.
///
/// Callers stage samples into `input[0..input_size]`, call
/// [`run_filter`](Self::run_filter), and read `output[0..output_size]`.
/// The filter's spectrum is computed once at construction and never touched
/// again; both real buffers stay zero beyond their valid regions.
pub struct DftConvolver<S: Audio> {
    pub input_size: usize,
    pub filter_size: usize,
    /// `input_size + filter_size - 1`.
    pub output_size: usize,
    /// Next power of two at or above `output_size`.
    pub fft_size: usize,

    /// Time-domain staging area, length `fft_size`.
    pub input: Vec<S>,
    /// Time-domain result, length `fft_size`; valid in `[0, output_size)`.
    pub output: Vec<S>,

    spectrum: Vec<Complex<S>>,
    filter_spectrum: Vec<Complex<S>>,
    scratch: Vec<Complex<S>>,
    forward: Arc<dyn Fft<S>>,
    inverse: Arc<dyn Fft<S>>,
}

impl<S: Audio> DftConvolver<S> {
    pub fn new(input_size: usize, filter_coeffs: &[S]) -> Self {
        assert!(input_size >= 1, "convolver window must hold a sample");
        assert!(!filter_coeffs.is_empty(), "convolver needs filter taps");

        let filter_size = filter_coeffs.len();
        let output_size = input_size + filter_size - 1;
        let fft_size = output_size.next_power_of_two();

        let mut planner = FftPlanner::<S>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::new(S::zero(), S::zero()); scratch_len];

        // Transform the zero-padded filter once; the spectrum is immutable
        // from here on.
        let mut filter_spectrum = vec![Complex::new(S::zero(), S::zero()); fft_size];
        for (slot, &coeff) in filter_spectrum.iter_mut().zip(filter_coeffs.iter()) {
            slot.re = coeff;
        }
        forward.process_with_scratch(&mut filter_spectrum, &mut scratch);

        Self {
            input_size,
            filter_size,
            output_size,
            fft_size,
            input: vec![S::zero(); fft_size],
            output: vec![S::zero(); fft_size],
            spectrum: vec![Complex::new(S::zero(), S::zero()); fft_size],
            filter_spectrum,
            scratch,
            forward,
            inverse,
        }
    }

    /// Convolve the staged input block with the filter.
    ///
    /// Forward transform, point-wise spectrum multiply, inverse transform.
    /// The inverse pass is unnormalised, so the result is scaled by
    /// `1 / fft_size` on the way out.
    pub fn run_filter(&mut self) {
        for (slot, &x) in self.spectrum.iter_mut().zip(self.input.iter()) {
            *slot = Complex::new(x, S::zero());
        }
        self.forward
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        self.spectrum
            .par_iter_mut()
            .zip(self.filter_spectrum.par_iter())
            .for_each(|(bin, &filter_bin)| *bin *= filter_bin);

        self.inverse
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let norm = S::one() / S::lit(self.fft_size as f64);
        for (out, bin) in self.output.iter_mut().zip(self.spectrum.iter()) {
            *out = bin.re * norm;
        }
    }
}

/// Streaming convolution with constant amortised per-sample cost.
///
/// Buffers `window_size` samples, convolves the block in the frequency
/// domain, and overlap-adds the result into a circular output buffer.
/// Latency is `window_size - 1` samples: the first window's outputs only
/// become available once the window fills.
pub struct OverlapAddConvolver<S: Audio> {
    pub window_size: usize,
    /// `filter_size - 1`: how far each block's tail reaches into the next.
    pub num_transients: usize,
    /// Ring length: `window_size + filter_size - 1`.
    pub output_size: usize,

    convolver: DftConvolver<S>,
    ring: Vec<S>,
    write_idx: usize,
    input_idx: usize,
    output_idx: usize,
}

impl<S: Audio> OverlapAddConvolver<S> {
    pub fn new(window_size: usize, filter_coeffs: &[S]) -> Self {
        let convolver = DftConvolver::new(window_size, filter_coeffs);
        let num_transients = convolver.filter_size - 1;
        let output_size = convolver.output_size;
        Self {
            window_size,
            num_transients,
            output_size,
            convolver,
            ring: vec![S::zero(); output_size],
            write_idx: 0,
            input_idx: 0,
            output_idx: 0,
        }
    }

    /// Zero the ring slots the next block will claim as fresh output.
    /// Everything before them still carries the unread tail of the previous
    /// block and must survive.
    fn ready_output(&mut self) {
        let zero_start = (self.write_idx + self.num_transients) % self.output_size;
        for i in 0..self.window_size {
            self.ring[(zero_start + i) % self.output_size] = S::zero();
        }
    }

    /// Accumulate the convolver's block result so overlapping tails sum to
    /// the full convolution.
    fn write_output(&mut self) {
        for i in 0..self.output_size {
            let idx = (self.write_idx + i) % self.output_size;
            self.ring[idx] += self.convolver.output[i];
        }
        self.output_idx = self.write_idx;
        self.write_idx = (self.write_idx + self.window_size) % self.output_size;
    }
}

impl<S: Audio> Filter<S> for OverlapAddConvolver<S> {
    fn advance(&mut self, input: S) -> S {
        self.convolver.input[self.input_idx] = input;
        self.input_idx += 1;
        if self.input_idx == self.window_size {
            self.input_idx = 0;
            self.convolver.run_filter();
            self.ready_output();
            self.write_output();
        }

        let output = self.ring[self.output_idx];
        self.output_idx = (self.output_idx + 1) % self.output_size;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::run_filter;
    use crate::util::all_close;

    // x = [1, 2, 3, 4, 5] convolved with h = [-1, 1, 3] is
    // [-1, -1, 2, 5, 8, 17, 15].
    const INPUT: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
    const FILTER: [f64; 3] = [-1.0, 1.0, 3.0];
    const EXPECTED: [f64; 7] = [-1.0, -1.0, 2.0, 5.0, 8.0, 17.0, 15.0];

    fn dft_convolver_roundtrip<S: Audio>(tolerance: S) {
        let input: Vec<S> = INPUT.iter().map(|&x| S::lit(x)).collect();
        let filter: Vec<S> = FILTER.iter().map(|&x| S::lit(x)).collect();
        let expected: Vec<S> = EXPECTED.iter().map(|&x| S::lit(x)).collect();

        let mut convolver = DftConvolver::new(input.len(), &filter);
        convolver.input[..input.len()].copy_from_slice(&input);
        convolver.run_filter();

        let out = &convolver.output[..convolver.output_size];
        assert!(all_close(out, &expected, tolerance));
    }

    #[test]
    fn dft_convolver_matches_linear_convolution_f64() {
        dft_convolver_roundtrip::<f64>(1e-10);
    }

    #[test]
    fn dft_convolver_matches_linear_convolution_f32() {
        dft_convolver_roundtrip::<f32>(1e-6);
    }

    #[test]
    fn dft_convolver_sizes() {
        let convolver = DftConvolver::new(5, &FILTER);
        assert_eq!(convolver.output_size, 7);
        assert_eq!(convolver.fft_size, 8);
    }

    #[test]
    fn overlap_add_window_two() {
        // Ring-buffer start-up offsets the stream by one leading zero.
        let mut convolver = OverlapAddConvolver::new(2, &FILTER);
        let out = run_filter(&mut convolver, &INPUT, 4);
        let expected = [0.0, -1.0, -1.0, 2.0, 5.0, 8.0, 17.0, 15.0, 0.0];
        assert!(all_close(&out, &expected, 1e-10));
    }

    #[test]
    fn overlap_add_window_three() {
        // Latency is window_size - 1, hence two leading zeros.
        let mut convolver = OverlapAddConvolver::new(3, &FILTER);
        let out = run_filter(&mut convolver, &INPUT, 5);
        let expected = [0.0, 0.0, -1.0, -1.0, 2.0, 5.0, 8.0, 17.0, 15.0, 0.0];
        assert!(all_close(&out, &expected, 1e-10));
    }

    #[test]
    fn overlap_add_long_signal_matches_direct_convolution() {
        // A longer ramp through a window that doesn't divide its length.
        let input: Vec<f64> = (0..23).map(|i| (i as f64 * 0.37).sin()).collect();
        let filter = [0.5, -0.25, 0.125, 1.0];
        let mut direct = vec![0.0f64; input.len() + filter.len() - 1];
        for (i, &x) in input.iter().enumerate() {
            for (j, &h) in filter.iter().enumerate() {
                direct[i + j] += x * h;
            }
        }

        let window_size = 4;
        let mut convolver = OverlapAddConvolver::new(window_size, &filter);
        let padding = window_size - 1;
        let out = run_filter(&mut convolver, &input, filter.len() - 1 + padding + 1);
        // Strip the start-up latency before comparing.
        assert!(all_close(
            &out[padding..padding + direct.len()],
            &direct,
            1e-10
        ));
    }
}
