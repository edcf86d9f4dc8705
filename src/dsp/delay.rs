//! Delay lines: the FIR tapped delay line and the fractionally-interpolated
//! time-varying delay.
//!
//! Both keep a fixed-capacity circular buffer with a single write position.
//! Read positions are computed relative to the write position with
//! wrap-around, and the buffer is written after the taps are read, so a tap
//! at the full buffer length still sees the oldest sample.

use num_traits::{Float, ToPrimitive, Zero};

use crate::dsp::{Filter, FirFilter, Sample};

/// FIR filter realised as a tapped delay line.
///
/// Given delays `[m_1, .., m_k]` and coefficients `[b_0, b_1, .., b_k]`
/// (the extra leading coefficient is the zero-delay tap), each sample
/// produces
///
/// ```text
/// y[n] = b_0 * x[n] + sum_i b_i * x[n - m_i]
/// ```
pub struct TappedDelayLine<S> {
    delays: Vec<usize>,
    coeffs: Vec<S>,
    buffer: Vec<S>,
    write_pos: usize,
}

impl<S: Sample> TappedDelayLine<S> {
    /// Buffer capacity is the largest delay (1 if there are no taps).
    ///
    /// Asserts `coeffs.len() == delays.len() + 1` and that every tap delay
    /// is at least one sample (the zero-delay tap is `b_0`).
    pub fn new(delays: Vec<usize>, coeffs: Vec<S>) -> Self {
        assert_eq!(
            coeffs.len(),
            delays.len() + 1,
            "need one coefficient per tap plus the zero-delay tap"
        );
        assert!(
            delays.iter().all(|&delay| delay >= 1),
            "tap delays must be at least one sample"
        );
        let capacity = delays.iter().copied().max().unwrap_or(1);
        Self {
            delays,
            coeffs,
            buffer: vec![S::zero(); capacity],
            write_pos: 0,
        }
    }

    pub fn delays(&self) -> &[usize] {
        &self.delays
    }

    pub fn coeffs(&self) -> &[S] {
        &self.coeffs
    }
}

impl<S: Sample> Filter<S> for TappedDelayLine<S> {
    fn advance(&mut self, input: S) -> S {
        let capacity = self.buffer.len();
        let mut output = self.coeffs[0] * input;
        for (&delay, &coeff) in self.delays.iter().zip(self.coeffs[1..].iter()) {
            let read_pos = (self.write_pos + capacity - delay) % capacity;
            output += coeff * self.buffer[read_pos];
        }
        self.buffer[self.write_pos] = input;
        self.write_pos = (self.write_pos + 1) % capacity;
        output
    }
}

impl<S: Sample> FirFilter<S> for TappedDelayLine<S> {
    fn max_delay(&self) -> usize {
        self.delays.iter().copied().max().unwrap_or(0)
    }
}

/// Delay line whose delay varies per sample, with linear interpolation
/// between adjacent buffer slots:
///
/// ```text
/// y[n] = a * x[n] + b * x[n - m[n]]
/// ```
///
/// where `m[n]` is a fractional delay sequence. Linear interpolation may
/// dull high-bandwidth content at low sample rates, but it sounds fine for
/// most audio work.
pub struct TimeVaryingDelay<S: Sample> {
    max_delay: usize,
    input_coeff: S,
    delay_coeff: S,
    buffer: Vec<S>,
    write_pos: usize,
}

impl<S: Sample> TimeVaryingDelay<S> {
    pub fn new(max_delay: usize, input_coeff: S, delay_coeff: S) -> Self {
        assert!(max_delay >= 1, "time-varying delay needs a non-empty buffer");
        Self {
            max_delay,
            input_coeff,
            delay_coeff,
            buffer: vec![S::zero(); max_delay],
            write_pos: 0,
        }
    }

    pub fn max_delay(&self) -> usize {
        self.max_delay
    }

    /// Produce the next output for `input` at a fractional `delay`.
    ///
    /// Asserts `0 <= floor(delay)` and `floor(delay) + 1 <= max_delay`.
    pub fn advance(&mut self, input: S, delay: S::Real) -> S {
        assert!(
            delay >= S::Real::zero(),
            "fractional delay must be non-negative"
        );
        let lower_delay = delay.floor();
        let lower = lower_delay
            .to_usize()
            .unwrap_or_else(|| panic!("fractional delay out of range"));
        let upper = lower + 1;
        assert!(
            upper <= self.max_delay,
            "fractional delay exceeds the maximum of {}",
            self.max_delay
        );
        let frac = delay - lower_delay;

        let capacity = self.buffer.len();
        let newer = if lower == 0 {
            input
        } else {
            self.buffer[(self.write_pos + capacity - lower) % capacity]
        };
        let older = self.buffer[(self.write_pos + capacity - upper) % capacity];
        let interpolated = older + (newer - older).scale(frac);

        let output = self.input_coeff * input + self.delay_coeff * interpolated;

        self.buffer[self.write_pos] = input;
        self.write_pos = (self.write_pos + 1) % capacity;
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{process_fir, VecSink, VecSource};
    use crate::util::all_close;
    use num_complex::Complex;

    #[test]
    fn tapped_delay_line_convolves() {
        // h = [4, 5, 7] against x = [1, 2, 3, 4]: y = [4, 13, 29, 45, 41, 28].
        let mut tdl = TappedDelayLine::new(vec![1, 2], vec![4.0, 5.0, 7.0]);
        let mut source = VecSource::new(vec![1.0, 2.0, 3.0, 4.0]);
        let mut sink = VecSink::with_capacity(6);
        process_fir(&mut tdl, &mut source, &mut sink);
        assert_eq!(sink.samples, vec![4.0, 13.0, 29.0, 45.0, 41.0, 28.0]);
    }

    #[test]
    fn tapped_delay_line_convolves_complex() {
        let real = |x: f64| Complex::new(x, 0.0);
        let mut tdl = TappedDelayLine::new(
            vec![1, 2],
            vec![real(4.0), real(5.0), real(7.0)],
        );
        let input: Vec<_> = [1.0, 2.0, 3.0, 4.0]
            .iter()
            .map(|&x| Complex::new(x, x))
            .collect();
        let mut source = VecSource::new(input);
        let mut sink = VecSink::with_capacity(6);
        process_fir(&mut tdl, &mut source, &mut sink);
        let expected: Vec<_> = [4.0, 13.0, 29.0, 45.0, 41.0, 28.0]
            .iter()
            .map(|&x| Complex::new(x, x))
            .collect();
        assert_eq!(sink.samples, expected);
    }

    #[test]
    fn tapped_delay_line_without_taps_scales() {
        let mut tdl = TappedDelayLine::new(vec![], vec![2.5f64]);
        assert_eq!(tdl.max_delay(), 0);
        let out = crate::stream::run_filter(&mut tdl, &[1.0, -2.0], 0);
        assert_eq!(out, vec![2.5, -5.0]);
    }

    #[test]
    #[should_panic(expected = "one coefficient per tap")]
    fn tapped_delay_line_rejects_size_mismatch() {
        let _ = TappedDelayLine::new(vec![1, 2], vec![1.0f64, 2.0]);
    }

    #[test]
    fn whole_sample_delay_reads_older_slot() {
        // At frac = 0 the interpolation lands on the older tap, so a
        // requested delay of d yields x[n - (d + 1)].
        let mut line = TimeVaryingDelay::new(4, 0.0f64, 1.0);
        let input = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out: Vec<f64> = input.iter().map(|&x| line.advance(x, 2.0)).collect();
        assert!(all_close(&out, &[0.0, 0.0, 0.0, 1.0, 2.0], 1e-12));
    }

    #[test]
    fn fractional_delay_interpolates_linearly() {
        let mut line = TimeVaryingDelay::new(4, 0.0f64, 1.0);
        line.advance(1.0, 1.5);
        // newer = x[n-1] = 1, older = x[n-2] = 0, frac = 0.5.
        let out = line.advance(2.0, 1.5);
        assert!((out - 0.5).abs() < 1e-12);
    }

    #[test]
    fn zero_lower_delay_reads_current_input() {
        let mut line = TimeVaryingDelay::new(2, 0.0f64, 1.0);
        line.advance(4.0, 0.5);
        // newer = x[n] = 8, older = x[n-1] = 4, frac = 0.5.
        let out = line.advance(8.0, 0.5);
        assert!((out - 6.0).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "exceeds the maximum")]
    fn delay_beyond_buffer_asserts() {
        let mut line = TimeVaryingDelay::new(4, 0.0f64, 1.0);
        line.advance(1.0, 3.5);
    }
}
