//! The comb filter family: one-pole lowpass, feedforward-feedback comb, and
//! the lowpass-filtered feedback comb.
//!
//! Combs are the workhorses of delay-network reverberation. A comb with
//! feedback produces a train of equally spaced, decaying echoes; filtering
//! the feedback path absorbs high frequencies the way walls do. The
//! feedforward-feedback comb with coefficients `(-1, 1 + g, g)` approximates
//! an all-pass section, which adds echo density without colouring the
//! spectrum.

use num_traits::One;

use crate::dsp::{Filter, Sample};

/// One-pole lowpass: `y[n] = alpha * x[n] + beta * y[n - 1]`.
///
/// Stability requires `|beta| < 1`, asserted at construction.
pub struct OnePoleLowpass<S: Sample> {
    alpha: S,
    beta: S,
    prev_output: S,
}

impl<S: Sample> OnePoleLowpass<S> {
    pub fn new(alpha: S, beta: S) -> Self {
        assert!(
            beta.modulus() < S::Real::one(),
            "one-pole feedback coefficient must satisfy |beta| < 1"
        );
        Self {
            alpha,
            beta,
            prev_output: S::zero(),
        }
    }
}

impl<S: Sample> Filter<S> for OnePoleLowpass<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        let output = self.alpha * input + self.beta * self.prev_output;
        self.prev_output = output;
        output
    }
}

/// Comb filter with a feedforward and a feedback path sharing one delay:
///
/// ```text
/// y[n] = b0 * x[n] + b1 * x[n - m] + a * y[n - m]
/// ```
///
/// Stability requires `|a| < 1`, asserted at construction. Two circular
/// buffers of length `m` hold the delayed input and output.
pub struct FeedforwardFeedbackComb<S: Sample> {
    input_coeff: S,
    input_delay_coeff: S,
    output_coeff: S,
    input_buffer: Vec<S>,
    output_buffer: Vec<S>,
    write_pos: usize,
}

impl<S: Sample> FeedforwardFeedbackComb<S> {
    pub fn new(input_coeff: S, input_delay_coeff: S, output_coeff: S, delay: usize) -> Self {
        assert!(delay >= 1, "comb delay must be at least one sample");
        assert!(
            output_coeff.modulus() < S::Real::one(),
            "comb feedback coefficient must satisfy |a| < 1"
        );
        Self {
            input_coeff,
            input_delay_coeff,
            output_coeff,
            input_buffer: vec![S::zero(); delay],
            output_buffer: vec![S::zero(); delay],
            write_pos: 0,
        }
    }

    /// All-pass approximant used by freeverb's diffusion chain:
    /// `(b0, b1, a) = (-1, 1 + g, g)`.
    pub fn allpass(g: S, delay: usize) -> Self {
        let one = S::from_real(S::Real::one());
        Self::new(-one, one + g, g, delay)
    }

    pub fn delay(&self) -> usize {
        self.input_buffer.len()
    }
}

impl<S: Sample> Filter<S> for FeedforwardFeedbackComb<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        let delayed_input = self.input_buffer[self.write_pos];
        let delayed_output = self.output_buffer[self.write_pos];
        let output = self.input_coeff * input
            + self.input_delay_coeff * delayed_input
            + self.output_coeff * delayed_output;

        self.input_buffer[self.write_pos] = input;
        self.output_buffer[self.write_pos] = output;
        self.write_pos = (self.write_pos + 1) % self.input_buffer.len();
        output
    }
}

/// Feedback comb with a one-pole lowpass inside the loop:
///
/// ```text
/// H(z) = 1 / (1 - H_lp(z) * z^(-m)),   H_lp(z) = alpha / (1 - beta * z^-1)
/// ```
///
/// This is the "lowpass-feedback comb" of the freeverb topology: the loop
/// filter damps high frequencies a little more on every round trip.
pub struct FilteredFeedbackComb<S: Sample> {
    lowpass: OnePoleLowpass<S>,
    output_buffer: Vec<S>,
    write_pos: usize,
}

impl<S: Sample> FilteredFeedbackComb<S> {
    pub fn new(alpha: S, beta: S, feedback_delay: usize) -> Self {
        assert!(feedback_delay >= 1, "comb delay must be at least one sample");
        Self {
            lowpass: OnePoleLowpass::new(alpha, beta),
            output_buffer: vec![S::zero(); feedback_delay],
            write_pos: 0,
        }
    }

    pub fn feedback_delay(&self) -> usize {
        self.output_buffer.len()
    }
}

impl<S: Sample> Filter<S> for FilteredFeedbackComb<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        let delayed_output = self.output_buffer[self.write_pos];
        let output = input + self.lowpass.advance(delayed_output);
        self.output_buffer[self.write_pos] = output;
        self.write_pos = (self.write_pos + 1) % self.output_buffer.len();
        output
    }
}
