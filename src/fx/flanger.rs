//! Flanger: a short time-varying delay mixed against the dry signal.
//!
//! Sweeping the delay creates a moving comb-filter notch pattern, the
//! classic "jet engine" effect. The delay trajectory is a slow sinusoid
//! around an average delay:
//!
//! ```text
//! m[n] = avg * (1 + sweep * sin(2 * pi * speed * n * period))
//! ```
//!
//! and the wet path weight is `depth`, optionally phase-inverted so the
//! notches become peaks.

use num_traits::{Float, FloatConst, One, Zero};

use crate::dsp::delay::TimeVaryingDelay;
use crate::dsp::{Audio, Sample};
use crate::stream::{SampleSink, SampleSource, VecSink, VecSource};

/// A per-sample delay trajectory with a known upper bound.
pub trait DelaySequence<R> {
    /// The delay to request for the current sample; advances the sequence.
    fn next_delay(&mut self) -> R;

    /// Upper bound of the values `next_delay` can produce, in whole
    /// samples. Sizes the delay-line buffer.
    fn max_delay(&self) -> usize;
}

/// Sinusoidal delay trajectory.
pub struct SinusoidalDelay<R> {
    average_delay: R,
    sweep: R,
    speed: R,
    sample_period: R,
    delay_idx: u64,
}

impl<R: Float + FloatConst> SinusoidalDelay<R> {
    /// Asserts `average_delay > 0`, `speed > 0`, `sample_period > 0`, and
    /// `sweep` in `[-1, 1]`.
    pub fn new(average_delay: R, sweep: R, speed: R, sample_period: R) -> Self {
        assert!(average_delay > R::zero(), "average delay must be positive");
        assert!(speed > R::zero(), "sweep speed must be positive");
        assert!(sample_period > R::zero(), "sample period must be positive");
        assert!(
            sweep >= -R::one() && sweep <= R::one(),
            "sweep must lie in [-1, 1]"
        );
        Self {
            average_delay,
            sweep,
            speed,
            sample_period,
            delay_idx: 0,
        }
    }
}

impl<R: Float + FloatConst> DelaySequence<R> for SinusoidalDelay<R> {
    fn next_delay(&mut self) -> R {
        let n = R::from(self.delay_idx).unwrap_or_else(R::max_value);
        let two = R::one() + R::one();
        let phase = two * R::PI() * self.speed * n * self.sample_period;
        self.delay_idx += 1;
        self.average_delay * (R::one() + self.sweep * phase.sin())
    }

    fn max_delay(&self) -> usize {
        let peak = self.average_delay * (R::one() + self.sweep);
        peak.ceil().to_usize().unwrap_or(1)
    }
}

/// Single-channel flanger. Inverting the phase negates the wet coefficient.
pub struct Flanger<S: Sample, D> {
    delay: D,
    delay_line: TimeVaryingDelay<S>,
}

impl<S, D> Flanger<S, D>
where
    S: Sample,
    D: DelaySequence<S::Real>,
{
    /// Asserts `depth` in `[0, 1]`.
    pub fn new(depth: S::Real, invert_phase: bool, delay: D) -> Self {
        assert!(
            depth >= S::Real::zero() && depth <= S::Real::one(),
            "flanger depth must lie in [0, 1]"
        );
        let wet = if invert_phase { -depth } else { depth };
        let delay_line = TimeVaryingDelay::new(
            delay.max_delay(),
            S::from_real(S::Real::one()),
            S::from_real(wet),
        );
        Self { delay, delay_line }
    }

    /// Advance one sample, pulling the next delay from the trajectory.
    pub fn advance(&mut self, input: S) -> S {
        let delay = self.delay.next_delay();
        self.delay_line.advance(input, delay)
    }

    /// Drive a whole stream, flushing `max_delay` transients with the
    /// delay trajectory still running.
    pub fn process(
        &mut self,
        source: &mut impl SampleSource<S>,
        sink: &mut impl SampleSink<S>,
    ) {
        while let Some(input) = source.read_next() {
            sink.write_next(self.advance(input));
        }
        for _ in 0..self.delay_line.max_delay() {
            sink.write_next(self.advance(S::zero()));
        }
    }
}

/// Stereo flanger over independent left/right channels, with an optional
/// post-pass rescale that maps each channel's extrema to `+/-alpha`.
pub struct TwoChannelFlanger<S: Audio, D> {
    left: Flanger<S, D>,
    right: Flanger<S, D>,
}

impl<S, D> TwoChannelFlanger<S, D>
where
    S: Audio,
    D: DelaySequence<S>,
{
    pub fn new(left: Flanger<S, D>, right: Flanger<S, D>) -> Self {
        Self { left, right }
    }

    /// Process both channels; output length is input length plus each
    /// channel's transient count.
    ///
    /// With `rescale_abs = Some(alpha)`, each channel is affinely mapped so
    /// its extrema land on `+/-alpha`. Asserts `alpha` in `(0, 1]` and that
    /// the channel is not constant.
    pub fn process(
        &mut self,
        left_input: &[S],
        right_input: &[S],
        rescale_abs: Option<S>,
    ) -> (Vec<S>, Vec<S>) {
        assert_eq!(
            left_input.len(),
            right_input.len(),
            "stereo inputs must have equal length"
        );

        let mut left_output = run_channel(&mut self.left, left_input);
        let mut right_output = run_channel(&mut self.right, right_input);

        if let Some(alpha) = rescale_abs {
            assert!(
                alpha > S::zero() && alpha <= S::one(),
                "rescale target must lie in (0, 1]"
            );
            rescale_extrema(&mut left_output, alpha);
            rescale_extrema(&mut right_output, alpha);
        }

        (left_output, right_output)
    }
}

fn run_channel<S, D>(flanger: &mut Flanger<S, D>, input: &[S]) -> Vec<S>
where
    S: Sample,
    D: DelaySequence<S::Real>,
{
    let mut source = VecSource::new(input.to_vec());
    let mut sink = VecSink::with_capacity(input.len() + flanger.delay_line.max_delay());
    flanger.process(&mut source, &mut sink);
    sink.into_samples()
}

/// Affine map sending `[min, max]` onto `[-alpha, alpha]`.
fn rescale_extrema<S: Audio>(channel: &mut [S], alpha: S) {
    let max = channel.iter().copied().fold(S::neg_infinity(), S::max);
    let min = channel.iter().copied().fold(S::infinity(), S::min);
    let range = max - min;
    assert!(range != S::zero(), "cannot rescale a constant channel");

    let two = S::lit(2.0);
    let scale = two * alpha / range;
    let shift = -alpha * (max + min) / range;
    for value in channel.iter_mut() {
        *value = scale * *value + shift;
    }
}
