//! Class-A tube pre-amp: oversampled non-linear triode stages around a
//! shelving EQ sandwich.
//!
//! Each triode stage is a static waveshaper with optional small-signal EQ,
//! modeled after the Class-A circuit analysis in the audio-plugin
//! literature. The full pre-amp runs its stages at four times the sample
//! rate so the harmonics the waveshapers generate stay below Nyquist:
//!
//! ```text
//! x ─→ 4x interpolate ─→ [input level → pre-EQ triodes → low shelf →
//!       high shelf → post-EQ triodes → output level] ─→ 4x decimate ─→ y
//! ```

use crate::dsp::filter::{FirstOrderFilter, FirstOrderKind};
use crate::dsp::oversample::{PairedInterpolatorDecimator, UP_FACTOR};
use crate::dsp::{Audio, Filter};
use crate::util::from_db;

/// Static non-linear model `f(x, k)`: signal in, saturation parameter in,
/// shaped signal out.
pub type NonLinearModel<S> = Box<dyn Fn(S, S) -> S + Send>;

/// One triode stage: waveshaper, optional output polarity flip, optional
/// high-pass and low-shelf EQ, output gain.
pub struct TriodeClassAModel<S: Audio> {
    nl_model: NonLinearModel<S>,
    saturation: S,
    output_gain: S,
    high_pass_filter: Option<FirstOrderFilter<S>>,
    low_shelf_filter: Option<FirstOrderFilter<S>>,
    invert_output: bool,
}

impl<S: Audio> TriodeClassAModel<S> {
    pub fn new(
        nl_model: NonLinearModel<S>,
        saturation: S,
        output_gain: S,
        high_pass_filter: Option<FirstOrderFilter<S>>,
        low_shelf_filter: Option<FirstOrderFilter<S>>,
        invert_output: bool,
    ) -> Self {
        Self {
            nl_model,
            saturation,
            output_gain,
            high_pass_filter,
            low_shelf_filter,
            invert_output,
        }
    }
}

impl<S: Audio> Filter<S> for TriodeClassAModel<S> {
    fn advance(&mut self, input: S) -> S {
        let mut output = (self.nl_model)(input, self.saturation);
        if self.invert_output {
            output = -output;
        }
        if let Some(high_pass) = self.high_pass_filter.as_mut() {
            output = high_pass.advance(output);
        }
        if let Some(low_shelf) = self.low_shelf_filter.as_mut() {
            output = low_shelf.advance(output);
        }
        self.output_gain * output
    }
}

/// Overlap-add window for the oversampling convolver.
const OVERSAMPLE_WINDOW: usize = 256;

/// Class-A pre-amp: oversampled triode stages around a low/high shelf pair.
///
/// Input and output levels are supplied in dB. Construction asserts at
/// least one triode on each side of the EQ and that the shelf slots hold
/// filters of the matching designed type.
pub struct TubePreAmpClassA<S: Audio> {
    input_level: S,
    output_level: S,
    pre_eq_triodes: Vec<TriodeClassAModel<S>>,
    post_eq_triodes: Vec<TriodeClassAModel<S>>,
    low_shelf_filter: FirstOrderFilter<S>,
    high_shelf_filter: FirstOrderFilter<S>,
    interp_dec: PairedInterpolatorDecimator<S>,
}

impl<S: Audio> TubePreAmpClassA<S> {
    pub fn new(
        input_level_db: S,
        output_level_db: S,
        pre_eq_triodes: Vec<TriodeClassAModel<S>>,
        post_eq_triodes: Vec<TriodeClassAModel<S>>,
        low_shelf_filter: FirstOrderFilter<S>,
        high_shelf_filter: FirstOrderFilter<S>,
    ) -> Self {
        assert!(
            !pre_eq_triodes.is_empty(),
            "pre-amp needs at least one pre-EQ triode"
        );
        assert!(
            !post_eq_triodes.is_empty(),
            "pre-amp needs at least one post-EQ triode"
        );
        assert_eq!(
            low_shelf_filter.kind(),
            FirstOrderKind::LowShelf,
            "low-shelf slot needs a low-shelf filter"
        );
        assert_eq!(
            high_shelf_filter.kind(),
            FirstOrderKind::HighShelf,
            "high-shelf slot needs a high-shelf filter"
        );

        Self {
            input_level: from_db(input_level_db),
            output_level: from_db(output_level_db),
            pre_eq_triodes,
            post_eq_triodes,
            low_shelf_filter,
            high_shelf_filter,
            interp_dec: PairedInterpolatorDecimator::new(OVERSAMPLE_WINDOW),
        }
    }

    /// Run one sample through the amp model at the oversampled rate.
    fn amp_stage(&mut self, x: S) -> S {
        let mut out = self.input_level * x;
        for triode in &mut self.pre_eq_triodes {
            out = triode.advance(out);
        }

        out = self.low_shelf_filter.advance(out);
        out = self.high_shelf_filter.advance(out);

        for triode in &mut self.post_eq_triodes {
            out = triode.advance(out);
        }
        self.output_level * out
    }
}

impl<S: Audio> Filter<S> for TubePreAmpClassA<S> {
    fn advance(&mut self, input: S) -> S {
        let interpolated = self.interp_dec.interpolate(input);
        let mut shaped = [S::zero(); UP_FACTOR];
        for (slot, x) in shaped.iter_mut().zip(interpolated) {
            *slot = self.amp_stage(x);
        }
        self.interp_dec.decimate(shaped)
    }
}
