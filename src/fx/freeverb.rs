//! The "freeverb" artificial reverberator.
//!
//! Freeverb is the classic Schroeder-style topology popularised by Jezar at
//! Dreampoint in the late 1990s: per channel, eight parallel
//! lowpass-feedback combs build the dense decaying tail, and four series
//! all-pass approximants diffuse it without colouring the spectrum.
//!
//! ```text
//!          ┌→ [lbcf 1557] ─┐
//! inL ──┬──┼→ [lbcf 1617] ─┼─ Σ ─→ [ap 225] → [ap 556] → [ap 441] → [ap 341] ─┐
//!       │  └→   ... x8   ──┘                                                  │
//!       │                               ┌──────────────────────────────────────┘
//!       │                               ▼
//!       └────────── dry ──────────→ [wet1 wet2; wet2 wet1] ──→ outL/outR
//! ```
//!
//! The right channel is identical except every delay is lengthened by
//! `stereo_spread` samples, which decorrelates the two tails. Delay
//! constants are the published freeverb values (mutually prime, tuned at
//! 44.1 kHz).

use nalgebra::{DMatrix, DVector};

use crate::dsp::comb::{FeedforwardFeedbackComb, FilteredFeedbackComb};
use crate::dsp::Audio;
use crate::graph::{FilterUnit, MimoIir, Parallel, Series};
use crate::stream::{SampleSink, SampleSource, VecSink, VecSource};

/// Lowpass-feedback comb delays for the left channel, in samples.
const COMB_DELAYS: [usize; 8] = [1557, 1617, 1491, 1422, 1277, 1356, 1188, 1116];

/// All-pass diffusion delays for the left channel, in samples.
const ALLPASS_DELAYS: [usize; 4] = [225, 556, 441, 341];

/// Freeverb tuning parameters.
///
/// `damp` sets the in-loop lowpass (`alpha = reflect * (1 - damp)`,
/// `beta = damp`), `reflect` the comb feedback level, and `g` the all-pass
/// coefficient. `wet1`/`wet2` mix the two channel tails into each output;
/// `dry` passes the input straight through.
#[derive(Debug, Clone, Copy)]
pub struct FreeverbParams<S> {
    pub stereo_spread: usize,
    pub dry: S,
    pub wet1: S,
    pub wet2: S,
    pub damp: S,
    pub reflect: S,
    pub g: S,
}

impl<S: Audio> Default for FreeverbParams<S> {
    fn default() -> Self {
        Self {
            stereo_spread: 23,
            dry: S::zero(),
            wet1: S::one(),
            wet2: S::zero(),
            damp: S::lit(0.2),
            reflect: S::lit(0.84),
            g: S::lit(0.5),
        }
    }
}

/// One reverb channel: the parallel comb bank into the all-pass chain, with
/// every delay stretched by `spread` samples.
fn reverb_channel<S: Audio>(params: &FreeverbParams<S>, spread: usize) -> Series<S> {
    let alpha = params.reflect * (S::one() - params.damp);
    let beta = params.damp;

    let combs: Vec<FilterUnit<S>> = COMB_DELAYS
        .iter()
        .map(|&delay| FilteredFeedbackComb::new(alpha, beta, delay + spread).into())
        .collect();
    let comb_bank = Parallel::new(combs, DVector::from_element(COMB_DELAYS.len(), S::one()));

    let diffusion: Vec<FilterUnit<S>> = ALLPASS_DELAYS
        .iter()
        .map(|&delay| FeedforwardFeedbackComb::allpass(params.g, delay + spread).into())
        .collect();

    Series::new(vec![comb_bank.into(), Series::new(diffusion).into()])
}

/// Build the stereo freeverb graph: two reverb channels behind a 2x2
/// wet/dry mixer.
pub fn make_freeverb<S: Audio>(params: &FreeverbParams<S>) -> MimoIir<S> {
    let output_lt = DMatrix::from_row_slice(
        2,
        2,
        &[params.wet1, params.wet2, params.wet2, params.wet1],
    );
    MimoIir::new(
        params.dry,
        output_lt,
        vec![
            Box::new(reverb_channel(params, 0)),
            Box::new(reverb_channel(params, params.stereo_spread)),
        ],
    )
}

/// One-call offline interface: reverberate a stereo pair of equal-length
/// sample buffers and flush `num_transients` samples of tail.
///
/// Both outputs have length `input_len + num_transients`.
pub fn freeverb_filter<S: Audio>(
    left_input: Vec<S>,
    right_input: Vec<S>,
    num_transients: usize,
    params: &FreeverbParams<S>,
) -> (Vec<S>, Vec<S>) {
    assert_eq!(
        left_input.len(),
        right_input.len(),
        "stereo inputs must have equal length"
    );
    let num_output_samples = left_input.len() + num_transients;

    let mut filter = make_freeverb(params);

    let mut left_source = VecSource::new(left_input);
    let mut right_source = VecSource::new(right_input);
    let mut left_sink = VecSink::with_capacity(num_output_samples);
    let mut right_sink = VecSink::with_capacity(num_output_samples);
    {
        let mut sources: [&mut dyn SampleSource<S>; 2] = [&mut left_source, &mut right_source];
        let mut sinks: [&mut dyn SampleSink<S>; 2] = [&mut left_sink, &mut right_sink];
        filter.process(&mut sources, &mut sinks, num_transients);
    }

    (left_sink.into_samples(), right_sink.into_samples())
}
