//! Composable sample-rate DSP graph for musical audio effects.
//!
//! The crate is a library of single-sample-advance filter primitives (FIR
//! tapped delay lines, combs, first-order IIR sections, time-varying delays,
//! frequency-domain convolvers) that compose into series/parallel networks
//! and multi-channel graphs, plus two complete effects built on top of them:
//! the "freeverb" artificial reverberator and a Class-A tube pre-amp with
//! oversampled non-linear saturation.
//!
//! Every primitive satisfies the same contract: [`dsp::Filter::advance`]
//! maps one input sample to one output sample, mutating only the primitive's
//! own state. Composition never allocates in the steady state, so graphs are
//! safe to drive from a realtime audio callback.
//!
//! ```text
//! SampleSource ──→ [primitive | Series | Parallel | MimoIir] ──→ SampleSink
//!                        └── advance(x) -> y, one sample at a time
//! ```

/// Low-level filter primitives and the single-sample `advance` contract.
pub mod dsp;
/// Complete effects: freeverb reverberator, tube pre-amp, flanger.
pub mod fx;
/// Series/parallel composition and multi-input multi-output graphs.
pub mod graph;
/// Pull/push sample-stream traits, adapters, and offline drivers.
pub mod stream;
/// Small numeric helpers (dB conversion, tolerance comparison).
pub mod util;

pub use dsp::scalar::{Audio, Sample};
pub use dsp::Filter;
