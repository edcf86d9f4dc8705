//! Complete effects assembled from the primitive and graph layers.
//!
//! Constants and topologies come from the published designs: the freeverb
//! delay set, the Class-A triode analysis, and the standard swept-delay
//! flanger. Each effect is still a plain filter with the one-sample-in,
//! one-sample-out contract, so effects nest inside larger graphs like any
//! primitive.

/// Swept time-varying delay flanger, mono and stereo.
pub mod flanger;
/// The freeverb artificial reverberator.
pub mod freeverb;
/// Class-A tube pre-amp with oversampled saturation stages.
pub mod preamp;

pub use flanger::{DelaySequence, Flanger, SinusoidalDelay, TwoChannelFlanger};
pub use freeverb::{freeverb_filter, make_freeverb, FreeverbParams};
pub use preamp::{NonLinearModel, TriodeClassAModel, TubePreAmpClassA};
