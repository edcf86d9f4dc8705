//! Composable building blocks for constructing filter networks.
//!
//! The graph layer wraps the low-level DSP primitives with the structure
//! effects need: serial chains, weighted parallel banks, and multi-channel
//! graphs. Single-channel composition stays variant-typed so the per-sample
//! loop never chases a vtable; trait objects appear only at the
//! multi-channel boundary where heterogeneous networks must escape a
//! function.

/// Series/parallel combination over a tagged filter variant.
pub mod chain;
/// Multi-input multi-output IIR graphs with stream drivers.
pub mod mimo;

pub use chain::{FilterUnit, Parallel, Series};
pub use mimo::{BoxedFilter, MimoIir};
