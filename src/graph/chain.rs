//! Series and parallel combination of filter primitives.
//!
//! Children are held in a tagged variant, [`FilterUnit`], so heterogeneous
//! networks nest without boxing every element: the hot loop dispatches
//! through a jump table and every child's buffers live inline in the
//! composite. The variant is recursive (a series can hold parallels which
//! hold further series), which is exactly the shape reverb topologies need:
//!
//! ```text
//! Series ─→ Parallel ─┬→ comb 1 ─┐
//!                     ├→ comb 2 ─┼─ lt · (...) ─→ Series ─→ allpass 1 → ...
//!                     └→ comb 3 ─┘
//! ```

use nalgebra::DVector;

use crate::dsp::comb::{FeedforwardFeedbackComb, FilteredFeedbackComb, OnePoleLowpass};
use crate::dsp::convolve::OverlapAddConvolver;
use crate::dsp::delay::TappedDelayLine;
use crate::dsp::filter::FirstOrderFilter;
use crate::dsp::{Audio, Filter};

/// Tagged union over every single-input single-output computational unit.
///
/// The time-varying delay is deliberately absent: its advance takes a second
/// (delay) argument and therefore cannot satisfy the one-sample-in,
/// one-sample-out contract. It composes through the flanger instead.
pub enum FilterUnit<S: Audio> {
    Tapped(TappedDelayLine<S>),
    OnePole(OnePoleLowpass<S>),
    FirstOrder(FirstOrderFilter<S>),
    Comb(FeedforwardFeedbackComb<S>),
    FilteredComb(FilteredFeedbackComb<S>),
    OverlapAdd(OverlapAddConvolver<S>),
    Series(Series<S>),
    Parallel(Parallel<S>),
}

impl<S: Audio> Filter<S> for FilterUnit<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        match self {
            FilterUnit::Tapped(unit) => unit.advance(input),
            FilterUnit::OnePole(unit) => unit.advance(input),
            FilterUnit::FirstOrder(unit) => unit.advance(input),
            FilterUnit::Comb(unit) => unit.advance(input),
            FilterUnit::FilteredComb(unit) => unit.advance(input),
            FilterUnit::OverlapAdd(unit) => unit.advance(input),
            FilterUnit::Series(unit) => unit.advance(input),
            FilterUnit::Parallel(unit) => unit.advance(input),
        }
    }
}

macro_rules! impl_from_unit {
    ($variant:ident, $payload:ty) => {
        impl<S: Audio> From<$payload> for FilterUnit<S> {
            fn from(unit: $payload) -> Self {
                FilterUnit::$variant(unit)
            }
        }
    };
}

impl_from_unit!(Tapped, TappedDelayLine<S>);
impl_from_unit!(OnePole, OnePoleLowpass<S>);
impl_from_unit!(FirstOrder, FirstOrderFilter<S>);
impl_from_unit!(Comb, FeedforwardFeedbackComb<S>);
impl_from_unit!(FilteredComb, FilteredFeedbackComb<S>);
impl_from_unit!(OverlapAdd, OverlapAddConvolver<S>);
impl_from_unit!(Series, Series<S>);
impl_from_unit!(Parallel, Parallel<S>);

/// Units chained output-to-input, in declaration order.
pub struct Series<S: Audio> {
    units: Vec<FilterUnit<S>>,
}

impl<S: Audio> Series<S> {
    pub fn new(units: Vec<FilterUnit<S>>) -> Self {
        assert!(!units.is_empty(), "series combination needs at least one unit");
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<S: Audio> Filter<S> for Series<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        self.units
            .iter_mut()
            .fold(input, |signal, unit| unit.advance(signal))
    }
}

/// Units evaluated side by side on the same input; the scalar output is the
/// weight vector `lt` applied to the child outputs.
pub struct Parallel<S: Audio> {
    units: Vec<FilterUnit<S>>,
    lt: DVector<S>,
    // Child outputs for the current sample; allocated once.
    outputs: DVector<S>,
}

impl<S: Audio> Parallel<S> {
    pub fn new(units: Vec<FilterUnit<S>>, lt: DVector<S>) -> Self {
        assert_eq!(
            lt.len(),
            units.len(),
            "parallel weight vector must match the unit count"
        );
        let outputs = DVector::from_element(units.len(), S::zero());
        Self { units, lt, outputs }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl<S: Audio> Filter<S> for Parallel<S> {
    #[inline]
    fn advance(&mut self, input: S) -> S {
        for (slot, unit) in self.outputs.iter_mut().zip(self.units.iter_mut()) {
            *slot = unit.advance(input);
        }
        self.lt.dot(&self.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::run_filter;
    use crate::util::all_close;

    #[test]
    fn series_folds_left_to_right() {
        // Two one-pole sections in series equal the hand-computed cascade.
        let mut series = Series::new(vec![
            OnePoleLowpass::new(0.5, 0.0f64).into(),
            OnePoleLowpass::new(2.0, 0.0f64).into(),
        ]);
        let out = run_filter(&mut series, &[1.0, 2.0, 3.0], 0);
        assert!(all_close(&out, &[1.0, 2.0, 3.0], 1e-12));
    }

    #[test]
    fn series_of_combs_matches_manual_composition() {
        let mut series = Series::new(vec![
            FeedforwardFeedbackComb::new(1.0, 1.0, -0.5f64, 3).into(),
            FeedforwardFeedbackComb::new(1.0, 0.5, 0.25f64, 2).into(),
        ]);

        let mut first = FeedforwardFeedbackComb::new(1.0, 1.0, -0.5f64, 3);
        let mut second = FeedforwardFeedbackComb::new(1.0, 0.5, 0.25f64, 2);

        let input = [1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0];
        for &x in &input {
            let composed = series.advance(x);
            let manual = second.advance(first.advance(x));
            assert!((composed - manual).abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "at least one unit")]
    fn empty_series_asserts() {
        let _ = Series::<f64>::new(vec![]);
    }

    #[test]
    fn parallel_applies_weight_vector() {
        // Two pure gains (one-pole with beta = 0) weighted 2 and 3:
        // y = 2 * (0.5 x) + 3 * (0.25 x) = 1.75 x.
        let mut parallel = Parallel::new(
            vec![
                OnePoleLowpass::new(0.5, 0.0f64).into(),
                OnePoleLowpass::new(0.25, 0.0f64).into(),
            ],
            DVector::from_vec(vec![2.0, 3.0]),
        );
        let out = run_filter(&mut parallel, &[1.0, 2.0], 0);
        assert!(all_close(&out, &[1.75, 3.5], 1e-12));
    }

    #[test]
    #[should_panic(expected = "weight vector must match")]
    fn parallel_weight_size_mismatch_asserts() {
        let _ = Parallel::<f64>::new(
            vec![OnePoleLowpass::new(0.5, 0.0).into()],
            DVector::from_vec(vec![1.0, 2.0]),
        );
    }

    #[test]
    fn nested_composition_advances() {
        // Parallel bank inside a series, the shape reverbs use.
        let bank = Parallel::new(
            vec![
                FilteredFeedbackComb::new(0.3, 0.1f64, 3).into(),
                FilteredFeedbackComb::new(0.3, 0.1f64, 5).into(),
            ],
            DVector::from_element(2, 1.0),
        );
        let diffusion = Series::new(vec![
            FeedforwardFeedbackComb::allpass(0.5f64, 2).into(),
            FeedforwardFeedbackComb::allpass(0.5f64, 3).into(),
        ]);
        let mut network = Series::new(vec![bank.into(), diffusion.into()]);

        let out = run_filter(&mut network, &[1.0, 0.0, 0.0, 0.0], 16);
        assert!(out.iter().all(|y| y.is_finite()));
        assert!(out.iter().any(|&y| y != 0.0));
    }
}
