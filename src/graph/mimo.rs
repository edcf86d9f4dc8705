//! Multi-input multi-output IIR graphs.
//!
//! N input channels run through N independent filters; the M outputs are a
//! fixed linear transform of the filter outputs plus a scaled copy of the
//! input vector:
//!
//! ```text
//! y = input_scale * x + output_lt * [filters[i].advance(x[i])]
//! ```
//!
//! The channels share no state, so they evaluate in parallel, one task per
//! channel. The `input_scale` term assumes a square shape (M = N) and is
//! skipped otherwise; a true input matrix would generalise this to
//! non-square graphs.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::dsp::{Filter, Sample};
use crate::stream::{SampleSink, SampleSource};

/// Boxed filter channel: trait objects appear only at this graph boundary,
/// never inside the per-sample primitives.
pub type BoxedFilter<S> = Box<dyn Filter<S> + Send>;

pub struct MimoIir<S: Sample> {
    input_scale: S,
    output_lt: DMatrix<S>,
    filters: Vec<BoxedFilter<S>>,
    // Per-channel outputs for the current sample; allocated once.
    channel_outputs: DVector<S>,
}

impl<S> MimoIir<S>
where
    S: Sample + num_traits::One + std::ops::MulAssign,
{
    /// The output transform's column count fixes the number of inputs; its
    /// row count fixes the number of outputs.
    pub fn new(input_scale: S, output_lt: DMatrix<S>, filters: Vec<BoxedFilter<S>>) -> Self {
        assert_eq!(
            output_lt.ncols(),
            filters.len(),
            "output transform needs one column per filter channel"
        );
        let channel_outputs = DVector::from_element(filters.len(), S::zero());
        Self {
            input_scale,
            output_lt,
            filters,
            channel_outputs,
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.filters.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.output_lt.nrows()
    }

    /// Advance every channel by one sample and mix the results.
    pub fn advance(&mut self, input: &DVector<S>) -> DVector<S> {
        assert_eq!(input.len(), self.num_inputs(), "input vector shape mismatch");

        self.filters
            .par_iter_mut()
            .zip(self.channel_outputs.as_mut_slice().par_iter_mut())
            .zip(input.as_slice().par_iter())
            .for_each(|((filter, out), &x)| *out = filter.advance(x));

        let mut output = &self.output_lt * &self.channel_outputs;
        if self.num_outputs() == self.num_inputs() {
            output += input.map(|x| x * self.input_scale);
        }
        output
    }

    /// Drain the source list through the graph, then flush
    /// `num_transients` zero vectors.
    ///
    /// All sources must terminate on the same step; a straggler is a stream
    /// length mismatch and asserts.
    pub fn process(
        &mut self,
        sources: &mut [&mut dyn SampleSource<S>],
        sinks: &mut [&mut dyn SampleSink<S>],
        num_transients: usize,
    ) {
        assert_eq!(sources.len(), self.num_inputs(), "one source per input");
        assert_eq!(sinks.len(), self.num_outputs(), "one sink per output");

        while let Some(input) = read_vector(sources) {
            write_vector(sinks, &self.advance(&input));
        }

        let zeros = DVector::from_element(self.num_inputs(), S::zero());
        for _ in 0..num_transients {
            write_vector(sinks, &self.advance(&zeros));
        }
    }
}

/// Read one sample from every source. When any source ends, all of them
/// must end on that same step.
fn read_vector<S: Sample>(sources: &mut [&mut dyn SampleSource<S>]) -> Option<DVector<S>> {
    let mut values = Vec::with_capacity(sources.len());
    let mut ended = false;
    for (index, source) in sources.iter_mut().enumerate() {
        match source.read_next() {
            Some(value) => {
                assert!(
                    !ended,
                    "input stream {index} yielded a sample after another stream ended"
                );
                values.push(value);
            }
            None => {
                assert!(
                    index == 0 || ended,
                    "input stream {index} ended before the others"
                );
                ended = true;
            }
        }
    }
    if ended {
        None
    } else {
        Some(DVector::from_vec(values))
    }
}

fn write_vector<S: Sample>(sinks: &mut [&mut dyn SampleSink<S>], output: &DVector<S>) {
    for (sink, &value) in sinks.iter_mut().zip(output.iter()) {
        sink.write_next(value);
    }
}
