//! Pull/push sample streams and the offline drivers built on them.
//!
//! A [`SampleSource`] unifies data that is already buffered (a `Vec`) with
//! data arriving in real time; a [`SampleSink`] does the same for outputs.
//! The [`process`] driver drains a source through a filter's `advance` and
//! then pushes zeros to flush the filter's tail, which is the convention
//! every offline test and the CLI driver rely on.

use crate::dsp::{Filter, FirFilter, Sample};

/// A read-only stream of scalar samples. `None` is terminal: once a source
/// reports the end, every later call must also return `None`.
pub trait SampleSource<S: Sample> {
    fn read_next(&mut self) -> Option<S>;
}

/// A write-only stream of scalar samples.
pub trait SampleSink<S: Sample> {
    fn write_next(&mut self, value: S);
}

/// Adapts an owned `Vec` to a [`SampleSource`], yielding entries in order.
pub struct VecSource<S> {
    samples: Vec<S>,
    cursor: usize,
}

impl<S: Sample> VecSource<S> {
    pub fn new(samples: Vec<S>) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl<S: Sample> SampleSource<S> for VecSource<S> {
    fn read_next(&mut self) -> Option<S> {
        let value = self.samples.get(self.cursor).copied();
        if value.is_some() {
            self.cursor += 1;
        }
        value
    }
}

/// A growable sink backed by a `Vec`.
pub struct VecSink<S> {
    pub samples: Vec<S>,
}

impl<S: Sample> VecSink<S> {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    /// Reserve room up front when the output length is known.
    pub fn with_capacity(len: usize) -> Self {
        Self {
            samples: Vec::with_capacity(len),
        }
    }

    pub fn into_samples(self) -> Vec<S> {
        self.samples
    }
}

impl<S: Sample> Default for VecSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> SampleSink<S> for VecSink<S> {
    fn write_next(&mut self, value: S) {
        self.samples.push(value);
    }
}

/// A sink writing into a pre-sized buffer. Writing past the end is a
/// contract violation and asserts.
pub struct BoundedSink<'a, S> {
    buffer: &'a mut [S],
    cursor: usize,
}

impl<'a, S: Sample> BoundedSink<'a, S> {
    pub fn new(buffer: &'a mut [S]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Number of samples written so far.
    pub fn written(&self) -> usize {
        self.cursor
    }
}

impl<S: Sample> SampleSink<S> for BoundedSink<'_, S> {
    fn write_next(&mut self, value: S) {
        assert!(
            self.cursor < self.buffer.len(),
            "bounded sink overflow: capacity {}",
            self.buffer.len()
        );
        self.buffer[self.cursor] = value;
        self.cursor += 1;
    }
}

/// Drain `source` through `filter`, then feed `num_transients` zero inputs
/// to flush the filter's internal state into `sink`.
pub fn process<S, F>(
    filter: &mut F,
    source: &mut impl SampleSource<S>,
    sink: &mut impl SampleSink<S>,
    num_transients: usize,
) where
    S: Sample,
    F: Filter<S> + ?Sized,
{
    while let Some(input) = source.read_next() {
        sink.write_next(filter.advance(input));
    }
    for _ in 0..num_transients {
        sink.write_next(filter.advance(S::zero()));
    }
}

/// [`process`] for FIR filters, whose transient count is known exactly.
pub fn process_fir<S, F>(
    filter: &mut F,
    source: &mut impl SampleSource<S>,
    sink: &mut impl SampleSink<S>,
) where
    S: Sample,
    F: FirFilter<S> + ?Sized,
{
    let num_transients = filter.max_delay();
    process(filter, source, sink, num_transients);
}

/// Slice-in, vec-out convenience: run `input` plus `num_transients` zeros
/// through `filter` and collect the outputs.
pub fn run_filter<S, F>(filter: &mut F, input: &[S], num_transients: usize) -> Vec<S>
where
    S: Sample,
    F: Filter<S> + ?Sized,
{
    let mut output = Vec::with_capacity(input.len() + num_transients);
    for &x in input {
        output.push(filter.advance(x));
    }
    for _ in 0..num_transients {
        output.push(filter.advance(S::zero()));
    }
    output
}
