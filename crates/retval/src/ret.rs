//! Entry points for the accumulation builders.

use crate::accumulator::ValueAccumulator;
use crate::builder::ValueBuilder;
use crate::collector::ProblemCollector;

/// An empty `ValueAccumulator`.
#[must_use]
pub fn accumulate_values<T>() -> ValueAccumulator<T> {
    ValueAccumulator::new()
}

/// An empty `ProblemCollector`.
#[must_use]
pub fn collect_problems() -> ProblemCollector {
    ProblemCollector::new()
}

/// A `ValueBuilder` assembling into `value`.
#[must_use]
pub fn build_value<T>(value: T) -> ValueBuilder<T> {
    ValueBuilder::from(value)
}
