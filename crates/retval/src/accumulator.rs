//! `ValueAccumulator<T>`: gather values and problems from many results.

use crate::collector::ProblemCollector;
use crate::outcome::Outcome;
use crate::ret_nullable::RetNullable;
use crate::ret_val::RetVal;
use crate::warning_val::WarningVal;
use retval_problems::{ProblemContainer, ProblemRef, Problems};
use std::fmt;

/// Accumulates every value and every problem, in call order.
///
/// Unlike `then` chaining, a failing input never stops the accumulation:
/// the final result reports every problem from every input. An absent
/// nullable value adds no entry to `values()`; it is counted in
/// `absent_count()` instead.
pub struct ValueAccumulator<T> {
    values: Vec<T>,
    absent: usize,
    collector: ProblemCollector,
}

impl<T> Default for ValueAccumulator<T> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            absent: 0,
            collector: ProblemCollector::new(),
        }
    }
}

impl<T> ValueAccumulator<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_val(value: RetVal<T>) -> Self {
        Self::new().with(value)
    }

    #[must_use]
    pub fn from_nullable(value: RetNullable<T>) -> Self {
        Self::new().with_nullable(value)
    }

    #[must_use]
    pub fn from_problem(container: &dyn ProblemContainer) -> Self {
        Self::new().with_problem(container)
    }

    // ========================================================================
    // Accumulation
    // ========================================================================

    #[must_use]
    pub fn with(mut self, value: RetVal<T>) -> Self {
        self.add(value);
        self
    }

    /// Fold in a nullable result. An absent value only bumps
    /// `absent_count()`, so later values shift down one position.
    #[must_use]
    pub fn with_nullable(mut self, value: RetNullable<T>) -> Self {
        self.add_nullable(value);
        self
    }

    /// Fold in the problems of a container that carries no value for this
    /// accumulator.
    #[must_use]
    pub fn with_problem(mut self, container: &dyn ProblemContainer) -> Self {
        self.collector.add(container);
        self
    }

    #[must_use]
    pub fn with_problem_sets<'a>(mut self, sets: impl IntoIterator<Item = &'a Problems>) -> Self {
        for set in sets {
            self.collector.add_problems(set);
        }
        self
    }

    #[must_use]
    pub fn with_all_values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.add_all_values(values);
        self
    }

    /// Fold in a result holding many values.
    #[must_use]
    pub fn with_all<C>(mut self, values: RetVal<C>) -> Self
    where
        C: IntoIterator<Item = T>,
    {
        match values.into_result() {
            Ok(values) => self.values.extend(values),
            Err(report) => self.collector.add_problems(report.problems()),
        }
        self
    }

    /// Apply `f` to every input, keeping every value and every problem.
    #[must_use]
    pub fn with_each<V>(
        mut self,
        input: impl IntoIterator<Item = V>,
        mut f: impl FnMut(V) -> RetVal<T>,
    ) -> Self {
        for item in input {
            self.add(f(item));
        }
        self
    }

    /// Like `with_each`, over a fallible input. A failed input contributes
    /// its problems and `f` never runs.
    #[must_use]
    pub fn with_each_ret<V, C>(self, input: RetVal<C>, f: impl FnMut(V) -> RetVal<T>) -> Self
    where
        C: IntoIterator<Item = V>,
    {
        match input.into_result() {
            Ok(items) => self.with_each(items, f),
            Err(report) => self.with_problem_sets([report.problems()]),
        }
    }

    pub fn add(&mut self, value: RetVal<T>) {
        match value.into_result() {
            Ok(value) => self.values.push(value),
            Err(report) => self.collector.add_problems(report.problems()),
        }
    }

    /// In-place `with_nullable`.
    pub fn add_nullable(&mut self, value: RetNullable<T>) {
        match value.into_result() {
            Ok(Some(value)) => self.values.push(value),
            Ok(None) => self.absent += 1,
            Err(report) => self.collector.add_problems(report.problems()),
        }
    }

    pub fn add_value(&mut self, value: T) {
        self.values.push(value);
    }

    pub fn add_all_values(&mut self, values: impl IntoIterator<Item = T>) {
        self.values.extend(values);
    }

    /// The values collected so far.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Successful nullable inputs that carried no value.
    #[must_use]
    pub fn absent_count(&self) -> usize {
        self.absent
    }

    #[must_use]
    pub fn collector(&self) -> &ProblemCollector {
        &self.collector
    }

    // ========================================================================
    // Terminal operations
    // ========================================================================

    /// Every value, or every problem when there was any.
    #[track_caller]
    pub fn then(self) -> RetVal<Vec<T>> {
        if self.collector.has_problems() {
            RetVal::from_outcome(Outcome::Problems(self.collector.into_problems()))
        } else {
            RetVal::ok(self.values)
        }
    }

    /// Same as `then`.
    #[track_caller]
    pub fn as_ret_val(self) -> RetVal<Vec<T>> {
        self.then()
    }

    /// Every value, with every problem as a warning.
    pub fn as_warning(self) -> WarningVal<Vec<T>> {
        WarningVal::with_problems(self.values, self.collector.into_problems())
    }
}

impl<T> ProblemContainer for ValueAccumulator<T> {
    fn has_problems(&self) -> bool {
        self.collector.has_problems()
    }

    fn any_problems(&self) -> Problems {
        self.collector.any_problems()
    }

    fn debug_problems(&self, joined_with: &str) -> String {
        self.collector.debug_problems(joined_with)
    }

    fn join_problems_with(&self, sink: &mut Vec<ProblemRef>) {
        self.collector.join_problems_with(sink);
    }
}

impl<T: fmt::Debug> fmt::Debug for ValueAccumulator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueAccumulator")
            .field("values", &self.values)
            .field("absent", &self.absent)
            .field("collector", &self.collector)
            .finish()
    }
}
