//! `ProblemCollector`: accumulate problems from many independent sources.

use crate::outcome::Outcome;
use crate::ret_nullable::RetNullable;
use crate::ret_val::RetVal;
use crate::ret_void::RetVoid;
use crate::warning_val::WarningVal;
use retval_problems::{
    join_problem_messages, IntoProblem, ProblemContainer, ProblemRef, Problems,
};
use std::fmt;

/// Collects problems without stopping at the first one, then decides the
/// outcome once.
///
/// The terminal operations consume the collector.
#[derive(Default)]
pub struct ProblemCollector {
    problems: Vec<ProblemRef>,
}

impl ProblemCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector seeded with the problems of `containers`.
    #[must_use]
    pub fn from(containers: &[&dyn ProblemContainer]) -> Self {
        let mut collector = Self::new();
        for container in containers {
            collector.add(*container);
        }
        collector
    }

    /// A collector seeded from a result; a value goes to `setter`.
    #[must_use]
    pub fn from_value<T>(value: RetVal<T>, setter: impl FnOnce(T)) -> Self {
        Self::new().with_value(value, setter)
    }

    // ========================================================================
    // Accumulation
    // ========================================================================

    #[must_use]
    pub fn with_problem(mut self, problem: impl IntoProblem) -> Self {
        self.add_problem(problem);
        self
    }

    #[must_use]
    pub fn with(mut self, container: &dyn ProblemContainer) -> Self {
        self.add(container);
        self
    }

    #[must_use]
    pub fn with_problem_sets<'a>(mut self, sets: impl IntoIterator<Item = &'a Problems>) -> Self {
        for set in sets {
            self.problems.extend(set.iter().cloned());
        }
        self
    }

    /// Fold in a result. Its value, if any, goes to `setter`.
    #[must_use]
    pub fn with_value<T>(mut self, value: RetVal<T>, setter: impl FnOnce(T)) -> Self {
        match value.into_result() {
            Ok(value) => setter(value),
            Err(report) => self.problems.extend(report.problems().iter().cloned()),
        }
        self
    }

    /// Fold in a nullable result. A success, present or not, goes to
    /// `setter`.
    #[must_use]
    pub fn with_nullable_value<T>(
        mut self,
        value: RetNullable<T>,
        setter: impl FnOnce(Option<T>),
    ) -> Self {
        match value.into_result() {
            Ok(value) => setter(value),
            Err(report) => self.problems.extend(report.problems().iter().cloned()),
        }
        self
    }

    pub fn add(&mut self, container: &dyn ProblemContainer) {
        container.join_problems_with(&mut self.problems);
    }

    pub fn add_problem(&mut self, problem: impl IntoProblem) {
        self.problems.push(problem.into_problem_ref());
    }

    pub(crate) fn add_problems(&mut self, problems: &Problems) {
        self.problems.extend(problems.iter().cloned());
    }

    pub(crate) fn into_problems(self) -> Problems {
        Problems::from_vec(self.problems)
    }

    // ========================================================================
    // Terminal operations
    // ========================================================================

    /// The result of `f`, or the collected problems without running `f`.
    #[track_caller]
    pub fn then<T>(self, f: impl FnOnce() -> RetVal<T>) -> RetVal<T> {
        if self.problems.is_empty() {
            f()
        } else {
            RetVal::from_outcome(Outcome::Problems(self.into_problems()))
        }
    }

    #[track_caller]
    pub fn then_value<T>(self, f: impl FnOnce() -> T) -> RetVal<T> {
        if self.problems.is_empty() {
            RetVal::ok(f())
        } else {
            RetVal::from_outcome(Outcome::Problems(self.into_problems()))
        }
    }

    #[track_caller]
    pub fn then_nullable<T>(self, f: impl FnOnce() -> RetNullable<T>) -> RetNullable<T> {
        if self.problems.is_empty() {
            f()
        } else {
            RetNullable::from_outcome(Outcome::Problems(self.into_problems()))
        }
    }

    #[track_caller]
    pub fn then_nullable_value<T>(self, f: impl FnOnce() -> Option<T>) -> RetNullable<T> {
        if self.problems.is_empty() {
            RetNullable::ok(f())
        } else {
            RetNullable::from_outcome(Outcome::Problems(self.into_problems()))
        }
    }

    /// Run `f` when nothing was collected.
    #[track_caller]
    pub fn then_run(self, f: impl FnOnce()) -> RetVoid {
        if self.problems.is_empty() {
            f();
            RetVoid::ok()
        } else {
            RetVoid::from_outcome(Outcome::Problems(self.into_problems()))
        }
    }

    /// `value`, or the collected problems.
    #[track_caller]
    pub fn complete<T>(self, value: T) -> RetVal<T> {
        self.then_value(|| value)
    }

    #[track_caller]
    pub fn complete_nullable<T>(self, value: Option<T>) -> RetNullable<T> {
        self.then_nullable_value(|| value)
    }

    /// `value`, with the collected problems as warnings.
    pub fn warn<T>(self, value: T) -> WarningVal<T> {
        WarningVal::with_problems(value, self.into_problems())
    }
}

impl ProblemContainer for ProblemCollector {
    fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    fn any_problems(&self) -> Problems {
        Problems::from_vec(self.problems.clone())
    }

    fn debug_problems(&self, joined_with: &str) -> String {
        join_problem_messages(joined_with, &self.any_problems())
    }

    fn join_problems_with(&self, sink: &mut Vec<ProblemRef>) {
        sink.extend(self.problems.iter().cloned());
    }
}

impl fmt::Debug for ProblemCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemCollector")
            .field("problems", &self.problems)
            .finish()
    }
}
