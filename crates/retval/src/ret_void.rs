//! `RetVoid`: success without a value, or a non-empty list of problems.

use crate::outcome::{Monitored, Outcome, Tracked};
use crate::ret_nullable::RetNullable;
use crate::ret_val::RetVal;
use retval_monitor::InstanceId;
use retval_problems::{
    enforce_has_problems, join_problem_messages, join_problem_sets, join_problems,
    join_ret_problems, IntoProblem, ProblemContainer, ProblemReport, Problems,
};
use std::fmt;

/// The outcome of a side-effecting step.
///
/// Unlike the value-carrying results, an empty problem list is a valid way
/// to build a `RetVoid`: it means success.
#[must_use = "a RetVoid must be checked for problems"]
pub struct RetVoid {
    inner: Tracked<()>,
}

impl RetVoid {
    #[track_caller]
    pub(crate) fn from_outcome(outcome: Outcome<()>) -> Self {
        Self {
            inner: Tracked::register(outcome, "RetVoid"),
        }
    }

    #[track_caller]
    fn from_possible_problems(problems: Problems) -> Self {
        if problems.is_empty() {
            Self::ok()
        } else {
            Self::from_outcome(Outcome::Problems(problems))
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    #[track_caller]
    pub fn ok() -> Self {
        Self::from_outcome(Outcome::Value(()))
    }

    #[track_caller]
    pub fn from_problem(problem: impl IntoProblem) -> Self {
        Self::from_outcome(Outcome::Problems(Problems::single(problem)))
    }

    /// A result holding the given problems; ok when there are none.
    #[track_caller]
    pub fn from_problem_refs<I>(problems: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoProblem,
    {
        Self::from_possible_problems(join_problems(problems))
    }

    /// A result holding the concatenated lists; ok when all are empty.
    #[track_caller]
    pub fn from_problem_sets<'a>(sets: impl IntoIterator<Item = &'a Problems>) -> Self {
        Self::from_possible_problems(join_problem_sets(sets))
    }

    /// A result harvesting the problems of other containers; ok when none
    /// has problems. The containers count as checked.
    #[track_caller]
    pub fn from_problems(containers: &[&dyn ProblemContainer]) -> Self {
        Self::from_possible_problems(join_ret_problems(containers.iter().copied()))
    }

    /// # Errors
    ///
    /// Returns a `ProblemReport` holding every problem when the step
    /// failed.
    pub fn into_result(self) -> Result<(), ProblemReport> {
        match self.inner.release() {
            Outcome::Value(()) => Ok(()),
            Outcome::Problems(problems) => Err(ProblemReport::new(problems)),
        }
    }

    // ========================================================================
    // Short-circuit chaining
    // ========================================================================

    #[track_caller]
    fn then_with<R>(self, on_ok: impl FnOnce() -> R, on_problems: impl FnOnce(Problems) -> R) -> R {
        match self.inner.release() {
            Outcome::Value(()) => on_ok(),
            Outcome::Problems(problems) => on_problems(problems),
        }
    }

    /// Run the next fallible step. Never invoked on a failed result.
    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce() -> RetVal<R>) -> RetVal<R> {
        self.then_with(f, |problems| RetVal::from_outcome(Outcome::Problems(problems)))
    }

    /// Produce a value. Never invoked on a failed result.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce() -> R) -> RetVal<R> {
        self.then_with(
            || RetVal::ok(f()),
            |problems| RetVal::from_outcome(Outcome::Problems(problems)),
        )
    }

    #[track_caller]
    pub fn then_nullable<R>(self, f: impl FnOnce() -> RetNullable<R>) -> RetNullable<R> {
        self.then_with(f, |problems| {
            RetNullable::from_outcome(Outcome::Problems(problems))
        })
    }

    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce() -> Option<R>) -> RetNullable<R> {
        self.then_with(
            || RetNullable::ok(f()),
            |problems| RetNullable::from_outcome(Outcome::Problems(problems)),
        )
    }

    #[track_caller]
    pub fn then_void(self, f: impl FnOnce() -> RetVoid) -> RetVoid {
        self.then_with(f, |problems| RetVoid::from_outcome(Outcome::Problems(problems)))
    }

    /// Run a side effect that cannot fail. Never invoked on a failed result.
    #[track_caller]
    pub fn then_run(self, f: impl FnOnce()) -> RetVoid {
        self.then_with(
            || {
                f();
                RetVoid::ok()
            },
            |problems| RetVoid::from_outcome(Outcome::Problems(problems)),
        )
    }

    // ========================================================================
    // Accumulating chaining
    // ========================================================================

    /// Run `f` regardless of this result, then join both problem lists
    /// (these problems first). `f`'s value survives only if neither side
    /// has problems.
    #[track_caller]
    fn with_then<C, R>(
        self,
        f: impl FnOnce() -> C,
        on_ok: impl FnOnce(C) -> R,
        on_problems: impl FnOnce(Problems) -> R,
    ) -> R
    where
        C: ProblemContainer,
    {
        let mine = self.inner.release().problems();
        let next = f();
        if mine.is_empty() && !next.has_problems() {
            return on_ok(next);
        }
        let theirs = next.any_problems();
        on_problems(join_problem_sets([&mine, &theirs]))
    }

    #[track_caller]
    pub fn with<R>(self, f: impl FnOnce() -> RetVal<R>) -> RetVal<R> {
        self.with_then(f, |next| next, |p| RetVal::from_outcome(Outcome::Problems(p)))
    }

    #[track_caller]
    pub fn with_value<R>(self, f: impl FnOnce() -> R) -> RetVal<R> {
        let mine = self.inner.release().problems();
        let value = f();
        if mine.is_empty() {
            RetVal::ok(value)
        } else {
            RetVal::from_outcome(Outcome::Problems(mine))
        }
    }

    #[track_caller]
    pub fn with_nullable<R>(self, f: impl FnOnce() -> RetNullable<R>) -> RetNullable<R> {
        self.with_then(f, |next| next, |p| RetNullable::from_outcome(Outcome::Problems(p)))
    }

    #[track_caller]
    pub fn with_void(self, f: impl FnOnce() -> RetVoid) -> RetVoid {
        self.with_then(f, |next| next, |p| RetVoid::from_outcome(Outcome::Problems(p)))
    }

    // ========================================================================
    // Forwarding
    // ========================================================================

    #[track_caller]
    fn into_valid_problems(self) -> Problems {
        let problems = self.inner.release().problems();
        enforce_has_problems(&problems);
        problems
    }

    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_problems<R>(self) -> RetVal<R> {
        RetVal::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }

    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_nullable_problems<R>(self) -> RetNullable<R> {
        RetNullable::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }

    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_void_problems(self) -> RetVoid {
        RetVoid::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }
}

impl ProblemContainer for RetVoid {
    fn has_problems(&self) -> bool {
        self.inner.checked().is_problems()
    }

    fn any_problems(&self) -> Problems {
        self.inner.checked().problems()
    }

    fn debug_problems(&self, joined_with: &str) -> String {
        join_problem_messages(joined_with, &self.inner.peek().problems())
    }
}

impl Monitored for RetVoid {
    fn instance_id(&self) -> Option<InstanceId> {
        self.inner.id()
    }
}

impl fmt::Debug for RetVoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.peek() {
            Outcome::Value(()) => f.write_str("RetVoid(ok)"),
            Outcome::Problems(problems) => write!(
                f,
                "RetVoid({} problems: {})",
                problems.len(),
                join_problem_messages("; ", problems)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retval_problems::{LocalizedProblem, ProblemRef};
    use std::cell::Cell;

    fn failed(message: &str) -> RetVoid {
        RetVoid::from_problem(LocalizedProblem::from(message))
    }

    #[test]
    fn test_empty_problems_mean_ok() {
        assert!(RetVoid::from_problem_refs(Vec::<ProblemRef>::new()).is_ok());
        assert!(RetVoid::from_problem_sets([&Problems::NONE, &Problems::NONE]).is_ok());
        let a = RetVoid::ok();
        assert!(RetVoid::from_problems(&[&a]).is_ok());
    }

    #[test]
    fn test_then_short_circuits() {
        let calls = Cell::new(0);
        let ret = failed("stop").then_run(|| calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 0);
        assert_eq!(ret.valid_problems().messages(), vec!["stop"]);

        let ret = RetVoid::ok().map(|| 3);
        assert_eq!(ret.get_value(), &3);
    }

    #[test]
    fn test_with_always_runs_and_joins() {
        let calls = Cell::new(0);
        let ret = failed("first").with_void(|| {
            calls.set(calls.get() + 1);
            failed("second")
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(ret.valid_problems().messages(), vec!["first", "second"]);
    }

    #[test]
    fn test_with_keeps_value_when_clean() {
        let ret = RetVoid::ok().with(|| RetVal::ok("v"));
        assert_eq!(ret.get_value(), &"v");

        let ret = failed("early").with(|| RetVal::ok("v"));
        assert_eq!(ret.valid_problems().messages(), vec!["early"]);

        let ret = RetVoid::ok().with_nullable(|| RetNullable::<i32>::from_problem(LocalizedProblem::from("late")));
        assert_eq!(ret.valid_problems().messages(), vec!["late"]);
    }

    #[test]
    fn test_with_value_runs_supplier() {
        let calls = Cell::new(0);
        let ret = failed("x").with_value(|| calls.set(calls.get() + 1));
        assert_eq!(calls.get(), 1);
        assert!(ret.has_problems());
    }

    #[test]
    fn test_into_result() {
        assert!(RetVoid::ok().into_result().is_ok());
        let err = failed("nope").into_result().expect_err("should fail");
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", RetVoid::ok()), "RetVoid(ok)");
        assert_eq!(format!("{:?}", failed("a")), "RetVoid(1 problems: a)");
    }
}
