//! `RetVal<T>`: a value or a non-empty list of problems.

use crate::outcome::{Monitored, Outcome, Tracked};
use crate::ret_nullable::RetNullable;
use crate::ret_void::RetVoid;
use retval_monitor::InstanceId;
use retval_problems::{
    enforce_has_problems, join_problem_messages, join_problem_sets, join_problems,
    join_ret_problems, IntoProblem, ProblemContainer, ProblemReport, Problems,
};
use std::fmt;

/// The outcome of a fallible computation that produces a value.
///
/// Combinators consume the receiver. When a combinator hands the outcome to
/// a new container, the receiver counts as checked and the returned
/// container carries the obligation instead.
#[must_use = "a RetVal must be checked for problems"]
pub struct RetVal<T> {
    inner: Tracked<T>,
}

impl<T> RetVal<T> {
    #[track_caller]
    pub(crate) fn from_outcome(outcome: Outcome<T>) -> Self {
        Self {
            inner: Tracked::register(outcome, std::any::type_name::<Self>()),
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// A successful result.
    #[track_caller]
    pub fn ok(value: T) -> Self {
        Self::from_outcome(Outcome::Value(value))
    }

    /// A failed result with a single problem.
    #[track_caller]
    pub fn from_problem(problem: impl IntoProblem) -> Self {
        Self::from_outcome(Outcome::Problems(Problems::single(problem)))
    }

    /// A failed result with the given problems.
    ///
    /// # Panics
    ///
    /// Panics when `problems` is empty.
    #[track_caller]
    pub fn from_problem_refs<I>(problems: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoProblem,
    {
        Self::from_outcome(Outcome::failed(join_problems(problems)))
    }

    /// A failed result with the concatenation of the given problem lists.
    ///
    /// # Panics
    ///
    /// Panics when every list is empty.
    #[track_caller]
    pub fn from_problem_sets<'a>(sets: impl IntoIterator<Item = &'a Problems>) -> Self {
        Self::from_outcome(Outcome::failed(join_problem_sets(sets)))
    }

    /// A failed result harvesting the problems of other containers.
    ///
    /// The containers count as checked.
    ///
    /// # Panics
    ///
    /// Panics when none of the containers has problems.
    #[track_caller]
    pub fn from_problems(containers: &[&dyn ProblemContainer]) -> Self {
        Self::from_outcome(Outcome::failed(join_ret_problems(
            containers.iter().copied(),
        )))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The value. Does not count as a check.
    ///
    /// # Panics
    ///
    /// Panics when the result has problems.
    #[track_caller]
    pub fn get_value(&self) -> &T {
        match self.inner.peek() {
            Outcome::Value(value) => value,
            Outcome::Problems(problems) => {
                panic!("value requested from a container with problems: {problems}")
            }
        }
    }

    /// Consume the result, returning the value. Does not count as a check.
    ///
    /// # Panics
    ///
    /// Panics when the result has problems.
    #[track_caller]
    pub fn into_value(self) -> T {
        match self.inner.into_unchecked() {
            Outcome::Value(value) => value,
            Outcome::Problems(problems) => {
                panic!("value requested from a container with problems: {problems}")
            }
        }
    }

    /// The value, or `None` when the result has problems. Does not count as
    /// a check.
    pub fn result(&self) -> Option<&T> {
        self.inner.peek().value()
    }

    /// Same as `result`.
    pub fn as_optional(&self) -> Option<&T> {
        self.result()
    }

    /// Consume the result, discarding any problems. Does not count as a
    /// check.
    pub fn into_optional(self) -> Option<T> {
        match self.inner.into_unchecked() {
            Outcome::Value(value) => Some(value),
            Outcome::Problems(_) => None,
        }
    }

    /// Leave railway style: the value, or the problems as an error.
    ///
    /// # Errors
    ///
    /// Returns a `ProblemReport` holding every problem when the result
    /// failed.
    pub fn into_result(self) -> Result<T, ProblemReport> {
        match self.inner.release() {
            Outcome::Value(value) => Ok(value),
            Outcome::Problems(problems) => Err(ProblemReport::new(problems)),
        }
    }

    // ========================================================================
    // Chaining
    // ========================================================================

    /// Transform the value. Never invoked on a failed result.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce(T) -> R) -> RetVal<R> {
        match self.inner.release() {
            Outcome::Value(value) => RetVal::ok(f(value)),
            Outcome::Problems(problems) => RetVal::from_outcome(Outcome::Problems(problems)),
        }
    }

    /// Run the next fallible step. Never invoked on a failed result.
    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce(T) -> RetVal<R>) -> RetVal<R> {
        match self.inner.release() {
            Outcome::Value(value) => f(value),
            Outcome::Problems(problems) => RetVal::from_outcome(Outcome::Problems(problems)),
        }
    }

    #[track_caller]
    pub fn then_nullable<R>(self, f: impl FnOnce(T) -> RetNullable<R>) -> RetNullable<R> {
        match self.inner.release() {
            Outcome::Value(value) => f(value),
            Outcome::Problems(problems) => RetNullable::from_outcome(Outcome::Problems(problems)),
        }
    }

    /// Transform the value into a possibly absent one.
    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce(T) -> Option<R>) -> RetNullable<R> {
        match self.inner.release() {
            Outcome::Value(value) => RetNullable::ok(f(value)),
            Outcome::Problems(problems) => RetNullable::from_outcome(Outcome::Problems(problems)),
        }
    }

    #[track_caller]
    pub fn then_void(self, f: impl FnOnce(T) -> RetVoid) -> RetVoid {
        match self.inner.release() {
            Outcome::Value(value) => f(value),
            Outcome::Problems(problems) => RetVoid::from_outcome(Outcome::Problems(problems)),
        }
    }

    /// Hand the value to a consumer that cannot fail.
    #[track_caller]
    pub fn consume(self, f: impl FnOnce(T)) -> RetVoid {
        match self.inner.release() {
            Outcome::Value(value) => {
                f(value);
                RetVoid::ok()
            }
            Outcome::Problems(problems) => RetVoid::from_outcome(Outcome::Problems(problems)),
        }
    }

    /// Run a side effect with the value, keeping this result.
    pub fn then_run(self, f: impl FnOnce(&T)) -> Self {
        if let Outcome::Value(value) = self.inner.peek() {
            f(value);
        }
        self
    }

    /// Validate the value. A validator with problems replaces this result
    /// with those problems; otherwise this result is kept.
    #[track_caller]
    pub fn then_validate<C: ProblemContainer>(self, f: impl FnOnce(&T) -> C) -> Self {
        let validation = match self.inner.peek() {
            Outcome::Value(value) => f(value),
            Outcome::Problems(_) => return self,
        };
        if validation.has_problems() {
            let _ = self.inner.release();
            Self::from_outcome(Outcome::Problems(validation.valid_problems()))
        } else {
            self
        }
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

    /// Re-type a failed result.
    ///
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

    /// View as a nullable result whose value is always present.
    #[track_caller]
    pub fn as_nullable(self) -> RetNullable<T> {
        match self.inner.release() {
            Outcome::Value(value) => RetNullable::ok(Some(value)),
            Outcome::Problems(problems) => RetNullable::from_outcome(Outcome::Problems(problems)),
        }
    }
}

impl<T> ProblemContainer for RetVal<T> {
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

impl<T> Monitored for RetVal<T> {
    fn instance_id(&self) -> Option<InstanceId> {
        self.inner.id()
    }
}

impl<T: fmt::Debug> fmt::Debug for RetVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.peek() {
            Outcome::Value(value) => write!(f, "RetVal(value: {value:?})"),
            Outcome::Problems(problems) => write!(
                f,
                "RetVal({} problems: {})",
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

    fn problem(message: &str) -> ProblemRef {
        LocalizedProblem::from(message).into_problem_ref()
    }

    #[test]
    fn test_ok_holds_value() {
        let ret = RetVal::ok(5);
        assert!(ret.is_ok());
        assert!(!ret.has_problems());
        assert!(ret.any_problems().is_empty());
        assert_eq!(ret.get_value(), &5);
        assert_eq!(ret.result(), Some(&5));
    }

    #[test]
    fn test_failed_holds_problems_in_order() {
        let ret: RetVal<i32> = RetVal::from_problem_refs(vec![problem("a"), problem("b")]);
        assert!(ret.has_problems());
        assert!(ret.is_problem());
        assert_eq!(ret.valid_problems().messages(), vec!["a", "b"]);
        assert_eq!(ret.result(), None);
        assert_eq!(ret.debug_problems(", "), "a, b");
    }

    #[test]
    #[should_panic(expected = "contains no problems")]
    fn test_from_empty_problem_refs_panics() {
        let _ = RetVal::<i32>::from_problem_refs(Vec::<ProblemRef>::new());
    }

    #[test]
    #[should_panic(expected = "contains no problems")]
    fn test_from_ok_containers_panics() {
        let a = RetVal::ok(1);
        let _ = RetVal::<i32>::from_problems(&[&a]);
    }

    #[test]
    #[should_panic(expected = "value requested from a container with problems")]
    fn test_get_value_on_failure_panics() {
        let ret: RetVal<i32> = RetVal::from_problem(LocalizedProblem::from("x"));
        let _ = ret.get_value();
    }

    #[test]
    fn test_map_then_chain() {
        let ret = RetVal::ok(5).map(|x| x + 1).then(|x| RetVal::ok(x * 2));
        assert!(ret.is_ok());
        assert_eq!(ret.get_value(), &12);
    }

    #[test]
    fn test_map_not_invoked_on_failure() {
        let calls = Cell::new(0);
        let ret: RetVal<i32> = RetVal::from_problem(LocalizedProblem::from("P1"));
        let mapped = ret.map(|x| {
            calls.set(calls.get() + 1);
            x + 1
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(mapped.valid_problems().messages(), vec!["P1"]);
    }

    #[test]
    fn test_then_validate() {
        let kept = RetVal::ok(3).then_validate(|_| RetVoid::ok());
        assert_eq!(kept.get_value(), &3);

        let rejected = RetVal::ok(3).then_validate(|x| {
            RetVoid::from_problem(LocalizedProblem::from(format!("{x} is odd")))
        });
        assert_eq!(rejected.valid_problems().messages(), vec!["3 is odd"]);
    }

    #[test]
    fn test_then_run_keeps_self() {
        let seen = Cell::new(0);
        let ret = RetVal::ok(7).then_run(|x| seen.set(*x));
        assert_eq!(seen.get(), 7);
        assert_eq!(ret.get_value(), &7);
    }

    #[test]
    fn test_consume_and_void() {
        let seen = Cell::new(0);
        let done = RetVal::ok(9).consume(|x| seen.set(x));
        assert!(done.is_ok());
        assert_eq!(seen.get(), 9);

        let failed = RetVal::<i32>::from_problem(LocalizedProblem::from("no"))
            .then_void(|_| RetVoid::ok());
        assert_eq!(failed.valid_problems().messages(), vec!["no"]);
    }

    #[test]
    fn test_forward_problems() {
        let ret: RetVal<i32> = RetVal::from_problem(LocalizedProblem::from("bad"));
        let forwarded: RetVal<String> = ret.forward_problems();
        assert_eq!(forwarded.valid_problems().messages(), vec!["bad"]);
    }

    #[test]
    #[should_panic(expected = "contains no problems")]
    fn test_forward_ok_panics() {
        let _ = RetVal::ok(1).forward_void_problems();
    }

    #[test]
    fn test_into_result() {
        assert_eq!(RetVal::ok("x").into_result().expect("ok"), "x");
        let err = RetVal::<i32>::from_problem(LocalizedProblem::from("broken"))
            .into_result()
            .expect_err("should fail");
        assert_eq!(err.problems().messages(), vec!["broken"]);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", RetVal::ok(4)), "RetVal(value: 4)");
        let ret: RetVal<i32> = RetVal::from_problem_refs(vec![problem("a"), problem("b")]);
        assert_eq!(format!("{ret:?}"), "RetVal(2 problems: a; b)");
        assert!(ret.is_problem());
    }
}
