//! `RetNullable<T>`: a possibly absent value, or a non-empty list of
//! problems.

use crate::outcome::{Monitored, Outcome, Tracked};
use crate::ret_val::RetVal;
use crate::ret_void::RetVoid;
use retval_monitor::InstanceId;
use retval_problems::{
    enforce_has_problems, join_problem_messages, join_problem_sets, join_problems,
    join_ret_problems, IntoProblem, ProblemContainer, ProblemReport, Problems,
    ValueRequiredProblem,
};
use std::fmt;

/// The three states of a nullable result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullableState {
    /// Succeeded with a value.
    Present,
    /// Succeeded without a value.
    Absent,
    /// Failed with problems.
    Failed,
}

/// Like `RetVal`, except that success may carry no value.
///
/// Absence and failure are distinct: `state()` tells them apart.
#[must_use = "a RetNullable must be checked for problems"]
pub struct RetNullable<T> {
    inner: Tracked<Option<T>>,
}

impl<T> RetNullable<T> {
    #[track_caller]
    pub(crate) fn from_outcome(outcome: Outcome<Option<T>>) -> Self {
        Self {
            inner: Tracked::register(outcome, std::any::type_name::<Self>()),
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    /// A successful result, with or without a value.
    #[track_caller]
    pub fn ok(value: Option<T>) -> Self {
        Self::from_outcome(Outcome::Value(value))
    }

    /// A successful result with a value.
    #[track_caller]
    pub fn some(value: T) -> Self {
        Self::ok(Some(value))
    }

    #[track_caller]
    pub fn from_problem(problem: impl IntoProblem) -> Self {
        Self::from_outcome(Outcome::Problems(Problems::single(problem)))
    }

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

    /// # Panics
    ///
    /// Panics when every list is empty.
    #[track_caller]
    pub fn from_problem_sets<'a>(sets: impl IntoIterator<Item = &'a Problems>) -> Self {
        Self::from_outcome(Outcome::failed(join_problem_sets(sets)))
    }

    /// A failed result harvesting the problems of other containers.
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

    /// Which of the three states this result is in. Counts as a check.
    pub fn state(&self) -> NullableState {
        match self.inner.checked() {
            Outcome::Value(Some(_)) => NullableState::Present,
            Outcome::Value(None) => NullableState::Absent,
            Outcome::Problems(_) => NullableState::Failed,
        }
    }

    /// The possibly absent value. Does not count as a check.
    ///
    /// # Panics
    ///
    /// Panics when the result has problems.
    #[track_caller]
    pub fn get_value(&self) -> Option<&T> {
        match self.inner.peek() {
            Outcome::Value(value) => value.as_ref(),
            Outcome::Problems(problems) => {
                panic!("value requested from a container with problems: {problems}")
            }
        }
    }

    /// # Panics
    ///
    /// Panics when the result has problems.
    #[track_caller]
    pub fn into_value(self) -> Option<T> {
        match self.inner.into_unchecked() {
            Outcome::Value(value) => value,
            Outcome::Problems(problems) => {
                panic!("value requested from a container with problems: {problems}")
            }
        }
    }

    /// The value, or `None` when absent or failed. Does not count as a
    /// check.
    pub fn result(&self) -> Option<&T> {
        self.inner.peek().value().and_then(Option::as_ref)
    }

    /// Same as `result`.
    pub fn as_optional(&self) -> Option<&T> {
        self.result()
    }

    /// Consume the result, discarding any problems. Does not count as a
    /// check.
    pub fn into_optional(self) -> Option<T> {
        match self.inner.into_unchecked() {
            Outcome::Value(value) => value,
            Outcome::Problems(_) => None,
        }
    }

    /// # Errors
    ///
    /// Returns a `ProblemReport` holding every problem when the result
    /// failed.
    pub fn into_result(self) -> Result<Option<T>, ProblemReport> {
        match self.inner.release() {
            Outcome::Value(value) => Ok(value),
            Outcome::Problems(problems) => Err(ProblemReport::new(problems)),
        }
    }

    // ========================================================================
    // Chaining
    // ========================================================================

    #[track_caller]
    fn then_with<R>(
        self,
        on_value: impl FnOnce(Option<T>) -> R,
        on_problems: impl FnOnce(Problems) -> R,
    ) -> R {
        match self.inner.release() {
            Outcome::Value(value) => on_value(value),
            Outcome::Problems(problems) => on_problems(problems),
        }
    }

    /// Transform the possibly absent value into a present one.
    #[track_caller]
    pub fn map<R>(self, f: impl FnOnce(Option<T>) -> R) -> RetVal<R> {
        self.then_with(
            |value| RetVal::ok(f(value)),
            |problems| RetVal::from_outcome(Outcome::Problems(problems)),
        )
    }

    #[track_caller]
    pub fn then<R>(self, f: impl FnOnce(Option<T>) -> RetVal<R>) -> RetVal<R> {
        self.then_with(f, |problems| RetVal::from_outcome(Outcome::Problems(problems)))
    }

    #[track_caller]
    pub fn map_nullable<R>(self, f: impl FnOnce(Option<T>) -> Option<R>) -> RetNullable<R> {
        self.then_with(
            |value| RetNullable::ok(f(value)),
            |problems| RetNullable::from_outcome(Outcome::Problems(problems)),
        )
    }

    #[track_caller]
    pub fn then_nullable<R>(
        self,
        f: impl FnOnce(Option<T>) -> RetNullable<R>,
    ) -> RetNullable<R> {
        self.then_with(f, |problems| {
            RetNullable::from_outcome(Outcome::Problems(problems))
        })
    }

    #[track_caller]
    pub fn then_void(self, f: impl FnOnce(Option<T>) -> RetVoid) -> RetVoid {
        self.then_with(f, |problems| RetVoid::from_outcome(Outcome::Problems(problems)))
    }

    #[track_caller]
    pub fn consume(self, f: impl FnOnce(Option<T>)) -> RetVoid {
        self.then_with(
            |value| {
                f(value);
                RetVoid::ok()
            },
            |problems| RetVoid::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Run a side effect with the possibly absent value, keeping this
    /// result.
    pub fn then_run(self, f: impl FnOnce(Option<&T>)) -> Self {
        if let Outcome::Value(value) = self.inner.peek() {
            f(value.as_ref());
        }
        self
    }

    /// Validate the possibly absent value. A validator with problems
    /// replaces this result with those problems.
    #[track_caller]
    pub fn then_validate<C: ProblemContainer>(self, f: impl FnOnce(Option<&T>) -> C) -> Self {
        let validation = match self.inner.peek() {
            Outcome::Value(value) => f(value.as_ref()),
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
    // Absence handling
    // ========================================================================

    /// Narrow to a non-null result. An absent value becomes a
    /// `ValueRequiredProblem`.
    #[track_caller]
    pub fn as_nonnull(self) -> RetVal<T> {
        self.require_nonnull(ValueRequiredProblem)
    }

    /// Narrow to a non-null result, failing with `problem` when absent.
    #[track_caller]
    pub fn require_nonnull(self, problem: impl IntoProblem) -> RetVal<T> {
        self.then_with(
            |value| match value {
                Some(value) => RetVal::ok(value),
                None => RetVal::from_problem(problem),
            },
            |problems| RetVal::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Substitute `default` for an absent value.
    #[track_caller]
    pub fn default_as(self, default: T) -> RetVal<T> {
        self.then_with(
            |value| RetVal::ok(value.unwrap_or(default)),
            |problems| RetVal::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Map a present value, or substitute `default` when absent.
    #[track_caller]
    pub fn default_or_map<R>(self, default: R, f: impl FnOnce(T) -> R) -> RetVal<R> {
        self.then_with(
            |value| RetVal::ok(value.map_or(default, f)),
            |problems| RetVal::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Map a present value; an absent value stays absent.
    #[track_caller]
    pub fn null_or_map<R>(self, f: impl FnOnce(T) -> R) -> RetNullable<R> {
        self.then_with(
            |value| RetNullable::ok(value.map(f)),
            |problems| RetNullable::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Run the next step for a present value; an absent value stays absent.
    #[track_caller]
    pub fn null_or_then_nullable<R>(
        self,
        f: impl FnOnce(T) -> RetNullable<R>,
    ) -> RetNullable<R> {
        self.then_with(
            |value| match value {
                Some(value) => f(value),
                None => RetNullable::ok(None),
            },
            |problems| RetNullable::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Hand a present value to a consumer. Absence is a success.
    #[track_caller]
    pub fn consume_if_present(self, f: impl FnOnce(T)) -> RetVoid {
        self.then_with(
            |value| {
                if let Some(value) = value {
                    f(value);
                }
                RetVoid::ok()
            },
            |problems| RetVoid::from_outcome(Outcome::Problems(problems)),
        )
    }

    /// Run a fallible step for a present value. Absence is a success.
    #[track_caller]
    pub fn then_void_if_present(self, f: impl FnOnce(T) -> RetVoid) -> RetVoid {
        self.then_with(
            |value| match value {
                Some(value) => f(value),
                None => RetVoid::ok(),
            },
            |problems| RetVoid::from_outcome(Outcome::Problems(problems)),
        )
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
    pub fn forward_problems<R>(self) -> RetNullable<R> {
        RetNullable::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }

    /// Same as `forward_problems`.
    ///
    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_nullable_problems<R>(self) -> RetNullable<R> {
        self.forward_problems()
    }

    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_val_problems<R>(self) -> RetVal<R> {
        RetVal::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }

    /// # Panics
    ///
    /// Panics when the result has no problems.
    #[track_caller]
    pub fn forward_void_problems(self) -> RetVoid {
        RetVoid::from_outcome(Outcome::Problems(self.into_valid_problems()))
    }
}

impl<T> ProblemContainer for RetNullable<T> {
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

impl<T> Monitored for RetNullable<T> {
    fn instance_id(&self) -> Option<InstanceId> {
        self.inner.id()
    }
}

impl<T: fmt::Debug> fmt::Debug for RetNullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.peek() {
            Outcome::Value(value) => write!(f, "RetNullable(value: {value:?})"),
            Outcome::Problems(problems) => write!(
                f,
                "RetNullable({} problems: {})",
                problems.len(),
                join_problem_messages("; ", problems)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retval_problems::LocalizedProblem;
    use std::cell::Cell;

    #[test]
    fn test_three_states() {
        assert_eq!(RetNullable::some(1).state(), NullableState::Present);
        assert_eq!(RetNullable::<i32>::ok(None).state(), NullableState::Absent);
        assert_eq!(
            RetNullable::<i32>::from_problem(LocalizedProblem::from("x")).state(),
            NullableState::Failed
        );
    }

    #[test]
    fn test_absent_is_ok() {
        let ret = RetNullable::<String>::ok(None);
        assert!(ret.is_ok());
        assert_eq!(ret.get_value(), None);
        assert_eq!(ret.result(), None);
    }

    #[test]
    fn test_as_nonnull_absent_requires_value() {
        let ret = RetNullable::<i32>::ok(None).as_nonnull();
        let problems = ret.valid_problems();
        assert_eq!(problems.len(), 1);
        assert!(problems.as_slice()[0].is::<ValueRequiredProblem>());
    }

    #[test]
    fn test_as_nonnull_present() {
        let ret = RetNullable::some(4).as_nonnull();
        assert_eq!(ret.get_value(), &4);
        assert!(ret.is_ok());
    }

    #[test]
    fn test_require_nonnull_custom_problem() {
        let ret = RetNullable::<i32>::ok(None).require_nonnull(LocalizedProblem::from("port missing"));
        assert_eq!(ret.valid_problems().messages(), vec!["port missing"]);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(RetNullable::<i32>::ok(None).default_as(8).into_result().expect("ok"), 8);
        assert_eq!(RetNullable::some(2).default_as(8).into_result().expect("ok"), 2);
        assert_eq!(
            RetNullable::some(3).default_or_map(0, |x| x * 10).into_result().expect("ok"),
            30
        );
        assert_eq!(
            RetNullable::<i32>::ok(None).default_or_map(0, |x| x * 10).into_result().expect("ok"),
            0
        );
    }

    #[test]
    fn test_null_or_map_skips_absent() {
        let calls = Cell::new(0);
        let ret = RetNullable::<i32>::ok(None).null_or_map(|x| {
            calls.set(calls.get() + 1);
            x + 1
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(ret.state(), NullableState::Absent);

        let ret = RetNullable::some(1).null_or_then_nullable(|x| RetNullable::some(x + 1));
        assert_eq!(ret.into_result().expect("ok"), Some(2));
    }

    #[test]
    fn test_consume_if_present() {
        let seen = Cell::new(0);
        assert!(RetNullable::some(6).consume_if_present(|x| seen.set(x)).is_ok());
        assert_eq!(seen.get(), 6);
        assert!(RetNullable::<i32>::ok(None).consume_if_present(|_| seen.set(-1)).is_ok());
        assert_eq!(seen.get(), 6);
    }

    #[test]
    fn test_failure_short_circuits() {
        let calls = Cell::new(0);
        let ret = RetNullable::<i32>::from_problem(LocalizedProblem::from("gone")).then(|_| {
            calls.set(calls.get() + 1);
            RetVal::ok(1)
        });
        assert_eq!(calls.get(), 0);
        assert_eq!(ret.valid_problems().as_slice()[0].local_message(), "gone");
    }

    #[test]
    fn test_forwarding() {
        let ret = RetNullable::<i32>::from_problem(LocalizedProblem::from("f"));
        let val: RetVal<String> = ret.forward_val_problems();
        assert_eq!(val.debug_problems(","), "f");
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", RetNullable::some(1)), "RetNullable(value: Some(1))");
        assert_eq!(format!("{:?}", RetNullable::<i32>::ok(None)), "RetNullable(value: None)");
    }
}
