//! `WarningVal<T>`: a value that always succeeds, with warnings attached.

use retval_problems::{join_problem_messages, ProblemContainer, Problems};
use std::fmt;

/// A value that is always present, with advisory problems alongside.
///
/// The problems do not mean failure, so a `WarningVal` is not monitored.
pub struct WarningVal<T> {
    value: T,
    problems: Problems,
}

impl<T> WarningVal<T> {
    /// A value with no warnings.
    pub fn from(value: T) -> Self {
        Self {
            value,
            problems: Problems::NONE,
        }
    }

    /// A value carrying the problems of `container` as warnings.
    pub fn from_with(value: T, container: &dyn ProblemContainer) -> Self {
        Self {
            value,
            problems: container.any_problems(),
        }
    }

    pub fn with_problems(value: T, problems: Problems) -> Self {
        Self { value, problems }
    }

    pub fn get_value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Problems) {
        (self.value, self.problems)
    }
}

impl<T> ProblemContainer for WarningVal<T> {
    fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    fn any_problems(&self) -> Problems {
        self.problems.clone()
    }

    fn debug_problems(&self, joined_with: &str) -> String {
        join_problem_messages(joined_with, &self.problems)
    }
}

impl<T: fmt::Debug> fmt::Debug for WarningVal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "WarningVal(value: {:?}, {} problems: {})",
            self.value,
            self.problems.len(),
            join_problem_messages("; ", &self.problems)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retval_problems::LocalizedProblem;

    #[test]
    fn test_value_always_present() {
        let warn = WarningVal::with_problems(10, Problems::single(LocalizedProblem::from("slow")));
        assert!(warn.has_problems());
        assert_eq!(warn.get_value(), &10);
        let (value, problems) = warn.into_parts();
        assert_eq!(value, 10);
        assert_eq!(problems.messages(), vec!["slow"]);
    }

    #[test]
    fn test_plain_value_is_ok() {
        let warn = WarningVal::from("x");
        assert!(warn.is_ok());
        assert_eq!(format!("{warn:?}"), "WarningVal(value: \"x\", 0 problems: )");
    }
}
