//! The capability shared by every result container.

use crate::problem::ProblemRef;
use crate::problems::Problems;

/// Read access to the problems held by a result container.
///
/// Monitored containers treat every call here except `debug_problems` as
/// the caller having looked at the outcome.
pub trait ProblemContainer {
    /// True when the container holds at least one problem.
    fn has_problems(&self) -> bool;

    /// Same as `has_problems`.
    fn is_problem(&self) -> bool {
        self.has_problems()
    }

    /// True when the container holds no problems.
    fn is_ok(&self) -> bool {
        !self.has_problems()
    }

    /// The problems, possibly empty.
    fn any_problems(&self) -> Problems;

    /// The problems, which must be non-empty.
    ///
    /// # Panics
    ///
    /// Panics when the container holds no problems.
    #[track_caller]
    fn valid_problems(&self) -> Problems {
        let problems = self.any_problems();
        crate::algebra::enforce_has_problems(&problems);
        problems
    }

    /// Join the problem messages with `joined_with`, for debug logging.
    fn debug_problems(&self, joined_with: &str) -> String;

    /// Append this container's problems to `sink`.
    fn join_problems_with(&self, sink: &mut Vec<ProblemRef>) {
        sink.extend(self.any_problems().iter().cloned());
    }
}

impl ProblemContainer for Problems {
    fn has_problems(&self) -> bool {
        !self.is_empty()
    }

    fn any_problems(&self) -> Problems {
        self.clone()
    }

    fn debug_problems(&self, joined_with: &str) -> String {
        crate::algebra::join_problem_messages(joined_with, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LocalizedProblem;

    #[test]
    fn test_problems_as_container() {
        let problems: Problems = vec![LocalizedProblem::from("a"), LocalizedProblem::from("b")]
            .into_iter()
            .collect();
        assert!(problems.has_problems());
        assert!(!problems.is_ok());
        assert_eq!(problems.debug_problems(", "), "a, b");

        let mut sink = Vec::new();
        problems.join_problems_with(&mut sink);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    #[should_panic(expected = "contains no problems")]
    fn test_valid_problems_on_empty_panics() {
        let _ = Problems::NONE.valid_problems();
    }
}
