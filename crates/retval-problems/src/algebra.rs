//! Aggregation helpers over problems and problem containers.
//!
//! Every join preserves input order. Joining nothing yields `NO_PROBLEMS`.

use crate::container::ProblemContainer;
use crate::problem::{IntoProblem, ProblemRef};
use crate::problems::Problems;

/// Join individual problems into one list.
#[must_use]
pub fn join_problems<I>(problems: I) -> Problems
where
    I: IntoIterator,
    I::Item: IntoProblem,
{
    problems.into_iter().collect()
}

/// Concatenate problem lists, in order.
#[must_use]
pub fn join_problem_sets<'a, I>(sets: I) -> Problems
where
    I: IntoIterator<Item = &'a Problems>,
{
    let mut all: Vec<ProblemRef> = Vec::new();
    for set in sets {
        all.extend(set.iter().cloned());
    }
    Problems::from_vec(all)
}

/// Concatenate the problems of several containers, in order.
///
/// Monitored containers count this as having been checked.
#[must_use]
pub fn join_ret_problems<'a, I>(containers: I) -> Problems
where
    I: IntoIterator<Item = &'a dyn ProblemContainer>,
{
    let mut all: Vec<ProblemRef> = Vec::new();
    for container in containers {
        container.join_problems_with(&mut all);
    }
    Problems::from_vec(all)
}

/// Concatenate the problems of several groups of containers, in order.
#[must_use]
pub fn join_ret_problem_sets<'a, I, G>(groups: I) -> Problems
where
    I: IntoIterator<Item = G>,
    G: IntoIterator<Item = &'a dyn ProblemContainer>,
{
    let mut all: Vec<ProblemRef> = Vec::new();
    for group in groups {
        for container in group {
            container.join_problems_with(&mut all);
        }
    }
    Problems::from_vec(all)
}

/// Assert that a list is empty, returning it.
///
/// # Panics
///
/// Panics with "contains problems" when the list is non-empty.
#[track_caller]
pub fn enforce_no_problems(problems: &Problems) -> &Problems {
    if !problems.is_empty() {
        panic!("contains problems: {problems}");
    }
    problems
}

/// Assert that a list is non-empty, returning it.
///
/// # Panics
///
/// Panics with "contains no problems" when the list is empty.
#[track_caller]
pub fn enforce_has_problems(problems: &Problems) -> &Problems {
    if problems.is_empty() {
        panic!("contains no problems");
    }
    problems
}

/// Join the local messages of the problems with `join_text`.
#[must_use]
pub fn join_problem_messages(join_text: &str, problems: &Problems) -> String {
    problems.messages().join(join_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{FileProblem, LocalizedProblem};

    fn problems(messages: &[&str]) -> Problems {
        messages
            .iter()
            .map(|m| LocalizedProblem::from(*m))
            .collect()
    }

    #[test]
    fn test_join_nothing_is_empty() {
        assert!(join_problems(Vec::<LocalizedProblem>::new()).is_empty());
        assert!(join_problem_sets(std::iter::empty::<&Problems>()).is_empty());
        assert!(join_ret_problems(std::iter::empty::<&dyn ProblemContainer>()).is_empty());
    }

    #[test]
    fn test_join_problem_sets_keeps_order() {
        let a = problems(&["a1", "a2"]);
        let b = Problems::NONE;
        let c = problems(&["c1"]);
        let joined = join_problem_sets([&a, &b, &c]);
        assert_eq!(joined.messages(), vec!["a1", "a2", "c1"]);
    }

    #[test]
    fn test_join_ret_problem_sets() {
        let a = problems(&["a"]);
        let b = problems(&["b"]);
        let c = problems(&["c"]);
        let first: Vec<&dyn ProblemContainer> = vec![&a, &b];
        let second: Vec<&dyn ProblemContainer> = vec![&c];
        let joined = join_ret_problem_sets([first, second]);
        assert_eq!(joined.messages(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_join_problem_messages() {
        let p = join_problems(vec![
            LocalizedProblem::from("one").into_problem_ref(),
            FileProblem::new("x.txt", "two").into_problem_ref(),
        ]);
        assert_eq!(join_problem_messages(", ", &p), "one, two");
        assert_eq!(join_problem_messages(", ", &Problems::NONE), "");
    }

    #[test]
    fn test_enforce_passes_through() {
        let p = problems(&["x"]);
        assert!(enforce_has_problems(&p).ptr_eq(&p));
        assert!(enforce_no_problems(&Problems::NONE).is_empty());
    }

    #[test]
    #[should_panic(expected = "contains problems")]
    fn test_enforce_no_problems_panics() {
        enforce_no_problems(&problems(&["x"]));
    }

    #[test]
    #[should_panic(expected = "contains no problems")]
    fn test_enforce_has_problems_panics() {
        enforce_has_problems(&Problems::NONE);
    }
}
