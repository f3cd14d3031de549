//! Problem diagnostics for the retval result containers.
//!
//! This crate provides:
//! - The `Problem` capability and a handful of concrete problems
//! - `Problems`, the immutable ordered list every container carries
//! - The problem-aggregation algebra (`join_*`, `enforce_*`)
//! - The `ProblemContainer` capability shared by every result type
//! - `ProblemReport`, a `miette` diagnostic for rendering a failed computation
//!
//! Problems are values. Nothing here raises a domain problem as a panic; the
//! only panics are contract violations by the calling code (for example,
//! asking for the problems of a container that has none).

pub mod algebra;
pub mod container;
pub mod problem;
pub mod problems;
pub mod report;

pub use algebra::{
    enforce_has_problems, enforce_no_problems, join_problem_messages, join_problem_sets,
    join_problems, join_ret_problem_sets, join_ret_problems,
};
pub use container::ProblemContainer;
pub use problem::{
    FileProblem, IntoProblem, LocalizedProblem, Problem, ProblemRef, SourcedProblem,
    UnhandledExceptionProblem, ValueRequiredProblem,
};
pub use problems::{Problems, NO_PROBLEMS};
pub use report::{ProblemDiagnostic, ProblemReport};
