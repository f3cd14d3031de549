//! Railway-oriented result containers.
//!
//! This crate provides:
//! - `RetVal`, `RetNullable` and `RetVoid`: a value (or no value) on
//!   success, or a non-empty list of problems on failure
//! - `WarningVal`: a value with advisory problems attached
//! - `ProblemCollector`, `ValueAccumulator` and `ValueBuilder` for
//!   gathering every problem from many independent steps
//! - `CloseableCollection` for releasing a bundle of resources together
//!
//! Domain problems are values and flow through the containers. Misusing a
//! container (reading the value of a failed result, forwarding problems
//! that do not exist) is a bug in the calling code and panics at the call
//! site.
//!
//! Every container registers with the process-wide check monitor from
//! `retval-monitor`. The default monitor does nothing; the debug and mock
//! monitors report containers dropped without being inspected.
//!
//! ```
//! use retval::{ProblemContainer, RetVal};
//!
//! let ret = RetVal::ok(5).map(|x| x + 1).then(|x| RetVal::ok(x * 2));
//! assert!(ret.is_ok());
//! assert_eq!(ret.get_value(), &12);
//! ```

pub mod accumulator;
pub mod builder;
pub mod closeable;
pub mod collector;
mod outcome;
pub mod ret;
pub mod ret_nullable;
pub mod ret_val;
pub mod ret_void;
pub mod warning_val;

pub use accumulator::ValueAccumulator;
pub use builder::ValueBuilder;
pub use closeable::{close_with, CloseError, CloseWith, Closeable, CloseableCollection};
pub use collector::ProblemCollector;
pub use outcome::Monitored;
pub use ret::{accumulate_values, build_value, collect_problems};
pub use ret_nullable::{NullableState, RetNullable};
pub use ret_val::RetVal;
pub use ret_void::RetVoid;
pub use warning_val::WarningVal;

pub use retval_monitor as monitor;
pub use retval_problems as problems;
pub use retval_problems::{
    FileProblem, IntoProblem, LocalizedProblem, Problem, ProblemContainer, ProblemRef,
    ProblemReport, Problems, SourcedProblem, UnhandledExceptionProblem, ValueRequiredProblem,
};
