//! `ValueBuilder<T>`: assemble one aggregate from many fallible parts.

use crate::collector::ProblemCollector;
use crate::ret_nullable::RetNullable;
use crate::ret_val::RetVal;
use crate::ret_void::RetVoid;
use crate::warning_val::WarningVal;
use retval_problems::{ProblemContainer, ProblemRef, Problems};
use std::fmt;

/// Builds a caller-owned aggregate field by field.
///
/// Each contributed result either stores its value into the aggregate
/// through a setter or adds its problems to the collector. Every part is
/// applied; nothing short-circuits.
pub struct ValueBuilder<T> {
    value: T,
    collector: ProblemCollector,
}

impl<T> ValueBuilder<T> {
    #[must_use]
    pub fn from(value: T) -> Self {
        Self {
            value,
            collector: ProblemCollector::new(),
        }
    }

    /// Store the value of `arg` with `setter`, or collect its problems.
    #[must_use]
    pub fn with<V>(mut self, arg: RetVal<V>, setter: impl FnOnce(&mut T, V)) -> Self {
        match arg.into_result() {
            Ok(value) => setter(&mut self.value, value),
            Err(report) => self.collector.add_problems(report.problems()),
        }
        self
    }

    /// Like `with`; the setter also sees an absent value.
    #[must_use]
    pub fn with_nullable<V>(
        mut self,
        arg: RetNullable<V>,
        setter: impl FnOnce(&mut T, Option<V>),
    ) -> Self {
        match arg.into_result() {
            Ok(value) => setter(&mut self.value, value),
            Err(report) => self.collector.add_problems(report.problems()),
        }
        self
    }

    #[must_use]
    pub fn with_void(mut self, arg: RetVoid) -> Self {
        if let Err(report) = arg.into_result() {
            self.collector.add_problems(report.problems());
        }
        self
    }

    /// Modify the aggregate directly.
    #[must_use]
    pub fn with_value(mut self, f: impl FnOnce(&mut T)) -> Self {
        f(&mut self.value);
        self
    }

    /// The aggregate as built so far.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn collector(&self) -> &ProblemCollector {
        &self.collector
    }

    /// The aggregate, or every collected problem.
    #[track_caller]
    pub fn then(self) -> RetVal<T> {
        self.collector.complete(self.value)
    }

    pub fn as_warning(self) -> WarningVal<T> {
        self.collector.warn(self.value)
    }
}

impl<T> ProblemContainer for ValueBuilder<T> {
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

impl<T: fmt::Debug> fmt::Debug for ValueBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueBuilder")
            .field("value", &self.value)
            .field("collector", &self.collector)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retval_problems::LocalizedProblem;

    #[derive(Debug, Default, PartialEq)]
    struct Settings {
        name: String,
        port: u16,
        comment: Option<String>,
        touched: bool,
    }

    #[test]
    fn test_builds_aggregate() {
        let ret = ValueBuilder::from(Settings::default())
            .with(RetVal::ok("svc".to_string()), |s, v| s.name = v)
            .with(RetVal::ok(8080), |s, v| s.port = v)
            .with_nullable(RetNullable::<String>::ok(None), |s, v| s.comment = v)
            .with_void(RetVoid::ok())
            .with_value(|s| s.touched = true)
            .then();
        let settings = ret.into_result().expect("should build");
        assert_eq!(settings.name, "svc");
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.comment, None);
        assert!(settings.touched);
    }

    #[test]
    fn test_collects_every_problem() {
        let builder = ValueBuilder::from(Settings::default())
            .with(RetVal::<String>::from_problem(LocalizedProblem::from("no name")), |s, v| s.name = v)
            .with(RetVal::ok(1), |s, v| s.port = v)
            .with_void(RetVoid::from_problem(LocalizedProblem::from("bad dir")));
        assert_eq!(builder.value().port, 1);
        assert_eq!(builder.debug_problems(", "), "no name, bad dir");

        let warn = builder.as_warning();
        assert_eq!(warn.get_value().port, 1);
        assert_eq!(warn.any_problems().len(), 2);
    }

    #[test]
    fn test_then_fails_with_problems() {
        let ret = ValueBuilder::from(0)
            .with(RetVal::<i32>::from_problem(LocalizedProblem::from("x")), |t, v| *t = v)
            .then();
        assert_eq!(ret.valid_problems().messages(), vec!["x"]);
    }
}
