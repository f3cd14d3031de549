//! Reporting of instances that were abandoned without being checked or closed.

use crate::handle::{InstanceId, InstanceInfo};
use std::fmt;

/// What a tracked instance owed its monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Obligation {
    /// A result container must be inspected.
    Check,
    /// A resource bundle must be closed.
    Close,
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Obligation::Check => f.write_str("checked"),
            Obligation::Close => f.write_str("closed"),
        }
    }
}

/// An instance that was never checked or never closed.
#[derive(Debug, Clone)]
pub struct NotCompletedReport {
    pub id: InstanceId,
    pub obligation: Obligation,
    pub info: InstanceInfo,
    /// Rendered backtrace of the registration, when trace mode was on.
    pub backtrace: Option<String>,
}

impl fmt::Display for NotCompletedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} was never {}", self.info, self.id, self.obligation)?;
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{backtrace}")?;
        }
        Ok(())
    }
}

/// Receives reports from the debug monitor.
pub trait NotCompletedListener: Send + Sync {
    fn not_completed(&self, report: &NotCompletedReport);
}

impl<F> NotCompletedListener for F
where
    F: Fn(&NotCompletedReport) + Send + Sync,
{
    fn not_completed(&self, report: &NotCompletedReport) {
        self(report)
    }
}

/// Emits every report as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotCompletedListener;

impl NotCompletedListener for LoggingNotCompletedListener {
    fn not_completed(&self, report: &NotCompletedReport) {
        match &report.backtrace {
            Some(backtrace) => tracing::warn!(
                target: "retval::monitor",
                id = report.id.get(),
                type_name = report.info.type_name,
                problems = report.info.problem_count,
                location = %report.info.location,
                "{} never {}\n{}",
                report.info.type_name,
                report.obligation,
                backtrace
            ),
            None => tracing::warn!(
                target: "retval::monitor",
                id = report.id.get(),
                type_name = report.info.type_name,
                problems = report.info.problem_count,
                location = %report.info.location,
                "{} never {}",
                report.info.type_name,
                report.obligation
            ),
        }
    }
}
