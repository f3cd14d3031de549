//! `ProblemReport`: a failed computation as a `std::error::Error`.
//!
//! This is the bridge out of railway style. A report keeps the original
//! `Problems` and renders each one as a related `miette` diagnostic.

use crate::problems::Problems;
use miette::Diagnostic;
use thiserror::Error;

/// One problem rendered as a diagnostic.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message}")]
pub struct ProblemDiagnostic {
    pub message: String,
    #[help]
    pub origin: Option<String>,
}

/// Error carrying the problems of a failed result.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{summary}")]
#[diagnostic(code(retval::problems))]
pub struct ProblemReport {
    summary: String,
    problems: Problems,
    #[related]
    related: Vec<ProblemDiagnostic>,
}

impl ProblemReport {
    /// Build a report for a non-empty problem list.
    #[must_use]
    pub fn new(problems: Problems) -> Self {
        let summary = match problems.len() {
            0 => "no problems".to_string(),
            1 => problems.to_string(),
            n => format!("{n} problems: {problems}"),
        };
        let related = problems
            .iter()
            .map(|p| ProblemDiagnostic {
                message: p.local_message().to_string(),
                origin: p.origin().map(|o| format!("from {o}")),
            })
            .collect();
        Self {
            summary,
            problems,
            related,
        }
    }

    #[must_use]
    pub fn problems(&self) -> &Problems {
        &self.problems
    }

    #[must_use]
    pub fn into_problems(self) -> Problems {
        self.problems
    }
}

impl From<Problems> for ProblemReport {
    fn from(problems: Problems) -> Self {
        Self::new(problems)
    }
}
