//! The shared core of every monitored result container.

use retval_monitor::{register_error_instance, CheckHandle, InstanceId};
use retval_problems::{enforce_has_problems, Problems};

/// Either a value or a non-empty problem list.
pub(crate) enum Outcome<T> {
    Value(T),
    Problems(Problems),
}

impl<T> Outcome<T> {
    /// A failed outcome.
    ///
    /// # Panics
    ///
    /// Panics when `problems` is empty.
    #[track_caller]
    pub(crate) fn failed(problems: Problems) -> Self {
        enforce_has_problems(&problems);
        Outcome::Problems(problems)
    }

    pub(crate) fn is_problems(&self) -> bool {
        matches!(self, Outcome::Problems(_))
    }

    pub(crate) fn problems(&self) -> Problems {
        match self {
            Outcome::Value(_) => Problems::NONE,
            Outcome::Problems(problems) => problems.clone(),
        }
    }

    pub(crate) fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Problems(_) => None,
        }
    }
}

/// An outcome plus the monitor handle that audits whether anyone looked
/// at it.
pub(crate) struct Tracked<T> {
    outcome: Outcome<T>,
    handle: CheckHandle,
}

impl<T> Tracked<T> {
    #[track_caller]
    pub(crate) fn register(outcome: Outcome<T>, type_name: &'static str) -> Self {
        let problem_count = match &outcome {
            Outcome::Value(_) => 0,
            Outcome::Problems(problems) => problems.len(),
        };
        let handle = register_error_instance(type_name, problem_count);
        Self { outcome, handle }
    }

    /// Inspect the outcome, counting as a check.
    pub(crate) fn checked(&self) -> &Outcome<T> {
        self.handle.on_checked();
        &self.outcome
    }

    /// Inspect the outcome without counting as a check.
    pub(crate) fn peek(&self) -> &Outcome<T> {
        &self.outcome
    }

    /// Hand the outcome to its next owner. The obligation to check moves
    /// with it.
    pub(crate) fn release(self) -> Outcome<T> {
        let Tracked { outcome, handle } = self;
        handle.on_checked();
        outcome
    }

    /// Take the outcome without counting as a check.
    pub(crate) fn into_unchecked(self) -> Outcome<T> {
        self.outcome
    }

    pub(crate) fn id(&self) -> Option<InstanceId> {
        self.handle.id()
    }
}

/// Access to the id a container was registered under.
pub trait Monitored {
    /// `None` when the active monitor does not assign ids.
    fn instance_id(&self) -> Option<InstanceId>;
}
