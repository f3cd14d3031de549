//! Shared fixtures for the retval test suites.
//!
//! - Problem fixtures and proptest strategies
//! - Closeable resources that record, fail or panic when released
//! - Assertions against the mock check monitor
//! - Test logging setup

use proptest::prelude::*;
use retval::monitor::MockCheckMonitor;
use retval::{
    CloseError, Closeable, LocalizedProblem, Monitored, ProblemRef, Problems,
};
use std::sync::{Arc, Mutex, Once};

// ============================================================================
// Problems
// ============================================================================

#[must_use]
pub fn problem(message: &str) -> ProblemRef {
    Arc::new(LocalizedProblem::from(message))
}

#[must_use]
pub fn problems(messages: &[&str]) -> Problems {
    messages.iter().map(|message| problem(message)).collect()
}

/// A short lowercase problem message.
pub fn arb_message() -> impl Strategy<Value = String> {
    "[a-z]{1,12}"
}

/// Zero or more problems.
pub fn arb_problems() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_message(), 0..6)
}

/// At least one problem.
pub fn arb_nonempty_problems() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_message(), 1..6)
}

/// Build a problem list from generated messages.
#[must_use]
pub fn to_problems(messages: &[String]) -> Problems {
    messages.iter().map(|message| problem(message)).collect()
}

// ============================================================================
// Closeables
// ============================================================================

/// The shared release log written by the recording resources.
#[derive(Debug, Clone, Default)]
pub struct ReleaseLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ReleaseLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, name: &str) {
        self.entries
            .lock()
            .expect("release log poisoned")
            .push(name.to_string());
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().expect("release log poisoned").clone()
    }

    /// A resource that logs its name and succeeds.
    #[must_use]
    pub fn recording(&self, name: &str) -> Box<dyn Closeable> {
        Box::new(RecordingCloseable {
            name: name.to_string(),
            log: self.clone(),
            behavior: Behavior::Succeed,
        })
    }

    /// A resource that logs its name and fails with an I/O error.
    #[must_use]
    pub fn failing(&self, name: &str, message: &str) -> Box<dyn Closeable> {
        Box::new(RecordingCloseable {
            name: name.to_string(),
            log: self.clone(),
            behavior: Behavior::Fail(message.to_string()),
        })
    }

    /// A resource that logs its name and panics.
    #[must_use]
    pub fn panicking(&self, name: &str, message: &str) -> Box<dyn Closeable> {
        Box::new(RecordingCloseable {
            name: name.to_string(),
            log: self.clone(),
            behavior: Behavior::Panic(message.to_string()),
        })
    }
}

#[derive(Debug)]
enum Behavior {
    Succeed,
    Fail(String),
    Panic(String),
}

#[derive(Debug)]
struct RecordingCloseable {
    name: String,
    log: ReleaseLog,
    behavior: Behavior,
}

impl Closeable for RecordingCloseable {
    fn close(&mut self) -> Result<(), CloseError> {
        self.log.push(&self.name);
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(message) => Err(std::io::Error::other(message.clone()).into()),
            Behavior::Panic(message) => panic!("{message}"),
        }
    }
}

// ============================================================================
// Monitor assertions
// ============================================================================

/// Assert the mock saw `container` and that it was inspected.
///
/// # Panics
///
/// Panics when the container was not registered or never checked.
#[track_caller]
pub fn assert_checked(mock: &MockCheckMonitor, container: &impl Monitored) {
    let id = container.instance_id().expect("container has no instance id");
    let record = mock.find_checkable(id).expect("container was not registered");
    assert!(record.was_checked(), "{} was never checked", record.info());
}

/// Assert the mock saw `container` and that nothing inspected it.
///
/// # Panics
///
/// Panics when the container was not registered or was checked.
#[track_caller]
pub fn assert_not_checked(mock: &MockCheckMonitor, container: &impl Monitored) {
    let id = container.instance_id().expect("container has no instance id");
    assert!(
        mock.never_checked().iter().any(|record| record.id() == id),
        "{id} was checked"
    );
}

// ============================================================================
// Logging
// ============================================================================

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}
