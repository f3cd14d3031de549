//! `CloseableCollection`: release a bundle of resources together.

use crate::ret_void::RetVoid;
use retval_monitor::{register_closeable_instance, CloseHandle, InstanceId};
use retval_problems::{ProblemRef, ProblemReport, UnhandledExceptionProblem};
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Failure to release a resource.
#[derive(Debug, Error)]
pub enum CloseError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The release reported domain problems. They are added to the
    /// collection's result as they are, without wrapping.
    #[error(transparent)]
    Problems(#[from] ProblemReport),

    #[error("release panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Other(Box<dyn Error + Send + Sync + 'static>),
}

impl CloseError {
    pub fn other(error: impl Into<Box<dyn Error + Send + Sync + 'static>>) -> Self {
        CloseError::Other(error.into())
    }
}

/// A resource that must be released explicitly.
pub trait Closeable: Send {
    /// # Errors
    ///
    /// Returns a `CloseError` when the resource could not be released.
    fn close(&mut self) -> Result<(), CloseError>;
}

impl<C: Closeable + ?Sized> Closeable for Box<C> {
    fn close(&mut self) -> Result<(), CloseError> {
        (**self).close()
    }
}

/// A `Closeable` that runs a closure once.
pub struct CloseWith<F> {
    release: Option<F>,
}

/// Adapt a release closure into a `Closeable`. Closing again is a no-op.
pub fn close_with<F>(release: F) -> CloseWith<F>
where
    F: FnOnce() -> Result<(), CloseError> + Send,
{
    CloseWith {
        release: Some(release),
    }
}

impl<F> Closeable for CloseWith<F>
where
    F: FnOnce() -> Result<(), CloseError> + Send,
{
    fn close(&mut self) -> Result<(), CloseError> {
        match self.release.take() {
            Some(release) => release(),
            None => Ok(()),
        }
    }
}

impl<F> fmt::Debug for CloseWith<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseWith")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

// ============================================================================
// CloseableCollection
// ============================================================================

/// Owns an ordered bundle of resources and releases all of them in one
/// `close()`.
///
/// Joining consumes the collection and returns a new one holding the old
/// resources followed by the new ones. The consumed collection counts as
/// closed for the check monitor; the obligation moves to the new one.
#[must_use = "a CloseableCollection must be closed"]
pub struct CloseableCollection {
    resources: Vec<Box<dyn Closeable>>,
    closed: bool,
    handle: CloseHandle,
}

impl CloseableCollection {
    #[track_caller]
    fn register(resources: Vec<Box<dyn Closeable>>) -> Self {
        Self {
            resources,
            closed: false,
            handle: register_closeable_instance("CloseableCollection"),
        }
    }

    #[track_caller]
    pub fn new() -> Self {
        Self::register(Vec::new())
    }

    #[track_caller]
    pub fn from(resources: impl IntoIterator<Item = Box<dyn Closeable>>) -> Self {
        Self::register(resources.into_iter().collect())
    }

    #[track_caller]
    fn enforce_open(&self) {
        if self.closed {
            panic!("collection already closed");
        }
    }

    /// Hand the resources to their next owner.
    fn release(self) -> Vec<Box<dyn Closeable>> {
        let CloseableCollection {
            resources,
            closed: _,
            handle,
        } = self;
        handle.on_closed();
        resources
    }

    /// # Panics
    ///
    /// Panics when this collection is already closed.
    #[track_caller]
    pub fn join_with(self, resource: impl Closeable + 'static) -> Self {
        self.join_all([Box::new(resource) as Box<dyn Closeable>])
    }

    /// # Panics
    ///
    /// Panics when this collection is already closed.
    #[track_caller]
    pub fn join_all(self, resources: impl IntoIterator<Item = Box<dyn Closeable>>) -> Self {
        self.enforce_open();
        let mut joined = self.release();
        joined.extend(resources);
        Self::register(joined)
    }

    /// Flatten `other` into this collection. Both count as closed.
    ///
    /// # Panics
    ///
    /// Panics when either collection is already closed.
    #[track_caller]
    pub fn join_collection(self, other: CloseableCollection) -> Self {
        self.enforce_open();
        other.enforce_open();
        let theirs = other.release();
        self.join_all(theirs)
    }

    /// Resources still waiting to be released.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[must_use]
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.handle.id()
    }

    /// Release every resource in insertion order.
    ///
    /// A release that fails or panics becomes a problem and the remaining
    /// resources are still released. Closing a closed collection is ok.
    #[track_caller]
    pub fn close(&mut self) -> RetVoid {
        if self.closed {
            return RetVoid::ok();
        }
        self.closed = true;
        self.handle.on_closed();

        let mut problems: Vec<ProblemRef> = Vec::new();
        for mut resource in std::mem::take(&mut self.resources) {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| resource.close()));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(payload) => CloseError::Panicked(panic_message(payload.as_ref())),
            };
            match error {
                CloseError::Problems(report) => problems.extend(report.into_problems().iter().cloned()),
                error => problems.push(Arc::new(UnhandledExceptionProblem::wrap(error))),
            }
        }
        RetVoid::from_problem_refs(problems)
    }
}

impl Default for CloseableCollection {
    #[track_caller]
    fn default() -> Self {
        Self::new()
    }
}

impl Closeable for CloseableCollection {
    fn close(&mut self) -> Result<(), CloseError> {
        CloseableCollection::close(self).into_result()?;
        Ok(())
    }
}

impl fmt::Debug for CloseableCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseableCollection")
            .field("resources", &self.resources.len())
            .field("closed", &self.closed)
            .field("handle", &self.handle)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retval_problems::{LocalizedProblem, ProblemContainer, Problems};
    use std::sync::Mutex;

    fn logging(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Box<dyn Closeable> {
        let log = Arc::clone(log);
        Box::new(close_with(move || {
            log.lock().expect("log lock").push(name);
            Ok(())
        }))
    }

    #[test]
    fn test_closes_in_insertion_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut collection = CloseableCollection::new()
            .join_all([logging(&log, "a"), logging(&log, "b")])
            .join_with(close_with(|| Ok(())));
        assert_eq!(collection.len(), 3);
        assert!(collection.close().is_ok());
        assert!(collection.is_closed());
        assert_eq!(*log.lock().expect("log lock"), vec!["a", "b"]);
    }

    #[test]
    fn test_failure_does_not_stop_release() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut collection = CloseableCollection::from([
            logging(&log, "first"),
            Box::new(close_with(|| Err(std::io::Error::other("disk gone").into()))) as Box<dyn Closeable>,
            logging(&log, "third"),
        ]);
        let ret = collection.close();
        assert_eq!(ret.valid_problems().messages(), vec!["disk gone"]);
        assert_eq!(*log.lock().expect("log lock"), vec!["first", "third"]);
    }

    #[test]
    fn test_panic_becomes_problem() {
        let mut collection =
            CloseableCollection::new().join_with(close_with(|| -> Result<(), CloseError> { panic!("boom") }));
        let problems = collection.close().valid_problems();
        assert_eq!(problems.len(), 1);
        let problem = problems
            .iter()
            .next()
            .and_then(|p| p.downcast_ref::<UnhandledExceptionProblem>())
            .expect("wrapped problem");
        assert!(matches!(
            problem.downcast_source::<CloseError>(),
            Some(CloseError::Panicked(message)) if message == "boom"
        ));
    }

    #[test]
    fn test_problem_report_is_unwrapped() {
        let mut collection = CloseableCollection::new().join_with(close_with(|| {
            Err(ProblemReport::new(Problems::single(LocalizedProblem::from("flush failed"))).into())
        }));
        let problems = collection.close().valid_problems();
        assert!(problems.iter().all(|p| p.is::<LocalizedProblem>()));
        assert_eq!(problems.messages(), vec!["flush failed"]);
    }

    #[test]
    fn test_second_close_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut collection = CloseableCollection::from([logging(&log, "once")]);
        assert!(collection.close().is_ok());
        assert!(collection.close().is_ok());
        assert_eq!(log.lock().expect("log lock").len(), 1);
    }

    #[test]
    fn test_join_collection_flattens() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner = CloseableCollection::from([logging(&log, "inner")]);
        let mut outer = CloseableCollection::from([logging(&log, "outer")]).join_collection(inner);
        assert_eq!(outer.len(), 2);
        assert!(outer.close().is_ok());
        assert_eq!(*log.lock().expect("log lock"), vec!["outer", "inner"]);
    }

    fn closed_collection() -> CloseableCollection {
        let mut collection = CloseableCollection::new().join_with(close_with(|| Ok(())));
        assert!(collection.close().is_ok());
        collection
    }

    #[test]
    #[should_panic(expected = "collection already closed")]
    fn test_join_with_after_close_panics() {
        let _ = closed_collection().join_with(close_with(|| Ok(())));
    }

    #[test]
    #[should_panic(expected = "collection already closed")]
    fn test_join_all_after_close_panics() {
        let _ = closed_collection().join_all(Vec::new());
    }

    #[test]
    #[should_panic(expected = "collection already closed")]
    fn test_join_collection_into_closed_panics() {
        let _ = closed_collection().join_collection(CloseableCollection::new());
    }

    #[test]
    #[should_panic(expected = "collection already closed")]
    fn test_join_closed_collection_panics() {
        let _ = CloseableCollection::new().join_collection(closed_collection());
    }

    #[test]
    fn test_nested_collection_as_closeable() {
        let inner = CloseableCollection::new()
            .join_with(close_with(|| Err(CloseError::other("inner failed"))));
        let mut outer = CloseableCollection::new().join_with(inner);
        assert_eq!(outer.close().valid_problems().messages(), vec!["inner failed"]);
    }
}
