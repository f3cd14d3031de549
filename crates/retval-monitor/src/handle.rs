//! Instance identity and the handles tracked instances own.

use std::fmt;
use std::panic::Location;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique identity of a registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    /// Allocate the next id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a monitor learns about an instance when it is registered.
#[derive(Debug, Clone, Copy)]
pub struct InstanceInfo {
    pub type_name: &'static str,
    pub problem_count: usize,
    pub location: &'static Location<'static>,
}

impl InstanceInfo {
    /// Describe an instance created at the caller's location.
    #[must_use]
    #[track_caller]
    pub fn new(type_name: &'static str, problem_count: usize) -> Self {
        Self {
            type_name,
            problem_count,
            location: Location::caller(),
        }
    }
}

impl fmt::Display for InstanceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} problems) created at {}",
            self.type_name, self.problem_count, self.location
        )
    }
}

/// Notified each time a result container is inspected. Must tolerate
/// redundant calls.
pub trait CheckableListener: Send + Sync {
    fn on_checked(&self);
}

/// Notified each time a resource bundle is closed. Must tolerate redundant
/// calls.
pub trait CloseableListener: Send + Sync {
    fn on_closed(&self);
}

// ============================================================================
// Handles
// ============================================================================

/// Owned by a result container for its whole life.
#[derive(Default)]
pub struct CheckHandle {
    id: Option<InstanceId>,
    listener: Option<Arc<dyn CheckableListener>>,
}

impl CheckHandle {
    /// A handle nobody listens to.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            id: None,
            listener: None,
        }
    }

    #[must_use]
    pub fn new(id: InstanceId, listener: Arc<dyn CheckableListener>) -> Self {
        Self {
            id: Some(id),
            listener: Some(listener),
        }
    }

    /// The id assigned by the monitor, if it assigned one.
    #[must_use]
    pub fn id(&self) -> Option<InstanceId> {
        self.id
    }

    pub fn on_checked(&self) {
        if let Some(listener) = &self.listener {
            listener.on_checked();
        }
    }
}

impl fmt::Debug for CheckHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckHandle").field("id", &self.id).finish()
    }
}

/// Owned by a resource bundle for its whole life.
#[derive(Default)]
pub struct CloseHandle {
    id: Option<InstanceId>,
    listener: Option<Arc<dyn CloseableListener>>,
}

impl CloseHandle {
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            id: None,
            listener: None,
        }
    }

    #[must_use]
    pub fn new(id: InstanceId, listener: Arc<dyn CloseableListener>) -> Self {
        Self {
            id: Some(id),
            listener: Some(listener),
        }
    }

    #[must_use]
    pub fn id(&self) -> Option<InstanceId> {
        self.id
    }

    pub fn on_closed(&self) {
        if let Some(listener) = &self.listener {
            listener.on_closed();
        }
    }
}

impl fmt::Debug for CloseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct Counter(AtomicUsize);

    impl CheckableListener for Counter {
        fn on_checked(&self) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert!(b > a);
    }

    #[test]
    fn test_info_captures_caller() {
        let info = InstanceInfo::new("RetVal<i32>", 0);
        assert_eq!(info.location.file(), file!());
        assert!(info.to_string().starts_with("RetVal<i32> (0 problems) created at "));
    }

    #[test]
    fn test_detached_handle_is_silent() {
        let handle = CheckHandle::detached();
        assert_eq!(handle.id(), None);
        handle.on_checked();
    }

    #[test]
    fn test_handle_forwards_to_listener() {
        let counter = Arc::new(Counter(AtomicUsize::new(0)));
        let id = InstanceId::next();
        let handle = CheckHandle::new(id, counter.clone());
        handle.on_checked();
        handle.on_checked();
        assert_eq!(handle.id(), Some(id));
        assert_eq!(counter.0.load(Ordering::Relaxed), 2);
    }
}
