//! A recording monitor for tests.
//!
//! ```ignore
//! let mock = MockCheckMonitor::setup();
//! let ret = RetVal::ok(5);
//! assert!(mock.never_checked().iter().any(|r| Some(r.id()) == ret.instance_id()));
//! mock.tear_down();
//! ```

use crate::global::ScopedMonitor;
use crate::handle::{
    CheckHandle, CheckableListener, CloseHandle, CloseableListener, InstanceId, InstanceInfo,
};
use crate::monitor::CheckMonitor;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A registered result container.
pub struct RegisteredCheckable {
    id: InstanceId,
    info: InstanceInfo,
    backtrace: Option<Backtrace>,
    call_count: AtomicUsize,
}

impl RegisteredCheckable {
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[must_use]
    pub fn info(&self) -> &InstanceInfo {
        &self.info
    }

    /// Registration backtrace, captured when trace mode was on.
    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    /// How many times the container was inspected.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn was_checked(&self) -> bool {
        self.call_count() > 0
    }
}

impl CheckableListener for RegisteredCheckable {
    fn on_checked(&self) {
        self.call_count.fetch_add(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for RegisteredCheckable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCheckable")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("call_count", &self.call_count())
            .finish()
    }
}

/// A registered resource bundle.
pub struct RegisteredCloseable {
    id: InstanceId,
    info: InstanceInfo,
    backtrace: Option<Backtrace>,
    call_count: AtomicUsize,
}

impl RegisteredCloseable {
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    #[must_use]
    pub fn info(&self) -> &InstanceInfo {
        &self.info
    }

    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_ref()
    }

    /// How many times the bundle was closed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn was_closed(&self) -> bool {
        self.call_count() > 0
    }
}

impl CloseableListener for RegisteredCloseable {
    fn on_closed(&self) {
        self.call_count.fetch_add(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for RegisteredCloseable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredCloseable")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("call_count", &self.call_count())
            .finish()
    }
}

// ============================================================================
// MockCheckMonitor
// ============================================================================

/// Records every registration so tests can assert that the code under test
/// inspected every result and closed every resource bundle it created.
///
/// Records outlive the tracked instances; they hold no reference to them.
#[derive(Default)]
pub struct MockCheckMonitor {
    trace: AtomicBool,
    checkables: Mutex<Vec<Arc<RegisteredCheckable>>>,
    closeables: Mutex<Vec<Arc<RegisteredCloseable>>>,
}

impl MockCheckMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh mock as the process-wide monitor.
    ///
    /// The previous monitor comes back when the guard is dropped or torn
    /// down. A mock set up on another thread makes this call wait.
    ///
    /// # Panics
    ///
    /// Panics if a mock is already set up.
    #[must_use]
    #[track_caller]
    pub fn setup() -> MockGuard {
        if ScopedMonitor::is_held_by_current_thread() {
            panic!("a MockCheckMonitor is already set up on this thread");
        }
        let mock = Arc::new(Self::new());
        let scope = ScopedMonitor::install(Arc::clone(&mock) as Arc<dyn CheckMonitor>);
        let guard = MockGuard { mock, scope };
        if guard.scope_previous_was_mock() {
            panic!("a MockCheckMonitor is already set up");
        }
        guard
    }

    pub fn set_trace_enabled(&self, enabled: bool) {
        self.trace.store(enabled, Ordering::Relaxed);
    }

    /// The record for a result container, by id.
    #[must_use]
    pub fn find_checkable(&self, id: InstanceId) -> Option<Arc<RegisteredCheckable>> {
        lock(&self.checkables).iter().find(|r| r.id == id).cloned()
    }

    /// The record for a resource bundle, by id.
    #[must_use]
    pub fn find_closeable(&self, id: InstanceId) -> Option<Arc<RegisteredCloseable>> {
        lock(&self.closeables).iter().find(|r| r.id == id).cloned()
    }

    /// Every result container never inspected, in registration order.
    #[must_use]
    pub fn never_checked(&self) -> Vec<Arc<RegisteredCheckable>> {
        lock(&self.checkables)
            .iter()
            .filter(|r| !r.was_checked())
            .cloned()
            .collect()
    }

    /// Every resource bundle never closed, in registration order.
    #[must_use]
    pub fn never_closed(&self) -> Vec<Arc<RegisteredCloseable>> {
        lock(&self.closeables)
            .iter()
            .filter(|r| !r.was_closed())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn checkables(&self) -> Vec<Arc<RegisteredCheckable>> {
        lock(&self.checkables).clone()
    }

    #[must_use]
    pub fn closeables(&self) -> Vec<Arc<RegisteredCloseable>> {
        lock(&self.closeables).clone()
    }

    fn capture(&self) -> Option<Backtrace> {
        self.is_trace_enabled().then(Backtrace::force_capture)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl fmt::Debug for MockCheckMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockCheckMonitor")
            .field("checkables", &lock(&self.checkables).len())
            .field("closeables", &lock(&self.closeables).len())
            .finish()
    }
}

impl CheckMonitor for MockCheckMonitor {
    fn register_error_instance(&self, info: InstanceInfo) -> CheckHandle {
        let record = Arc::new(RegisteredCheckable {
            id: InstanceId::next(),
            info,
            backtrace: self.capture(),
            call_count: AtomicUsize::new(0),
        });
        lock(&self.checkables).push(Arc::clone(&record));
        CheckHandle::new(record.id, record)
    }

    fn register_closeable_instance(&self, info: InstanceInfo) -> CloseHandle {
        let record = Arc::new(RegisteredCloseable {
            id: InstanceId::next(),
            info,
            backtrace: self.capture(),
            call_count: AtomicUsize::new(0),
        });
        lock(&self.closeables).push(Arc::clone(&record));
        CloseHandle::new(record.id, record)
    }

    fn is_trace_enabled(&self) -> bool {
        self.trace.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Keeps a mock installed. Dereferences to the mock.
pub struct MockGuard {
    mock: Arc<MockCheckMonitor>,
    scope: ScopedMonitor,
}

impl MockGuard {
    /// Restore the monitor that was active before `setup`.
    pub fn tear_down(self) {}

    #[must_use]
    pub fn monitor(&self) -> &Arc<MockCheckMonitor> {
        &self.mock
    }

    fn scope_previous_was_mock(&self) -> bool {
        self.scope.previous().is_some_and(|p| p.as_any().is::<MockCheckMonitor>())
    }
}

impl Deref for MockGuard {
    type Target = MockCheckMonitor;

    fn deref(&self) -> &MockCheckMonitor {
        &self.mock
    }
}

impl fmt::Debug for MockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockGuard").field("mock", &self.mock).finish()
    }
}
