//! The process-wide monitor.
//!
//! The first use installs the monitor selected by `MonitorConfig::from_env()`.
//! Loads are lock-free, so registering a container never contends with other
//! threads on the global itself.

use crate::config::MonitorConfig;
use crate::handle::{CheckHandle, CloseHandle, InstanceInfo};
use crate::monitor::CheckMonitor;
use arc_swap::ArcSwap;
use std::cell::Cell;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

static INSTANCE: OnceLock<ArcSwap<Arc<dyn CheckMonitor>>> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static HOLDS_INSTALL: Cell<bool> = const { Cell::new(false) };
}

fn cell() -> &'static ArcSwap<Arc<dyn CheckMonitor>> {
    INSTANCE.get_or_init(|| ArcSwap::from_pointee(MonitorConfig::from_env().build()))
}

/// The active monitor.
#[must_use]
pub fn instance() -> Arc<dyn CheckMonitor> {
    let guard = cell().load();
    let current: &Arc<dyn CheckMonitor> = &guard;
    Arc::clone(current)
}

/// Replace the active monitor, returning the previous one.
pub fn set_instance(monitor: Arc<dyn CheckMonitor>) -> Arc<dyn CheckMonitor> {
    let name = monitor.name();
    let previous = cell().swap(Arc::new(monitor));
    tracing::debug!(
        target: "retval::monitor",
        from = previous.name(),
        to = name,
        "check monitor replaced"
    );
    Arc::clone(&*previous)
}

/// Register a result container with the active monitor.
#[must_use]
#[track_caller]
pub fn register_error_instance(type_name: &'static str, problem_count: usize) -> CheckHandle {
    let info = InstanceInfo::new(type_name, problem_count);
    cell().load().register_error_instance(info)
}

/// Register a resource bundle with the active monitor.
#[must_use]
#[track_caller]
pub fn register_closeable_instance(type_name: &'static str) -> CloseHandle {
    let info = InstanceInfo::new(type_name, 0);
    cell().load().register_closeable_instance(info)
}

/// Installs a monitor for a scope and restores the previous one on drop.
///
/// Scopes are serialized process-wide: a second thread installing a monitor
/// waits until the first scope ends. Installing twice on the same thread
/// panics instead of deadlocking.
pub struct ScopedMonitor {
    previous: Option<Arc<dyn CheckMonitor>>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedMonitor {
    /// # Panics
    ///
    /// Panics if this thread already holds a scoped monitor.
    #[must_use]
    #[track_caller]
    pub fn install(monitor: Arc<dyn CheckMonitor>) -> Self {
        if Self::is_held_by_current_thread() {
            panic!("a scoped check monitor is already installed on this thread");
        }
        let lock = INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        HOLDS_INSTALL.with(|held| held.set(true));
        let previous = set_instance(monitor);
        Self {
            previous: Some(previous),
            _lock: lock,
        }
    }

    /// The monitor that comes back when this scope ends.
    #[must_use]
    pub fn previous(&self) -> Option<&Arc<dyn CheckMonitor>> {
        self.previous.as_ref()
    }

    #[must_use]
    pub fn is_held_by_current_thread() -> bool {
        HOLDS_INSTALL.with(Cell::get)
    }
}

impl Drop for ScopedMonitor {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_instance(previous);
        }
        HOLDS_INSTALL.with(|held| held.set(false));
    }
}

impl std::fmt::Debug for ScopedMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedMonitor")
            .field("previous", &self.previous)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugCheckMonitor;

    #[test]
    fn test_scoped_install_restores_previous() {
        let ours: Arc<dyn CheckMonitor> = Arc::new(DebugCheckMonitor::default());
        {
            let _scope = ScopedMonitor::install(Arc::clone(&ours));
            assert!(Arc::ptr_eq(&instance(), &ours));
            assert!(ScopedMonitor::is_held_by_current_thread());
            let handle = register_error_instance("RetVoid", 0);
            assert!(handle.id().is_some());
            handle.on_checked();
        }
        assert!(!Arc::ptr_eq(&instance(), &ours));
        assert!(!ScopedMonitor::is_held_by_current_thread());
    }

    #[test]
    #[should_panic(expected = "already installed on this thread")]
    fn test_nested_scope_panics() {
        let _outer = ScopedMonitor::install(Arc::new(DebugCheckMonitor::default()));
        let _inner = ScopedMonitor::install(Arc::new(DebugCheckMonitor::default()));
    }
}
