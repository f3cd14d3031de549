//! Environment-driven monitor selection.

use crate::debug::DebugCheckMonitor;
use crate::monitor::CheckMonitor;
use crate::noop::NoOpCheckMonitor;
use std::sync::Arc;

/// Installs the debug monitor instead of the no-op one.
pub const DEBUG_ENV: &str = "RETVAL_MONITOR_DEBUG";
/// Makes the debug monitor capture a backtrace at every registration.
pub const TRACE_ENV: &str = "RETVAL_MONITOR_TRACE";

/// Which monitor the process starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    pub debug: bool,
    pub trace: bool,
}

impl MonitorConfig {
    /// Read `RETVAL_MONITOR_DEBUG` and `RETVAL_MONITOR_TRACE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the flags through an arbitrary lookup. Only "true" (in any case)
    /// turns a flag on.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| {
            lookup(key)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false)
        };
        Self {
            debug: flag(DEBUG_ENV),
            trace: flag(TRACE_ENV),
        }
    }

    /// Build the monitor this configuration selects.
    #[must_use]
    pub fn build(&self) -> Arc<dyn CheckMonitor> {
        if self.debug {
            Arc::new(DebugCheckMonitor::new(self.trace))
        } else {
            Arc::new(NoOpCheckMonitor)
        }
    }
}
