//! The `CheckMonitor` capability.

use crate::handle::{CheckHandle, CloseHandle, InstanceInfo};
use std::any::Any;
use std::fmt;

/// Tracks result containers and resource bundles.
///
/// Implementations must support concurrent registration from any thread.
pub trait CheckMonitor: Send + Sync + fmt::Debug + 'static {
    /// Register a newly created result container.
    fn register_error_instance(&self, info: InstanceInfo) -> CheckHandle;

    /// Register a newly created resource bundle.
    fn register_closeable_instance(&self, info: InstanceInfo) -> CloseHandle;

    /// Whether registrations capture a full backtrace.
    fn is_trace_enabled(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}
