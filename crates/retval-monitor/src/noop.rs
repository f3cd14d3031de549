use crate::handle::{CheckHandle, CloseHandle, InstanceInfo};
use crate::monitor::CheckMonitor;
use std::any::Any;

/// Hands out detached handles. Nothing is allocated or recorded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCheckMonitor;

impl CheckMonitor for NoOpCheckMonitor {
    #[inline]
    fn register_error_instance(&self, _info: InstanceInfo) -> CheckHandle {
        CheckHandle::detached()
    }

    #[inline]
    fn register_closeable_instance(&self, _info: InstanceInfo) -> CloseHandle {
        CloseHandle::detached()
    }

    fn name(&self) -> &'static str {
        "no-op"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
