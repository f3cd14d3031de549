//! Check monitors for the retval result containers.
//!
//! Every result container registers with the active monitor when it is
//! created and notifies it when calling code inspects it. Every resource
//! bundle does the same when it is closed. The monitor decides what to do
//! with that information:
//!
//! - `NoOpCheckMonitor` ignores it (the default)
//! - `DebugCheckMonitor` reports instances dropped without being inspected
//!   or closed
//! - `MockCheckMonitor` records everything for test assertions
//!
//! Rust has no finalizers, so a tracked instance's "about to be collected"
//! hook is the drop of the handle it owns. Monitors only ever hold
//! bookkeeping records, never the tracked instance.

pub mod config;
pub mod debug;
pub mod global;
pub mod handle;
pub mod listener;
pub mod mock;
pub mod monitor;
pub mod noop;

pub use config::MonitorConfig;
pub use debug::DebugCheckMonitor;
pub use global::{
    instance, register_closeable_instance, register_error_instance, set_instance, ScopedMonitor,
};
pub use handle::{
    CheckHandle, CheckableListener, CloseHandle, CloseableListener, InstanceId, InstanceInfo,
};
pub use listener::{LoggingNotCompletedListener, NotCompletedListener, NotCompletedReport, Obligation};
pub use mock::{MockCheckMonitor, MockGuard, RegisteredCheckable, RegisteredCloseable};
pub use monitor::CheckMonitor;
pub use noop::NoOpCheckMonitor;
