//! The debug monitor: reports instances dropped without being checked or
//! closed.
//!
//! The registration table only holds `Weak` references to per-instance
//! records. The strong reference lives in the handle owned by the tracked
//! instance, so when the instance is dropped its record is dropped with it,
//! and the record's destructor reports any unmet obligation.
//!
//! The table is a sharded `DashMap`, so concurrent registrations only
//! contend when they land on the same shard.

use crate::handle::{
    CheckHandle, CheckableListener, CloseHandle, CloseableListener, InstanceId, InstanceInfo,
};
use crate::listener::{LoggingNotCompletedListener, NotCompletedListener, NotCompletedReport, Obligation};
use crate::monitor::CheckMonitor;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::any::Any;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

const INITIAL_PRUNE_THRESHOLD: usize = 256;

struct DebugRecord {
    id: InstanceId,
    obligation: Obligation,
    info: InstanceInfo,
    backtrace: Option<Backtrace>,
    completed: AtomicBool,
    reported: AtomicBool,
    listener: Arc<dyn NotCompletedListener>,
}

impl DebugRecord {
    fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Report once, if the obligation is still open.
    fn report_if_outstanding(&self) -> Option<NotCompletedReport> {
        if self.is_completed() || self.reported.swap(true, Ordering::AcqRel) {
            return None;
        }
        let report = NotCompletedReport {
            id: self.id,
            obligation: self.obligation,
            info: self.info,
            backtrace: self.backtrace.as_ref().map(ToString::to_string),
        };
        self.listener.not_completed(&report);
        Some(report)
    }
}

impl CheckableListener for DebugRecord {
    fn on_checked(&self) {
        self.completed.store(true, Ordering::Release);
    }
}

impl CloseableListener for DebugRecord {
    fn on_closed(&self) {
        self.completed.store(true, Ordering::Release);
    }
}

impl Drop for DebugRecord {
    fn drop(&mut self) {
        let _ = self.report_if_outstanding();
    }
}

/// Tracks every registration weakly and reports the ones abandoned
/// unchecked or unclosed.
pub struct DebugCheckMonitor {
    trace: bool,
    listener: Arc<dyn NotCompletedListener>,
    table: DashMap<InstanceId, Weak<DebugRecord>, FxBuildHasher>,
    prune_threshold: AtomicUsize,
}

impl DebugCheckMonitor {
    /// A debug monitor that logs reports through `tracing`.
    #[must_use]
    pub fn new(trace: bool) -> Self {
        Self::with_listener(trace, Arc::new(LoggingNotCompletedListener))
    }

    #[must_use]
    pub fn with_listener(trace: bool, listener: Arc<dyn NotCompletedListener>) -> Self {
        Self {
            trace,
            listener,
            table: DashMap::with_hasher(FxBuildHasher),
            prune_threshold: AtomicUsize::new(INITIAL_PRUNE_THRESHOLD),
        }
    }

    /// Report every live instance whose obligation is still open.
    ///
    /// Each instance is reported at most once, whether here or when it is
    /// dropped.
    pub fn report_outstanding(&self) -> Vec<NotCompletedReport> {
        let live: Vec<Arc<DebugRecord>> = self
            .table
            .iter()
            .filter_map(|entry| entry.value().upgrade())
            .collect();
        let mut reports: Vec<NotCompletedReport> = live
            .iter()
            .filter_map(|record| record.report_if_outstanding())
            .collect();
        reports.sort_by_key(|r| r.id);
        reports
    }

    /// Number of registered instances still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.table
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    fn register(&self, obligation: Obligation, info: InstanceInfo) -> Arc<DebugRecord> {
        let id = InstanceId::next();
        let record = Arc::new(DebugRecord {
            id,
            obligation,
            info,
            backtrace: self.trace.then(Backtrace::force_capture),
            completed: AtomicBool::new(false),
            reported: AtomicBool::new(false),
            listener: Arc::clone(&self.listener),
        });

        self.table.insert(id, Arc::downgrade(&record));
        self.prune_if_needed();
        record
    }

    /// Drop dead entries once the table outgrows the threshold. Only the
    /// thread that wins the threshold swap prunes.
    fn prune_if_needed(&self) {
        let threshold = self.prune_threshold.load(Ordering::Relaxed);
        if self.table.len() < threshold {
            return;
        }
        if self
            .prune_threshold
            .compare_exchange(threshold, usize::MAX, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        self.table.retain(|_, weak| weak.strong_count() > 0);
        let next = (self.table.len() * 2).max(INITIAL_PRUNE_THRESHOLD);
        self.prune_threshold.store(next, Ordering::Release);
    }
}

impl Default for DebugCheckMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for DebugCheckMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugCheckMonitor")
            .field("trace", &self.trace)
            .field("live", &self.live_count())
            .finish()
    }
}

impl CheckMonitor for DebugCheckMonitor {
    fn register_error_instance(&self, info: InstanceInfo) -> CheckHandle {
        let record = self.register(Obligation::Check, info);
        CheckHandle::new(record.id, record)
    }

    fn register_closeable_instance(&self, info: InstanceInfo) -> CloseHandle {
        let record = self.register(Obligation::Close, info);
        CloseHandle::new(record.id, record)
    }

    fn is_trace_enabled(&self) -> bool {
        self.trace
    }

    fn name(&self) -> &'static str {
        "debug"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
