//! The result containers under the mock and debug check monitors.
//!
//! Tests in this file run in parallel and every monitor is process-wide, so
//! assertions look up records by instance id rather than counting.

use rayon::prelude::*;
use retval::monitor::{
    DebugCheckMonitor, MockCheckMonitor, NotCompletedReport, Obligation, ScopedMonitor,
};
use retval::{
    CloseableCollection, Monitored, ProblemContainer, RetNullable, RetVal, RetVoid,
    ValueAccumulator,
};
use retval_test_utils::{assert_checked, assert_not_checked, init_test_logging, problem};
use std::sync::{Arc, Mutex};

#[test]
fn test_unchecked_result_is_reported_until_checked() {
    let mock = MockCheckMonitor::setup();
    let ret = RetVal::ok(1);
    let id = ret.instance_id().expect("mock assigns ids");

    assert_not_checked(&mock, &ret);
    assert!(ret.is_ok());
    assert_checked(&mock, &ret);
    assert!(mock.never_checked().iter().all(|record| record.id() != id));

    let record = mock.find_checkable(id).expect("registered");
    assert_eq!(record.call_count(), 1);
    assert!(record.info().type_name.contains("RetVal"));
    mock.tear_down();
}

#[test]
fn test_value_access_is_not_a_check() {
    let mock = MockCheckMonitor::setup();
    let ret = RetVal::ok("v");
    assert_eq!(ret.get_value(), &"v");
    assert_eq!(format!("{ret:?}"), "RetVal(value: \"v\")");
    assert_not_checked(&mock, &ret);
}

#[test]
fn test_chaining_moves_the_obligation() {
    let mock = MockCheckMonitor::setup();
    let first = RetVal::ok(2);
    let first_id = first.instance_id().expect("id");
    let second = first.map(|x| x * 3);
    let second_id = second.instance_id().expect("id");

    assert!(mock.find_checkable(first_id).expect("first").was_checked());
    assert!(!mock.find_checkable(second_id).expect("second").was_checked());
    assert!(second.is_ok());
    assert!(mock.find_checkable(second_id).expect("second").was_checked());
}

#[test]
fn test_accumulation_checks_inputs() {
    let mock = MockCheckMonitor::setup();
    let a = RetNullable::some(1);
    let b = RetVoid::from_problem(problem("b"));
    let ids = [a.instance_id(), b.instance_id()];

    let ret = ValueAccumulator::from_nullable(a).with_problem(&b).then();
    for id in ids.into_iter().flatten() {
        assert!(mock.find_checkable(id).expect("registered").was_checked());
    }
    assert!(ret.has_problems());
    assert_checked(&mock, &ret);
}

#[test]
fn test_unclosed_collection_is_reported() {
    let mock = MockCheckMonitor::setup();
    let collection = CloseableCollection::new();
    let id = collection.instance_id().expect("id");
    assert!(mock.never_closed().iter().any(|r| r.id() == id));

    let mut joined = collection.join_with(retval::close_with(|| Ok(())));
    let joined_id = joined.instance_id().expect("id");
    assert!(mock.find_closeable(id).expect("original").was_closed());
    assert!(!mock.find_closeable(joined_id).expect("joined").was_closed());

    assert!(joined.close().is_ok());
    assert!(mock.find_closeable(joined_id).expect("joined").was_closed());
}

#[test]
fn test_concurrent_registration() {
    let mock = MockCheckMonitor::setup();
    let ids: Vec<_> = (0..64)
        .into_par_iter()
        .map(|n| {
            let ret = RetVal::ok(n);
            let id = ret.instance_id().expect("id");
            assert!(ret.is_ok());
            id
        })
        .collect();
    for id in ids {
        assert!(mock.find_checkable(id).expect("registered").was_checked());
    }
}

#[test]
fn test_debug_monitor_reports_dropped_result() {
    init_test_logging();
    let reports: Arc<Mutex<Vec<NotCompletedReport>>> = Arc::default();
    let sink = Arc::clone(&reports);
    let monitor = Arc::new(DebugCheckMonitor::with_listener(
        false,
        Arc::new(move |report: &NotCompletedReport| {
            sink.lock().expect("reports").push(report.clone());
        }),
    ));
    let scope = ScopedMonitor::install(monitor);

    let dropped = RetVoid::from_problem(problem("ignored"));
    let dropped_id = dropped.instance_id().expect("id");
    drop(dropped);

    let checked = RetVoid::from_problem(problem("seen"));
    let checked_id = checked.instance_id().expect("id");
    assert!(checked.has_problems());
    drop(checked);
    drop(scope);

    let reports = reports.lock().expect("reports");
    let report = reports
        .iter()
        .find(|r| r.id == dropped_id)
        .expect("dropped result reported");
    assert_eq!(report.obligation, Obligation::Check);
    assert_eq!(report.info.problem_count, 1);
    assert!(report.to_string().contains("never checked"));
    assert!(reports.iter().all(|r| r.id != checked_id));
}
