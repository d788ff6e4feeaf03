use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use patchbay::logging::{EventSink, SinkError};
use patchbay::policy::EngineConfig;
use patchbay::types::{FileOperation, Status};
use patchbay::{ApplyOptions, Engine};

use crate::common::{read, TestAudit};

#[derive(Default)]
struct Panicking {
    calls: AtomicUsize,
}

impl EventSink for Panicking {
    fn emit(&self, _event: &str, _payload: Value) -> Result<(), SinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("downstream collector crashed");
    }
}

struct Offline;

impl EventSink for Offline {
    fn emit(&self, _event: &str, _payload: Value) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("collector offline".into()))
    }
}

#[test]
fn panicking_sink_does_not_fail_the_batch() {
    let td = tempfile::tempdir().unwrap();
    let sink = Arc::new(Panicking::default());
    let audit = TestAudit::default();
    let api = Engine::new(td.path(), sink.clone(), audit.clone())
        .unwrap()
        .with_config(EngineConfig::volatile());
    let report = api
        .apply_operations(
            &[
                FileOperation::create("a.txt", "a"),
                FileOperation::create("b.txt", "b"),
            ],
            &ApplyOptions::default(),
        )
        .unwrap();
    assert!(report.results.iter().all(|r| r.status == Status::Applied));
    assert_eq!(read(td.path(), "b.txt"), "b");
    // two operations and the summary
    assert_eq!(sink.calls.load(Ordering::SeqCst), 3);
    assert!(audit.contains("event sink panicked for file.operation"));
    assert!(audit.contains("event sink panicked for file.operations.summary"));
}

#[test]
fn failing_sink_is_logged_and_ignored() {
    let td = tempfile::tempdir().unwrap();
    let audit = TestAudit::default();
    let api = Engine::new(td.path(), Offline, audit.clone())
        .unwrap()
        .with_config(EngineConfig::volatile());
    let report = api
        .apply_operations(&[FileOperation::create("a.txt", "a")], &ApplyOptions::default())
        .unwrap();
    assert!(report.is_success());
    assert!(audit.contains("collector offline"));
}

#[test]
fn unpublished_batch_is_silent_but_audited() {
    let (td, api, events) = crate::common::engine();
    let report = api
        .apply_operations(
            &[FileOperation::create("a.txt", "a")],
            &ApplyOptions::default().with_publish_events(false),
        )
        .unwrap();
    assert!(report.is_success());
    assert!(td.path().join("a.txt").exists());
    assert!(events.all().is_empty());
}
