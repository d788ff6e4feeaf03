use patchbay::types::{FileOperation, Status};
use patchbay::ApplyOptions;

use crate::common::{engine, read};

#[test]
fn without_rollback_the_batch_continues_past_failures() {
    let (td, api, events) = engine();
    let ops = [
        FileOperation::create("a.txt", "A"),
        FileOperation::create("../outside.txt", "nope"),
        FileOperation::create("c.txt", "C"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::best_effort()).unwrap();

    let statuses: Vec<Status> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::Applied, Status::Failed, Status::Applied]);
    assert!(!report.rolled_back);
    assert_eq!(read(td.path(), "a.txt"), "A");
    assert_eq!(read(td.path(), "c.txt"), "C");
    assert_eq!(events.named("file.operation").len(), 3);
    assert!(events.named("file.rollback").is_empty());
}

#[test]
fn with_rollback_the_batch_stops_at_first_failure() {
    let (td, api, _events) = engine();
    let ops = [
        FileOperation::create("a.txt", "A"),
        FileOperation::create("../outside.txt", "nope"),
        FileOperation::create("c.txt", "C"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert_eq!(report.results.len(), 2);
    assert!(report.stopped_early(ops.len()));
    assert!(report.rolled_back);
    assert!(!td.path().join("a.txt").exists());
    assert!(!td.path().join("c.txt").exists());
}
