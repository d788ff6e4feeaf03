use patchbay::logging::TS_ZERO;
use patchbay::types::{FileOperation, Status};
use patchbay::{ApplyOptions, Engine};
use tempfile::TempDir;

use crate::common::{engine, entries, snapshot, write, TestAudit, TestEmitter};

fn workspace() -> (TempDir, Engine<TestEmitter, TestAudit>, TestEmitter) {
    let (td, api, events) = engine();
    write(td.path(), "src/main.rs", "fn main() {}");
    write(td.path(), "old.txt", "old");
    (td, api, events)
}

fn batch() -> Vec<FileOperation> {
    vec![
        FileOperation::create("src/lib.rs", "pub fn x() {}"),
        FileOperation::update("src/main.rs", "fn main() { println!(); }"),
        FileOperation::delete("old.txt"),
        FileOperation::create("src/main.rs", "dup"),
    ]
}

#[test]
fn dry_run_leaves_workspace_byte_identical() {
    let (td, api, _events) = workspace();
    let before = snapshot(td.path());
    let listing = entries(td.path());

    let report = api.apply_operations(&batch(), &ApplyOptions::preview()).unwrap();

    assert_eq!(snapshot(td.path()), before);
    assert_eq!(entries(td.path()), listing, "no temp files, no backup folders");
    let statuses: Vec<Status> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Applied, Status::Applied, Status::Applied, Status::Skipped]
    );
    for r in &report.results[..3] {
        assert_eq!(r.message.as_deref(), Some("dry run: no write"));
        assert!(r.backup_path.is_none());
    }
    assert!(report.backup_folder.is_none());
}

#[test]
fn dry_run_matches_commit_results() {
    let (_td_a, api_a, _) = workspace();
    let (_td_b, api_b, _) = workspace();
    let preview = api_a.apply_operations(&batch(), &ApplyOptions::preview()).unwrap();
    let commit = api_b.apply_operations(&batch(), &ApplyOptions::default()).unwrap();
    let p: Vec<_> = preview.results.iter().map(|r| (r.path.clone(), r.status)).collect();
    let c: Vec<_> = commit.results.iter().map(|r| (r.path.clone(), r.status)).collect();
    assert_eq!(p, c);
}

#[test]
fn dry_run_events_are_deterministic() {
    let (_td1, api1, ev1) = workspace();
    let (_td2, api2, ev2) = workspace();
    api1.apply_operations(&batch(), &ApplyOptions::preview()).unwrap();
    api2.apply_operations(&batch(), &ApplyOptions::preview()).unwrap();
    let a = ev1.all();
    let b = ev2.all();
    assert!(!a.is_empty());
    assert_eq!(a, b);
    for (_, v) in &a {
        assert_eq!(v["ts"], TS_ZERO);
        assert_eq!(v["dry_run"], true);
        assert!(v.get("perf").is_none());
        assert!(v.get("after_hash").is_none());
    }
}

#[test]
fn preview_reports_identical_update_as_skipped() {
    let (td, api, _events) = workspace();
    let op = FileOperation::update("old.txt", "old");
    let preview = api.apply_operations(&[op.clone()], &ApplyOptions::preview()).unwrap();
    let commit = api.apply_operations(&[op], &ApplyOptions::default()).unwrap();
    assert_eq!(preview.results[0].status, Status::Skipped);
    assert_eq!(preview.results[0].status, commit.results[0].status);
    assert_eq!(preview.results[0].message, commit.results[0].message);
    assert!(commit.backup_folder.is_none());
    assert_eq!(std::fs::read_to_string(td.path().join("old.txt")).unwrap(), "old");
}
