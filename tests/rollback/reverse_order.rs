use patchbay::types::{FileOperation, Status};
use patchbay::{ApplyOptions, ErrorId};

use crate::common::{engine, read, snapshot, write};

#[test]
fn failure_undoes_applied_operations() {
    let (td, api, events) = engine();
    let root = td.path();
    write(root, "b.txt", "original b");
    std::fs::create_dir(root.join("c")).unwrap();
    let before = snapshot(root);

    let ops = [
        FileOperation::create("a.txt", "new a"),
        FileOperation::update("b.txt", "changed b"),
        FileOperation::delete("c"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();

    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[2].status, Status::Failed);
    assert_eq!(report.results[2].error_id, Some(ErrorId::E_NAME_CONFLICT));
    assert!(report.rolled_back);
    assert!(report.rollback_errors.is_empty());
    assert!(!root.join("a.txt").exists());
    assert_eq!(read(root, "b.txt"), "original b");
    assert!(root.join("c").is_dir());

    // the backup folder outlives the rollback
    let folder = report.backup_folder.clone().unwrap();
    assert!(folder.is_dir());
    let mut after = snapshot(root);
    after.retain(|p, _| !p.starts_with(".patchbay"));
    assert_eq!(after, before);

    let undo: Vec<(String, String)> = events
        .named("file.rollback")
        .iter()
        .map(|v| {
            (
                v["path"].as_str().unwrap().to_string(),
                v["undo"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(
        undo,
        vec![
            ("b.txt".to_string(), "restore".to_string()),
            ("a.txt".to_string(), "remove".to_string()),
        ]
    );
    let names = events.names();
    assert_eq!(names.last().map(String::as_str), Some("file.operations.summary"));
}

#[test]
fn restored_delete_comes_back_with_content() {
    let (td, api, _events) = engine();
    write(td.path(), "notes/todo.md", "- ship it");
    let ops = [
        FileOperation::delete("notes/todo.md"),
        FileOperation::create("../../escape", "x"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert!(report.rolled_back);
    assert_eq!(read(td.path(), "notes/todo.md"), "- ship it");
}

#[test]
fn same_path_touched_twice_unwinds_to_first_state() {
    let (td, api, _events) = engine();
    write(td.path(), "f.txt", "v0");
    let ops = [
        FileOperation::update("f.txt", "v1"),
        FileOperation::update("f.txt", "v2"),
        FileOperation::delete("f.txt"),
        FileOperation::create("", "boom"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert!(report.rolled_back);
    assert!(report.rollback_errors.is_empty(), "{:?}", report.rollback_errors);
    assert_eq!(read(td.path(), "f.txt"), "v0");
}

#[test]
fn dry_run_rollback_only_reports() {
    let (td, api, events) = engine();
    write(td.path(), "b.txt", "b");
    let ops = [
        FileOperation::update("b.txt", "bb"),
        FileOperation::create("../x", "x"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::preview()).unwrap();
    assert!(report.rolled_back);
    assert_eq!(read(td.path(), "b.txt"), "b");
    let rb = events.named("file.rollback");
    assert_eq!(rb.len(), 1);
    assert_eq!(rb[0]["message"], "dry run: no change");
    assert_eq!(rb[0]["decision"], "success");
}
