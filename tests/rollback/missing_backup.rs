use patchbay::types::FileOperation;
use patchbay::ApplyOptions;

use crate::common::{engine, read, write};

#[test]
fn rollback_without_backups_reports_what_it_could_not_undo() {
    let (td, api, events) = engine();
    write(td.path(), "keep.txt", "before");
    let opts = ApplyOptions {
        backup: false,
        ..ApplyOptions::default()
    };
    let ops = [
        FileOperation::create("new.txt", "n"),
        FileOperation::update("keep.txt", "after"),
        FileOperation::create("/../../etc/shadow", "x"),
    ];
    let report = api.apply_operations(&ops, &opts).unwrap();

    assert!(report.rolled_back);
    // created file is still removable without a backup
    assert!(!td.path().join("new.txt").exists());
    assert_eq!(read(td.path(), "keep.txt"), "after");
    assert_eq!(report.rollback_errors.len(), 1);
    assert!(report.rollback_errors[0].contains("keep.txt"));

    let failed: Vec<_> = events
        .named("file.rollback")
        .into_iter()
        .filter(|v| v["decision"] == "failure")
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["error_id"], "E_BACKUP");
    assert_eq!(failed[0]["exit_code"], 60);
}

#[test]
fn vanished_backup_file_leaves_target_alone() {
    let (td, api, _events) = engine();
    write(td.path(), "a.txt", "A0");
    let first = api
        .apply_operations(&[FileOperation::update("a.txt", "A1")], &ApplyOptions::default())
        .unwrap();
    let backup = first.results[0].backup_path.clone().unwrap();
    assert_eq!(std::fs::read_to_string(&backup).unwrap(), "A0");

    std::fs::remove_file(&backup).unwrap();
    let err = patchbay::fs::restore_from_backup(&td.path().join("a.txt"), &backup, false)
        .unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(err.to_string().contains("backup missing"));
    assert_eq!(read(td.path(), "a.txt"), "A1");
}
