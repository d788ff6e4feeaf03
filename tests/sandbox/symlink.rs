use std::os::unix::fs::symlink;

use patchbay::types::{FileOperation, Status};
use patchbay::{ApplyOptions, ErrorId};

use crate::common::{engine, read, write};

#[test]
fn symlinked_directory_cannot_carry_writes_outside() {
    let outside = tempfile::tempdir().unwrap();
    let (td, api, _events) = engine();
    symlink(outside.path(), td.path().join("link")).unwrap();

    let report = api
        .apply_operations(
            &[FileOperation::create("link/pwned.txt", "x")],
            &ApplyOptions::default(),
        )
        .unwrap();
    let r = &report.results[0];
    assert_eq!(r.status, Status::Failed);
    assert_eq!(r.error_id, Some(ErrorId::E_SANDBOX));
    assert!(r.message.as_deref().unwrap().contains("symlink"));
    assert!(!outside.path().join("pwned.txt").exists());
}

#[test]
fn symlinked_file_pointing_outside_is_not_updated() {
    let outside = tempfile::tempdir().unwrap();
    write(outside.path(), "secret.txt", "secret");
    let (td, api, _events) = engine();
    symlink(outside.path().join("secret.txt"), td.path().join("s.txt")).unwrap();

    for op in [
        FileOperation::update("s.txt", "overwritten"),
        FileOperation::delete("s.txt"),
    ] {
        let report = api.apply_operations(&[op], &ApplyOptions::default()).unwrap();
        assert_eq!(report.results[0].error_id, Some(ErrorId::E_SANDBOX));
    }
    assert_eq!(read(outside.path(), "secret.txt"), "secret");
}

#[test]
fn dangling_link_out_of_root_is_rejected() {
    let (td, api, _events) = engine();
    symlink("../../nowhere", td.path().join("dangling")).unwrap();
    let report = api
        .apply_operations(
            &[FileOperation::create("dangling", "x")],
            &ApplyOptions::default(),
        )
        .unwrap();
    assert_eq!(report.results[0].error_id, Some(ErrorId::E_SANDBOX));
}

#[test]
fn symlinked_parent_is_never_written_through() {
    let (td, api, _events) = engine();
    std::fs::create_dir(td.path().join("real")).unwrap();
    symlink("real", td.path().join("alias")).unwrap();
    let report = api
        .apply_operations(
            &[FileOperation::create("alias/ok.txt", "fine")],
            &ApplyOptions::default(),
        )
        .unwrap();
    // the parent handle is opened with O_NOFOLLOW, even for links that stay inside the root
    assert_eq!(report.results[0].status, Status::Failed);
    assert_eq!(report.results[0].error_id, Some(ErrorId::E_IO));
    assert!(!td.path().join("real/ok.txt").exists());
}

#[test]
fn in_root_file_link_is_left_intact() {
    let (td, api, _events) = engine();
    write(td.path(), "real.txt", "old");
    symlink("real.txt", td.path().join("link.txt")).unwrap();

    for op in [
        FileOperation::update("link.txt", "new"),
        FileOperation::delete("link.txt"),
        FileOperation::create("link.txt", "new"),
    ] {
        let report = api.apply_operations(&[op], &ApplyOptions::default()).unwrap();
        let r = &report.results[0];
        assert_eq!(r.status, Status::Failed);
        assert_eq!(r.error_id, Some(ErrorId::E_NAME_CONFLICT));
        assert!(r.backup_path.is_none());
    }
    let meta = std::fs::symlink_metadata(td.path().join("link.txt")).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(read(td.path(), "real.txt"), "old");
}

#[test]
fn rollback_leaves_link_untouched() {
    let (td, api, _events) = engine();
    write(td.path(), "real.txt", "old");
    symlink("real.txt", td.path().join("link.txt")).unwrap();

    let report = api
        .apply_operations(
            &[
                FileOperation::create("fresh.txt", "x"),
                FileOperation::delete("link.txt"),
            ],
            &ApplyOptions::default(),
        )
        .unwrap();
    assert!(report.rolled_back);
    assert!(!td.path().join("fresh.txt").exists());
    let meta = std::fs::symlink_metadata(td.path().join("link.txt")).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(read(td.path(), "real.txt"), "old");
}
