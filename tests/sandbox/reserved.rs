use patchbay::types::{FileOperation, Status};
use patchbay::{ApplyOptions, ErrorId};

use crate::common::{engine, write};

#[test]
fn state_directory_cannot_be_targeted() {
    let (td, api, _events) = engine();
    write(td.path(), "seed.txt", "v1");
    // materialize a backup folder first
    api.apply_operations(&[FileOperation::update("seed.txt", "v2")], &ApplyOptions::default())
        .unwrap();
    let lock = td.path().join(".patchbay/lock");
    let ops = [
        FileOperation::create(".patchbay/lock", "mine"),
        FileOperation::delete(".patchbay/backups"),
        FileOperation::update("./.patchbay", "x"),
        FileOperation::create("x/../.patchbay/evil", "x"),
    ];
    let report = api.apply_operations(&ops, &ApplyOptions::best_effort()).unwrap();
    for r in &report.results {
        assert_eq!(r.status, Status::Failed, "{}", r.path);
        assert_eq!(r.error_id, Some(ErrorId::E_SANDBOX));
        assert!(r.message.as_deref().unwrap().contains("reserved"));
    }
    assert!(!lock.exists());
    assert!(td.path().join(".patchbay/backups").is_dir());
}

#[test]
fn similar_names_are_not_reserved() {
    let (td, api, _events) = engine();
    let report = api
        .apply_operations(
            &[
                FileOperation::create(".patchbayrc", "x"),
                FileOperation::create("docs/.patchbay/notes.md", "x"),
            ],
            &ApplyOptions::default(),
        )
        .unwrap();
    assert!(report.is_success());
    assert!(td.path().join(".patchbayrc").is_file());
}
