use patchbay::types::{FileOperation, Status};
use patchbay::ApplyOptions;

use crate::common::{engine, read, write};

#[test]
fn update_twice_writes_once() {
    let (td, api, _events) = engine();
    write(td.path(), "config.json", "{}");
    let ops = [FileOperation::update("config.json", "{\"debug\":true}")];

    let first = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert_eq!(first.results[0].status, Status::Applied);

    let second = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert_eq!(second.results[0].status, Status::Skipped);
    assert_eq!(second.results[0].message.as_deref(), Some("content identical"));
    assert!(second.results[0].backup_path.is_none());
    assert_eq!(read(td.path(), "config.json"), "{\"debug\":true}");
}

#[test]
fn replaying_a_whole_batch_is_a_no_op() {
    let (td, api, _events) = engine();
    write(td.path(), "stale.txt", "bye");
    let ops = [
        FileOperation::create("a.txt", "A"),
        FileOperation::update("b.txt", "B"),
        FileOperation::delete("stale.txt"),
    ];
    let first = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    assert_eq!(first.counts().applied, 3);

    let again = api.apply_operations(&ops, &ApplyOptions::default()).unwrap();
    let c = again.counts();
    assert_eq!((c.applied, c.skipped, c.failed), (0, 3, 0));
    assert!(again.backup_folder.is_none());
    assert_eq!(first.batch_id, again.batch_id, "same batch, same id");
}
