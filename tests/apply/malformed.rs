use patchbay::extract::extract_operations;
use patchbay::types::Status;
use patchbay::{ApplyOptions, ErrorId};

use crate::common::{engine, read};

#[test]
fn one_bad_entry_fails_alone() {
    let (td, api, _events) = engine();
    let ops = extract_operations(
        r#"```json
[{"path":"a.txt","action":"create","content":"alpha"},
 {"path":"b.txt","content":"no action"},
 {"path":"c.txt","action":"create","content":"00ff","encoding":"hex"},
 {"path":"d.txt","action":"create","content":"delta"}]
```"#,
    )
    .unwrap();

    let report = api.apply_operations(&ops, &ApplyOptions::best_effort()).unwrap();
    let statuses: Vec<Status> = report.results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![Status::Applied, Status::Failed, Status::Failed, Status::Applied]
    );
    assert_eq!(report.results[1].error_id, Some(ErrorId::E_INVALID_OP));
    assert!(report.results[1].message.as_deref().unwrap().contains("action is required"));
    assert_eq!(report.results[2].error_id, Some(ErrorId::E_INVALID_OP));
    assert!(report.results[2].message.as_deref().unwrap().contains("hex"));

    assert_eq!(read(td.path(), "a.txt"), "alpha");
    assert_eq!(read(td.path(), "d.txt"), "delta");
    assert!(!td.path().join("b.txt").exists());
    assert!(!td.path().join("c.txt").exists());
}
