use std::time::Duration;

use patchbay::policy::EngineConfig;
use patchbay::types::FileOperation;
use patchbay::{ApplyOptions, Engine};

use crate::common::{write, TestAudit, TestEmitter};

fn folders(base: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(base)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn engine_with(cfg: EngineConfig) -> (tempfile::TempDir, Engine<TestEmitter, TestAudit>, TestEmitter) {
    let td = tempfile::tempdir().unwrap();
    let events = TestEmitter::default();
    let api = Engine::new(td.path(), events.clone(), TestAudit::default())
        .unwrap()
        .with_config(cfg);
    (td, api, events)
}

fn run_batches(td: &tempfile::TempDir, api: &Engine<TestEmitter, TestAudit>, n: usize) {
    write(td.path(), "f.txt", "v0");
    for i in 1..=n {
        let op = FileOperation::update("f.txt", format!("v{i}"));
        api.apply_operations(&[op], &ApplyOptions::default()).unwrap();
        // folder names carry millisecond timestamps
        std::thread::sleep(Duration::from_millis(3));
    }
}

#[test]
fn count_limit_keeps_newest_folders() {
    let mut cfg = EngineConfig::volatile();
    cfg.retention_count_limit = Some(2);
    let (td, api, events) = engine_with(cfg);
    run_batches(&td, &api, 4);
    let before = folders(&api.backup_base());
    assert_eq!(before.len(), 4);

    let res = api.prune_backups().unwrap();
    assert_eq!((res.pruned_count, res.retained_count), (2, 2));
    assert_eq!(folders(&api.backup_base()), before[2..].to_vec());

    let ev = events.named("backups.prune");
    assert_eq!(ev[0]["pruned_count"], 2);
    assert_eq!(ev[0]["decision"], "success");
    assert_eq!(ev[0]["retention_count_limit"], 2);
}

#[test]
fn newest_folder_survives_zero_limits() {
    let mut cfg = EngineConfig::volatile();
    cfg.retention_count_limit = Some(0);
    cfg.retention_age_limit = Some(Duration::ZERO);
    let (td, api, _events) = engine_with(cfg);
    run_batches(&td, &api, 3);
    let newest = folders(&api.backup_base()).pop().unwrap();

    let res = api.prune_backups().unwrap();
    assert_eq!(res.retained_count, 1);
    assert_eq!(folders(&api.backup_base()), vec![newest]);
}

#[test]
fn no_limits_prune_nothing() {
    let (td, api, _events) = engine_with(EngineConfig::volatile());
    run_batches(&td, &api, 2);
    let res = api.prune_backups().unwrap();
    assert_eq!(res.pruned_count, 0);
    assert_eq!(res.retained_count, 2);
}

#[test]
fn pruning_before_any_backup_is_empty() {
    let (_td, api, events) = engine_with(EngineConfig::production_preset());
    let res = api.prune_backups().unwrap();
    assert_eq!(res, patchbay::types::PruneResult::default());
    assert_eq!(events.named("backups.prune").len(), 1);
}
