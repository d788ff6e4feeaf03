use std::path::PathBuf;

use log::Level;
use serde_json::json;

use crate::api::errors::{exit_code_for, id_str, map_restore_error_kind, ErrorId};
use crate::fs::{remove_created, restore_from_backup};
use crate::logging::{Decision, StageLogger};
use crate::types::SafePath;

use super::executors::Change;

/// Something this batch changed (or, in dry-run, would have changed).
#[derive(Debug)]
pub(crate) struct AppliedEntry {
    pub index: usize,
    pub path: String,
    pub target: SafePath,
    pub change: Change,
    pub backup_path: Option<PathBuf>,
}

/// Undo `stack` in reverse order, best-effort. Failures are appended to `rollback_errors` and
/// never stop the walk. In dry-run nothing is touched; the events still describe each step.
pub(crate) fn roll_back(
    stack: &[AppliedEntry],
    dry: bool,
    durable: bool,
    slog: &StageLogger<'_>,
    rollback_errors: &mut Vec<String>,
) {
    slog.audit(
        Level::Info,
        &format!("rollback: undoing {} applied operation(s)", stack.len()),
    );
    for entry in stack.iter().rev() {
        let undo = match entry.change {
            Change::Created => "remove",
            Change::Updated | Change::Deleted => "restore",
        };
        let event = slog.rollback().path(entry.path.clone()).merge(json!({
            "index": entry.index,
            "undo": undo,
        }));
        if dry {
            event
                .field("message", json!("dry run: no change"))
                .emit_decision(Decision::Success);
            continue;
        }
        let outcome = match (entry.change, entry.backup_path.as_deref()) {
            (Change::Created, _) => remove_created(&entry.target.as_path(), durable)
                .map_err(|e| (format!("remove {} failed: {e}", entry.path), ErrorId::E_RESTORE_FAILED)),
            (_, Some(backup)) => restore_from_backup(&entry.target.as_path(), backup, durable)
                .map_err(|e| {
                    (
                        format!("restore {} failed: {e}", entry.path),
                        map_restore_error_kind(e.kind()),
                    )
                }),
            (_, None) => Err((
                format!("restore {} skipped: no backup was taken", entry.path),
                ErrorId::E_BACKUP,
            )),
        };
        match outcome {
            Ok(()) => event.emit_decision(Decision::Success),
            Err((msg, id)) => {
                slog.audit(Level::Warn, &format!("rollback: {msg}"));
                event
                    .merge(json!({
                        "message": msg,
                        "error_id": id_str(id),
                        "exit_code": exit_code_for(id),
                    }))
                    .emit_decision(Decision::Failure);
                rollback_errors.push(msg);
            }
        }
    }
}
