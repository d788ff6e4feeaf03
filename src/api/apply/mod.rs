//! Apply stage: runs a batch of file operations in order with backups and rollback.
//!
//! Side-effects:
//! - Emits a `file.operation` event per attempted operation, `file.rollback` per undo step and
//!   exactly one `file.operations.summary`.
//! - Takes the optional workspace lock for commit batches, bounded by `lock_timeout_ms`.
//! - On the first failure with `rollback_on_error`, undoes the applied stack in reverse and stops.

use std::time::Instant;

use log::Level;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::errors::{exit_code_for, id_str, ErrorId};
use crate::api::{ApiError, Engine};
use crate::fs::BackupFolder;
use crate::logging::{ts_for, AuditCtx, AuditMode, AuditSink, EventSink, StageLogger};
use crate::policy::ApplyOptions;
use crate::types::ids::{batch_id, op_id};
use crate::types::{ApplyReport, FileOperation, OperationResult, Status};

mod executors;
mod lock;
mod perf;
mod rollback;
mod summary;

use executors::{ExecCtx, Step};
use perf::elapsed_ms;
use rollback::AppliedEntry;

pub(crate) fn run<E: EventSink, A: AuditSink>(
    api: &Engine<E, A>,
    ops: &[FileOperation],
    opts: &ApplyOptions,
) -> Result<ApplyReport, ApiError> {
    let t0 = Instant::now();
    let dry = opts.dry_run;
    let bid = batch_id(ops);
    let tctx = AuditCtx::new(
        &api.events,
        &api.audit,
        bid.to_string(),
        ts_for(dry),
        AuditMode {
            dry_run: dry,
            redact: dry,
            publish: opts.publish_events,
        },
    );
    let slog = StageLogger::new(&tctx);
    slog.audit(
        Level::Info,
        &format!(
            "apply: starting batch {bid} ({} operations, dry_run={dry})",
            ops.len()
        ),
    );

    let _guard = match lock::acquire(api, dry, &slog) {
        Ok(g) => g,
        Err(e) => {
            let report = ApplyReport {
                batch_id: bid,
                duration_ms: elapsed_ms(t0),
                ..ApplyReport::default()
            };
            summary::ApplySummary::new(&report)
                .error(e.error_id())
                .message(&e.to_string())
                .emit(&slog);
            return Err(e);
        }
    };

    let mut folder = (opts.backup && !dry).then(|| BackupFolder::allocate(&api.backup_base()));
    let reserved = api.config.reserved_rel(&api.root);
    let mut ctx = ExecCtx::new(dry, api.config.durable, folder.as_mut());
    let mut results: Vec<OperationResult> = Vec::with_capacity(ops.len());
    let mut stack: Vec<AppliedEntry> = Vec::new();
    let mut rolled_back = false;
    let mut rollback_errors: Vec<String> = Vec::new();

    for (idx, op) in ops.iter().enumerate() {
        let outcome = executors::prepare(&api.root, reserved.as_deref(), op).and_then(|prep| {
            let step = executors::dispatch(&prep, &mut ctx)?;
            Ok((prep.target, step))
        });
        let (result, step) = match outcome {
            Ok((target, step)) => {
                if let Some(change) = step.change {
                    stack.push(AppliedEntry {
                        index: idx,
                        path: op.path.clone(),
                        target,
                        change,
                        backup_path: step.backup_path.clone(),
                    });
                }
                let result = OperationResult {
                    path: op.path.clone(),
                    action: op.action.clone(),
                    status: step.status,
                    message: Some(step.message.clone()),
                    backup_path: step.backup_path.clone(),
                    error_id: None,
                };
                (result, Some(step))
            }
            Err(e) => {
                let id = ErrorId::for_kind(e.kind);
                slog.audit(
                    Level::Warn,
                    &format!("apply: {} {} failed: {}", op.action, op.path, e.msg),
                );
                let result = OperationResult {
                    path: op.path.clone(),
                    action: op.action.clone(),
                    status: Status::Failed,
                    message: Some(e.msg),
                    backup_path: None,
                    error_id: Some(id),
                };
                (result, None)
            }
        };
        emit_operation(&slog, op_id(&bid, op, idx), idx, op, &result, step.as_ref());
        let failed = result.is_failed();
        results.push(result);

        if failed && opts.rollback_on_error {
            rolled_back = true;
            rollback::roll_back(
                &stack,
                dry,
                api.config.durable,
                &slog,
                &mut rollback_errors,
            );
            break;
        }
    }
    let perf_total = ctx.perf;

    let report = ApplyReport {
        batch_id: bid,
        results,
        backup_folder: folder
            .as_ref()
            .filter(|f| f.is_materialized())
            .map(|f| f.path().to_path_buf()),
        rolled_back,
        rollback_errors,
        duration_ms: elapsed_ms(t0),
    };
    summary::ApplySummary::new(&report)
        .perf(perf_total)
        .emit(&slog);
    let c = report.counts();
    slog.audit(
        Level::Info,
        &format!(
            "apply: finished batch {bid}: {} applied, {} skipped, {} failed{}",
            c.applied,
            c.skipped,
            c.failed,
            if report.rolled_back { ", rolled back" } else { "" }
        ),
    );
    Ok(report)
}

fn emit_operation(
    slog: &StageLogger<'_>,
    oid: Uuid,
    idx: usize,
    op: &FileOperation,
    result: &OperationResult,
    step: Option<&Step>,
) {
    let mut event = slog.file_operation().merge(json!({
        "op_id": oid.to_string(),
        "index": idx,
        "path": result.path,
        "action": result.action.as_str(),
        "status": result.status.as_str(),
        "message": result.message,
        "backup_path": result.backup_path.as_ref().map(|p| p.display().to_string()),
        "error_id": result.error_id.map(id_str),
        "exit_code": result.error_id.map(exit_code_for),
    }));
    if result.status == Status::Applied && op.action.needs_content() {
        event = event
            .maybe("content", op.content.clone().map(Value::String))
            .field("encoding", json!(op.encoding()));
    }
    if let Some(step) = step {
        event = event
            .maybe("before_hash", step.before_hash.clone().map(Value::String))
            .maybe("after_hash", step.after_hash.clone().map(Value::String));
    }
    event.emit();
}
