use serde_json::{json, Value};

use crate::api::errors::{exit_code_for, id_str, ErrorId};
use crate::logging::{Decision, StageLogger};
use crate::types::{ApplyReport, OperationResult};

use super::perf::PerfAgg;

// Event payloads are snake_case throughout, unlike the camelCase report handed to callers.
fn result_fields(r: &OperationResult) -> Value {
    json!({
        "path": r.path,
        "action": r.action.as_str(),
        "status": r.status.as_str(),
        "message": r.message,
        "backup_path": r.backup_path.as_ref().map(|p| p.display().to_string()),
        "error_id": r.error_id.map(id_str),
    })
}

/// Fields of the terminal `file.operations.summary` event.
pub(crate) struct ApplySummary {
    fields: Value,
    failed: bool,
}

impl ApplySummary {
    pub(crate) fn new(report: &ApplyReport) -> Self {
        let counts = report.counts();
        let fields = json!({
            "results": report.results.iter().map(result_fields).collect::<Vec<_>>(),
            "backup_folder": report.backup_folder.as_ref().map(|p| p.display().to_string()),
            "counts": counts,
            "rolled_back": report.rolled_back,
            "rollback_errors": report.rollback_errors,
            "duration_ms": report.duration_ms,
        });
        let mut s = Self {
            fields,
            failed: !report.is_success(),
        };
        // The first failure classifies the batch
        if let Some(id) = report.failures().find_map(|r| r.error_id) {
            s = s.error(id);
        }
        s
    }

    pub(crate) fn perf(mut self, total: PerfAgg) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert("perf".to_string(), json!(total));
        }
        self
    }

    pub(crate) fn error(mut self, id: ErrorId) -> Self {
        self.failed = true;
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert("error_id".to_string(), json!(id_str(id)));
            obj.insert("exit_code".to_string(), json!(exit_code_for(id)));
        }
        self
    }

    pub(crate) fn message(mut self, msg: &str) -> Self {
        if let Some(obj) = self.fields.as_object_mut() {
            obj.insert("message".to_string(), json!(msg));
        }
        self
    }

    pub(crate) fn emit(self, slog: &StageLogger<'_>) {
        let decision = if self.failed {
            Decision::Failure
        } else {
            Decision::Success
        };
        slog.summary().merge(self.fields).emit_decision(decision);
    }
}
