// Event emission for a batch.
//
// Every event carries the envelope `schema_version`, `ts`, `batch_id`, `dry_run`. In dry-run the
// payload is redacted (zero timestamp, no volatile fields) so two previews of the same batch
// produce identical streams. Sink errors and panics are reported to the audit log and dropped.
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::Level;
use serde_json::{json, Value};

use crate::constants::{
    EVENT_FILE_OPERATION, EVENT_PRUNE, EVENT_ROLLBACK, EVENT_SUMMARY, SCHEMA_VERSION,
};
use crate::logging::{redact_event, AuditSink, EventSink};

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct AuditMode {
    pub dry_run: bool,
    pub redact: bool,
    pub publish: bool,
}

pub(crate) struct AuditCtx<'a> {
    pub sink: &'a dyn EventSink,
    pub audit: &'a dyn AuditSink,
    pub batch_id: String,
    pub ts: String,
    pub mode: AuditMode,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        sink: &'a dyn EventSink,
        audit: &'a dyn AuditSink,
        batch_id: String,
        ts: String,
        mode: AuditMode,
    ) -> Self {
        Self {
            sink,
            audit,
            batch_id,
            ts,
            mode,
        }
    }
}

/// Event kinds published by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    FileOperation,
    Rollback,
    Summary,
    Prune,
}

impl Stage {
    #[must_use]
    pub const fn as_event(self) -> &'static str {
        match self {
            Stage::FileOperation => EVENT_FILE_OPERATION,
            Stage::Rollback => EVENT_ROLLBACK,
            Stage::Summary => EVENT_SUMMARY,
            Stage::Prune => EVENT_PRUNE,
        }
    }
}

/// Outcome tag carried by rollback events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
}

impl Decision {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
        }
    }
}

/// Builder facade over event emission with centralized envelope and redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn file_operation(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::FileOperation)
    }

    pub fn rollback(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Rollback)
    }

    pub fn summary(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Summary)
    }

    pub fn prune(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Prune)
    }

    /// Write a line to the audit log regardless of `publish_events`.
    pub fn audit(&self, level: Level, msg: &str) {
        self.ctx.audit.log(level, msg);
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        Self {
            ctx,
            stage,
            fields: serde_json::Map::new(),
        }
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set `key` only when `value` is present.
    #[must_use]
    pub fn maybe(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    #[must_use]
    pub fn merge(mut self, extra: Value) -> Self {
        if let Value::Object(obj) = extra {
            self.fields.extend(obj);
        }
        self
    }

    pub fn emit(self) {
        redact_and_emit(self.ctx, self.stage.as_event(), Value::Object(self.fields));
    }

    pub fn emit_decision(mut self, decision: Decision) {
        self.fields
            .entry("decision")
            .or_insert(json!(decision.as_str()));
        self.emit();
    }
}

fn redact_and_emit(ctx: &AuditCtx, event: &str, mut fields: Value) {
    if !ctx.mode.publish {
        return;
    }
    if let Some(obj) = fields.as_object_mut() {
        obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        obj.entry("ts").or_insert(json!(ctx.ts));
        obj.entry("batch_id").or_insert(json!(ctx.batch_id));
        obj.entry("dry_run").or_insert(json!(ctx.mode.dry_run));
    }
    let out = if ctx.mode.redact {
        redact_event(fields)
    } else {
        fields
    };
    match catch_unwind(AssertUnwindSafe(|| ctx.sink.emit(event, out))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => ctx
            .audit
            .log(Level::Warn, &format!("event sink failed for {event}: {e}")),
        Err(_) => ctx
            .audit
            .log(Level::Warn, &format!("event sink panicked for {event}")),
    }
}
