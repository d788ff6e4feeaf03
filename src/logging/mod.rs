pub mod audit;
pub mod facts;
pub mod redact;

pub use audit::{Decision, EventBuilder, Stage, StageLogger};
pub(crate) use audit::{AuditCtx, AuditMode};
pub use facts::{AuditSink, EventSink, JsonlSink, LogAudit, MemorySink, NullSink, SinkError};
pub use redact::{now_iso, redact_event, ts_for, TS_ZERO};
