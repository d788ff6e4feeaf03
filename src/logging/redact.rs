use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

#[must_use]
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

/// Timestamp for an event envelope: the zero timestamp in dry-run so previews are reproducible.
#[must_use]
pub fn ts_for(dry_run: bool) -> String {
    if dry_run {
        TS_ZERO.to_string()
    } else {
        now_iso()
    }
}

/// Zero the timestamp and drop fields that vary between otherwise identical runs.
#[must_use]
pub fn redact_event(mut v: Value) -> Value {
    if let Some(obj) = v.as_object_mut() {
        obj.insert("ts".into(), Value::String(TS_ZERO.to_string()));
        obj.remove("duration_ms");
        obj.remove("perf");
        // Hashes depend on live file contents
        obj.remove("before_hash");
        obj.remove("after_hash");
        // Backup folder names embed a clock reading and a random suffix
        obj.remove("backup_folder");
    }
    v
}
