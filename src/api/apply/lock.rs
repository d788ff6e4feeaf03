use std::time::Instant;

use log::Level;

use crate::adapters::LockGuard;
use crate::api::{ApiError, Engine};
use crate::logging::{AuditSink, EventSink, StageLogger};
use crate::policy::LockingPolicy;

use super::perf::elapsed_ms;

/// Take the workspace lock for a commit batch. Dry-run never locks.
pub(crate) fn acquire<E: EventSink, A: AuditSink>(
    api: &Engine<E, A>,
    dry: bool,
    slog: &StageLogger<'_>,
) -> Result<Option<Box<dyn LockGuard>>, ApiError> {
    if dry {
        return Ok(None);
    }
    let Some(mgr) = &api.lock else {
        if api.config.locking == LockingPolicy::Required {
            slog.audit(Level::Error, "apply: lock manager required but none configured (E_LOCKING)");
            return Err(ApiError::LockingRequired(
                "no lock manager configured".to_string(),
            ));
        }
        slog.audit(Level::Debug, "apply: no lock manager; batch runs unserialized");
        return Ok(None);
    };
    let t0 = Instant::now();
    match mgr.acquire_process_lock(api.config.lock_timeout_ms) {
        Ok(guard) => {
            slog.audit(
                Level::Debug,
                &format!("apply: lock acquired after {}ms", elapsed_ms(t0)),
            );
            Ok(Some(guard))
        }
        Err(e) => {
            slog.audit(Level::Error, "apply: lock acquisition failed (E_LOCKING)");
            Err(ApiError::LockingTimeout(e.msg))
        }
    }
}
