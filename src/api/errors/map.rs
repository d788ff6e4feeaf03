use std::io::ErrorKind;

use super::ErrorId;

/// Map restore error kinds to stable `ErrorId` for telemetry. A vanished backup is a backup
/// problem, anything else a failed restore.
#[must_use]
pub fn map_restore_error_kind(kind: ErrorKind) -> ErrorId {
    match kind {
        ErrorKind::NotFound => ErrorId::E_BACKUP,
        _ => ErrorId::E_RESTORE_FAILED,
    }
}
