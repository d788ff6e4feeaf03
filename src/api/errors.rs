use serde::Serialize;
use thiserror::Error;

use crate::types::errors::ErrorKind;

mod map;
pub use map::map_restore_error_kind;

/// Errors that abort a whole call. Per-operation problems never use this type; they become
/// `Failed` entries in the report.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid workspace root: {0}")]
    InvalidRoot(String),
    #[error("locking timeout: {0}")]
    LockingTimeout(String),
    #[error("lock manager required: {0}")]
    LockingRequired(String),
    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl ApiError {
    #[must_use]
    pub const fn error_id(&self) -> ErrorId {
        match self {
            ApiError::InvalidRoot(_) => ErrorId::E_SANDBOX,
            ApiError::LockingTimeout(_) | ApiError::LockingRequired(_) => ErrorId::E_LOCKING,
            ApiError::Filesystem(_) => ErrorId::E_IO,
        }
    }
}

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        match e.kind {
            ErrorKind::Locking => ApiError::LockingTimeout(e.msg),
            ErrorKind::InvalidPath | ErrorKind::PathEscapesRoot | ErrorKind::Reserved => {
                ApiError::InvalidRoot(e.msg)
            }
            _ => ApiError::Filesystem(e.msg),
        }
    }
}

// Stable identifiers carried by failed results and events.
// SCREAMING_SNAKE_CASE matches the emitted strings.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorId {
    E_SANDBOX,
    E_NAME_CONFLICT,
    E_INVALID_OP,
    E_DECODE,
    E_IO,
    E_BACKUP,
    E_RESTORE_FAILED,
    E_LOCKING,
    E_GENERIC,
}

impl ErrorId {
    /// Classification of a per-operation error.
    #[must_use]
    pub const fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidPath | ErrorKind::PathEscapesRoot | ErrorKind::Reserved => {
                ErrorId::E_SANDBOX
            }
            ErrorKind::NameConflict => ErrorId::E_NAME_CONFLICT,
            ErrorKind::InvalidOperation => ErrorId::E_INVALID_OP,
            ErrorKind::Decode => ErrorId::E_DECODE,
            ErrorKind::Backup => ErrorId::E_BACKUP,
            ErrorKind::Io => ErrorId::E_IO,
            ErrorKind::Locking => ErrorId::E_LOCKING,
        }
    }
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_SANDBOX => "E_SANDBOX",
        ErrorId::E_NAME_CONFLICT => "E_NAME_CONFLICT",
        ErrorId::E_INVALID_OP => "E_INVALID_OP",
        ErrorId::E_DECODE => "E_DECODE",
        ErrorId::E_IO => "E_IO",
        ErrorId::E_BACKUP => "E_BACKUP",
        ErrorId::E_RESTORE_FAILED => "E_RESTORE_FAILED",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_SANDBOX => 10,
        ErrorId::E_NAME_CONFLICT => 20,
        ErrorId::E_INVALID_OP => 30,
        ErrorId::E_DECODE => 40,
        ErrorId::E_IO => 50,
        ErrorId::E_BACKUP => 60,
        ErrorId::E_RESTORE_FAILED => 70,
        ErrorId::E_LOCKING => 80,
        ErrorId::E_GENERIC => 1,
    }
}

#[must_use]
pub fn exit_code_for_id_str(s: &str) -> Option<i32> {
    [
        ErrorId::E_SANDBOX,
        ErrorId::E_NAME_CONFLICT,
        ErrorId::E_INVALID_OP,
        ErrorId::E_DECODE,
        ErrorId::E_IO,
        ErrorId::E_BACKUP,
        ErrorId::E_RESTORE_FAILED,
        ErrorId::E_LOCKING,
        ErrorId::E_GENERIC,
    ]
    .into_iter()
    .find(|id| id_str(*id) == s)
    .map(exit_code_for)
}
