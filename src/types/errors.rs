//! Error types used across patchbay.
use thiserror::Error;

/// High-level error categories for per-operation failures.
///
/// Every variant ends up as a `Failed` operation result; none of them escape the batch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("invalid path")]
    InvalidPath,
    #[error("path escapes root")]
    PathEscapesRoot,
    #[error("reserved path")]
    Reserved,
    #[error("name conflict")]
    NameConflict,
    #[error("invalid operation")]
    InvalidOperation,
    #[error("decode error")]
    Decode,
    #[error("backup failed")]
    Backup,
    #[error("io error")]
    Io,
    #[error("locking")]
    Locking,
}

/// Structured error with a kind and human message.
#[derive(Debug, Error)]
#[error("{msg}")]
pub struct Error {
    pub kind: ErrorKind,
    pub msg: String,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

/// Convenient alias for results returning a `types::Error`.
pub type Result<T> = std::result::Result<T, Error>;
