pub mod file;
use crate::types::errors::Result;

/// Held for the duration of a batch; releasing happens on drop.
pub trait LockGuard: Send {}

/// Serializes batches that target the same workspace.
pub trait LockManager: Send + Sync {
    /// Acquire the workspace lock, waiting at most `timeout_ms`.
    ///
    /// # Errors
    ///
    /// `ErrorKind::Locking` if the lock is still held elsewhere when the timeout expires.
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>>;
}
