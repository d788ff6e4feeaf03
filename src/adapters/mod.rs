//! Pluggable collaborators the engine can be configured with.
pub mod lock;

pub use lock::file::FileLockManager;
pub use lock::{LockGuard, LockManager};
