//! Shared crate-wide constants for patchbay.
//!
//! Centralizes magic values and default labels used across modules.

/// Default engine state directory, relative to the workspace root.
/// Holds `backups/` (one folder per batch) and the optional `lock` file.
/// Operations targeting this directory are rejected as reserved.
pub const DEFAULT_STATE_DIR: &str = ".patchbay";

/// Subdirectory of the state directory holding per-batch backup folders.
pub const BACKUPS_DIR: &str = "backups";

/// File name of the advisory workspace lock inside the state directory.
pub const LOCK_FILE: &str = "lock";

/// Temporary filename suffix used when staging an atomic write within a directory.
/// Full name: `.{name}.{millis}.{random}{TMP_SUFFIX}`, e.g. `.index.html.1729150000000.3f9c2a1b.patchbay.tmp`.
pub const TMP_SUFFIX: &str = ".patchbay.tmp";

/// Suffix of backup payload files. Full name: `{rel with '/' -> "__"}.{millis}.bak`.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Replacement for path separators when flattening a relative path into a backup file name.
pub const BACKUP_SEP: &str = "__";

/// Poll interval in milliseconds for the file-backed lock manager.
pub const LOCK_POLL_MS: u64 = 25;

/// Default bounded wait for the optional workspace lock.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// UUIDv5 namespace tag for deterministic batch/operation IDs.
pub const NS_TAG: &str = "patchbay/file-operations";

/// Event emitted once per operation (applied, skipped or failed).
pub const EVENT_FILE_OPERATION: &str = "file.operation";

/// Event emitted per rollback step.
pub const EVENT_ROLLBACK: &str = "file.rollback";

/// Terminal event emitted once per batch.
pub const EVENT_SUMMARY: &str = "file.operations.summary";

/// Event emitted by `Engine::prune_backups`.
pub const EVENT_PRUNE: &str = "backups.prune";

/// Version of the event envelope emitted by `logging::StageLogger`.
pub const SCHEMA_VERSION: i64 = 1;
