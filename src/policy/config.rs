use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{BACKUPS_DIR, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_STATE_DIR, LOCK_FILE};

use super::types::LockingPolicy;

/// Per-engine settings.
///
/// `state_dir` is where the engine keeps its own artifacts. A relative value is taken relative to
/// the workspace root, and operations targeting it are rejected as reserved. An absolute value
/// keeps backups outside the workspace altogether.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub state_dir: PathBuf,
    /// fsync written files, backups and their parent directories.
    pub durable: bool,
    pub locking: LockingPolicy,
    pub lock_timeout_ms: u64,
    // Retention knobs for `Engine::prune_backups`
    pub retention_count_limit: Option<usize>,
    pub retention_age_limit: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            durable: true,
            locking: LockingPolicy::Optional,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            retention_count_limit: None,
            retention_age_limit: None,
        }
    }
}

impl EngineConfig {
    /// Defaults plus a mandatory workspace lock and a retention of 20 batch folders.
    ///
    /// Pair with `Engine::with_lock_manager`; without one, every commit batch fails
    /// with `E_LOCKING`.
    #[must_use]
    pub fn production_preset() -> Self {
        Self {
            locking: LockingPolicy::Required,
            retention_count_limit: Some(20),
            ..Self::default()
        }
    }

    /// Disable fsync. Intended for tests and throwaway workspaces.
    #[must_use]
    pub fn volatile() -> Self {
        Self {
            durable: false,
            ..Self::default()
        }
    }

    /// Absolute state directory for `root`.
    #[must_use]
    pub fn state_dir_for(&self, root: &Path) -> PathBuf {
        if self.state_dir.is_absolute() {
            self.state_dir.clone()
        } else {
            root.join(&self.state_dir)
        }
    }

    #[must_use]
    pub fn backup_base_for(&self, root: &Path) -> PathBuf {
        self.state_dir_for(root).join(BACKUPS_DIR)
    }

    #[must_use]
    pub fn lock_path_for(&self, root: &Path) -> PathBuf {
        self.state_dir_for(root).join(LOCK_FILE)
    }

    /// The state directory relative to `root`, when it lives inside the workspace.
    #[must_use]
    pub fn reserved_rel(&self, root: &Path) -> Option<PathBuf> {
        if self.state_dir.is_absolute() {
            self.state_dir.strip_prefix(root).ok().map(Path::to_path_buf)
        } else {
            Some(self.state_dir.clone())
        }
    }
}
