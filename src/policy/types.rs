use serde::{Deserialize, Serialize};

/// Whether a batch may run without a configured lock manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockingPolicy {
    /// Commit batches fail with `E_LOCKING` when no lock manager is set.
    Required,
    /// Take the lock when a manager is set; otherwise run unserialized.
    #[default]
    Optional,
}
