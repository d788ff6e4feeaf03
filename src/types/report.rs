use std::path::PathBuf;

use serde::Serialize;
use uuid::Uuid;

use super::ops::Action;
use crate::api::errors::ErrorId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Applied,
    Skipped,
    Failed,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Skipped => "skipped",
            Status::Failed => "failed",
        }
    }
}

/// Outcome of one operation. Created once, never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub path: String,
    pub action: Action,
    pub status: Status,
    pub message: Option<String>,
    pub backup_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_id: Option<ErrorId>,
}

impl OperationResult {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub applied: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub pruned_count: usize,
    pub retained_count: usize,
}

/// Synchronous return value of a batch.
///
/// `results` covers every attempted operation up to and including the first failure when the
/// batch stopped early; compare `results.len()` with the input length to detect that.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub batch_id: Uuid,
    pub results: Vec<OperationResult>,
    pub backup_folder: Option<PathBuf>,
    pub rolled_back: bool,
    pub rollback_errors: Vec<String>,
    pub duration_ms: u64,
}

impl ApplyReport {
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.results.iter().fold(Counts::default(), |mut c, r| {
            match r.status {
                Status::Applied => c.applied += 1,
                Status::Skipped => c.skipped += 1,
                Status::Failed => c.failed += 1,
            }
            c
        })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.results.iter().any(OperationResult::is_failed)
    }

    /// True when fewer results than submitted operations came back.
    #[must_use]
    pub fn stopped_early(&self, submitted: usize) -> bool {
        self.results.len() < submitted
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}
