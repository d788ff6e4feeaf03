//! In-memory job table for tracking batches submitted by a host service.
//!
//! The store is an owned value: no globals and no implicit expiry. Hosts that need retention
//! call `remove` themselves.
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use uuid::Uuid;

use crate::logging::now_iso;
use crate::types::{ApplyReport, Counts};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Condensed outcome of the batch a job ran.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub batch_id: Uuid,
    pub counts: Counts,
    pub rolled_back: bool,
    pub backup_folder: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub label: String,
    pub state: JobState,
    pub created_at: String,
    pub updated_at: String,
    pub summary: Option<JobSummary>,
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<Uuid, JobRecord>>,
    // Insertion order, so `list` is stable
    order: Mutex<Vec<Uuid>>,
}

impl JobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<Uuid, JobRecord>> {
        // A panic while holding the lock cannot leave a record half-written
        self.jobs.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn order(&self) -> MutexGuard<'_, Vec<Uuid>> {
        self.order.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register a new `Pending` job and return its id.
    pub fn create(&self, label: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let now = now_iso();
        let rec = JobRecord {
            id,
            label: label.into(),
            state: JobState::Pending,
            created_at: now.clone(),
            updated_at: now,
            summary: None,
        };
        self.table().insert(id, rec);
        self.order().push(id);
        id
    }

    /// Mutate a job in place and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// `JobError::NotFound` for an unknown id.
    pub fn update<F: FnOnce(&mut JobRecord)>(&self, id: Uuid, f: F) -> Result<JobRecord, JobError> {
        let mut table = self.table();
        let rec = table.get_mut(&id).ok_or(JobError::NotFound(id))?;
        f(rec);
        rec.id = id;
        rec.updated_at = now_iso();
        Ok(rec.clone())
    }

    /// # Errors
    ///
    /// `JobError::NotFound` for an unknown id.
    pub fn set_state(&self, id: Uuid, state: JobState) -> Result<JobRecord, JobError> {
        self.update(id, |r| r.state = state)
    }

    /// Close a job from the report of the batch it ran. Any failed operation fails the job.
    ///
    /// # Errors
    ///
    /// `JobError::NotFound` for an unknown id.
    pub fn record_report(&self, id: Uuid, report: &ApplyReport) -> Result<JobRecord, JobError> {
        let summary = JobSummary {
            batch_id: report.batch_id,
            counts: report.counts(),
            rolled_back: report.rolled_back,
            backup_folder: report.backup_folder.clone(),
        };
        let state = if report.is_success() {
            JobState::Completed
        } else {
            JobState::Failed
        };
        self.update(id, |r| {
            r.state = state;
            r.summary = Some(summary);
        })
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<JobRecord> {
        self.table().get(&id).cloned()
    }

    /// All jobs in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<JobRecord> {
        let order = self.order();
        let table = self.table();
        order.iter().filter_map(|id| table.get(id).cloned()).collect()
    }

    pub fn remove(&self, id: Uuid) -> Option<JobRecord> {
        let removed = self.table().remove(&id);
        if removed.is_some() {
            self.order().retain(|x| *x != id);
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
