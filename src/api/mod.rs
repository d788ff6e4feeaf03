// Facade for API module; delegates to submodules under src/api/

use std::path::{Path, PathBuf};

use serde_json::json;
use uuid::Uuid;

use crate::adapters::{FileLockManager, LockManager};
use crate::constants::NS_TAG;
use crate::logging::{now_iso, AuditCtx, AuditMode, AuditSink, EventSink, StageLogger};
use crate::policy::{ApplyOptions, EngineConfig};
use crate::types::{ApplyReport, FileOperation, PruneResult, SafePath};

mod apply;
mod builder;
pub mod errors;

pub use builder::EngineBuilder;
pub use errors::{ApiError, ErrorId};

/// Applies batches of file operations to one workspace root.
pub struct Engine<E: EventSink, A: AuditSink> {
    root: PathBuf,
    events: E,
    audit: A,
    config: EngineConfig,
    lock: Option<Box<dyn LockManager>>, // None unless the caller serializes batches
}

impl<E: EventSink, A: AuditSink> std::fmt::Debug for Engine<E, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("lock", &self.lock.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: EventSink, A: AuditSink> Engine<E, A> {
    /// Bind an engine to `root`.
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidRoot` unless `root` is an absolute path to an existing directory.
    pub fn new(root: impl Into<PathBuf>, events: E, audit: A) -> Result<Self, ApiError> {
        let root = root.into();
        if !root.is_absolute() {
            return Err(ApiError::InvalidRoot(format!(
                "{} is not absolute",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(ApiError::InvalidRoot(format!(
                "{} is not an existing directory",
                root.display()
            )));
        }
        Ok(Self {
            root,
            events,
            audit,
            config: EngineConfig::default(),
            lock: None,
        })
    }

    #[must_use]
    pub fn builder(root: impl Into<PathBuf>, events: E, audit: A) -> EngineBuilder<E, A> {
        EngineBuilder::new(root, events, audit)
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Serialize commit batches through an advisory lock file in the configured state directory.
    /// Call after `with_config`.
    #[must_use]
    pub fn with_workspace_lock(self) -> Self {
        let lock = FileLockManager::for_workspace(&self.root, &self.config);
        self.with_lock_manager(Box::new(lock))
    }

    #[must_use]
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.lock_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a caller-supplied path against this engine's root without touching disk.
    ///
    /// # Errors
    ///
    /// The sandbox error `apply_operations` would report for the same path.
    pub fn resolve(&self, rel: &str) -> crate::types::Result<SafePath> {
        SafePath::from_rooted(&self.root, rel)
    }

    /// Directory holding one backup folder per batch.
    #[must_use]
    pub fn backup_base(&self) -> PathBuf {
        self.config.backup_base_for(&self.root)
    }

    /// Apply `ops` in order.
    ///
    /// Every per-operation problem is reported as a `Failed` result; a report with fewer results
    /// than `ops` means the batch stopped at its last result and rolled back.
    ///
    /// # Errors
    ///
    /// Only for failures that prevent the batch from starting: a lock that cannot be acquired,
    /// or a missing lock manager under `LockingPolicy::Required`.
    pub fn apply_operations(
        &self,
        ops: &[FileOperation],
        options: &ApplyOptions,
    ) -> Result<ApplyReport, ApiError> {
        apply::run(self, ops, options)
    }

    /// Remove old batch backup folders according to the retention knobs in `EngineConfig`.
    /// The newest folder always survives. Emits a `backups.prune` event.
    ///
    /// # Errors
    ///
    /// `ApiError::Filesystem` if the backup directory cannot be listed.
    pub fn prune_backups(&self) -> Result<PruneResult, ApiError> {
        let base = self.backup_base();
        let pid = Uuid::new_v5(
            &Uuid::NAMESPACE_URL,
            format!("{NS_TAG}/prune:{}", base.display()).as_bytes(),
        );
        let tctx = AuditCtx::new(
            &self.events as &dyn EventSink,
            &self.audit as &dyn AuditSink,
            pid.to_string(),
            now_iso(),
            AuditMode {
                dry_run: false,
                redact: false,
                publish: true,
            },
        );
        let count_limit = self.config.retention_count_limit;
        let age_limit = self.config.retention_age_limit;
        let slog = StageLogger::new(&tctx);
        match crate::fs::prune_backup_folders(&base, count_limit, age_limit) {
            Ok(res) => {
                slog.prune()
                    .merge(json!({
                        "path": base.display().to_string(),
                        "retention_count_limit": count_limit,
                        "retention_age_limit_ms": age_limit.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
                        "pruned_count": res.pruned_count,
                        "retained_count": res.retained_count,
                    }))
                    .emit_decision(crate::logging::Decision::Success);
                Ok(res)
            }
            Err(e) => {
                slog.prune()
                    .merge(json!({
                        "path": base.display().to_string(),
                        "error": e.to_string(),
                        "error_id": errors::id_str(ErrorId::E_IO),
                        "exit_code": errors::exit_code_for(ErrorId::E_IO),
                    }))
                    .emit_decision(crate::logging::Decision::Failure);
                Err(ApiError::Filesystem(e.to_string()))
            }
        }
    }
}
