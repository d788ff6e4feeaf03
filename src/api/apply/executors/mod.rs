use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::fs::{ensure_within_root, is_reserved, probe, write_atomic, BackupFolder, NodeState};
use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::{Action, FileOperation, SafePath, Status};

use super::perf::{elapsed_ms, PerfAgg};

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod update;

pub(crate) const DRY_RUN_MSG: &str = "dry run: no write";

/// Per-batch state shared by the executors.
pub(crate) struct ExecCtx<'a> {
    pub dry: bool,
    pub durable: bool,
    pub backups: Option<&'a mut BackupFolder>,
    pub perf: PerfAgg,
}

impl<'a> ExecCtx<'a> {
    pub(crate) fn new(dry: bool, durable: bool, backups: Option<&'a mut BackupFolder>) -> Self {
        Self {
            dry,
            durable,
            backups,
            perf: PerfAgg::default(),
        }
    }

    /// Copy the current target into the batch backup folder. `None` in dry-run or with backups
    /// disabled.
    pub(crate) fn capture(&mut self, prep: &Prepared<'_>) -> Result<Option<PathBuf>> {
        if self.dry {
            return Ok(None);
        }
        let Some(folder) = self.backups.as_deref_mut() else {
            return Ok(None);
        };
        let t0 = Instant::now();
        let res = folder.backup(&prep.target.as_path(), prep.target.rel(), self.durable);
        self.perf.backup = self.perf.backup.saturating_add(elapsed_ms(t0));
        res.map(Some).map_err(|e| {
            Error::new(
                ErrorKind::Backup,
                format!("backup failed for {}: {e}", prep.target.display_rel()),
            )
        })
    }

    pub(crate) fn write(&mut self, prep: &Prepared<'_>, bytes: &[u8]) -> Result<()> {
        let t0 = Instant::now();
        let res = write_atomic(&prep.target.as_path(), bytes, self.durable);
        self.perf.write = self.perf.write.saturating_add(elapsed_ms(t0));
        res.map_err(|e| {
            Error::new(
                ErrorKind::Io,
                format!("write failed for {}: {e}", prep.target.display_rel()),
            )
        })
    }
}

/// An operation that passed validation and sandboxing, with its target probed.
pub(crate) struct Prepared<'o> {
    pub op: &'o FileOperation,
    pub target: SafePath,
    pub state: NodeState,
    /// Decoded payload for create/update.
    pub bytes: Option<Vec<u8>>,
}

impl Prepared<'_> {
    pub(crate) fn payload(&self) -> Result<&[u8]> {
        self.bytes.as_deref().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("invalid operation: content is required for {}", self.op.action),
            )
        })
    }

    pub(crate) fn conflict(&self) -> Error {
        let what = match self.state {
            NodeState::Dir => "a directory",
            _ => "not a regular file",
        };
        Error::new(
            ErrorKind::NameConflict,
            format!("name conflict: {} is {what}", self.target.display_rel()),
        )
    }

    pub(crate) fn io_error(&self, verb: &str, e: &std::io::Error) -> Error {
        Error::new(
            ErrorKind::Io,
            format!("{verb} failed for {}: {e}", self.target.display_rel()),
        )
    }
}

/// What an applied step changed, for rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Change {
    Created,
    Updated,
    Deleted,
}

/// Executor outcome for one operation that did not fail.
#[derive(Debug)]
pub(crate) struct Step {
    pub status: Status,
    pub message: String,
    pub backup_path: Option<PathBuf>,
    pub change: Option<Change>,
    pub before_hash: Option<String>,
    pub after_hash: Option<String>,
}

impl Step {
    pub(crate) fn skipped(message: &str) -> Self {
        Self {
            status: Status::Skipped,
            message: message.to_string(),
            backup_path: None,
            change: None,
            before_hash: None,
            after_hash: None,
        }
    }

    pub(crate) fn applied(message: &str, change: Change) -> Self {
        Self {
            status: Status::Applied,
            message: message.to_string(),
            backup_path: None,
            change: Some(change),
            before_hash: None,
            after_hash: None,
        }
    }

    pub(crate) fn backup(mut self, path: Option<PathBuf>) -> Self {
        self.backup_path = path;
        self
    }

    pub(crate) fn hashes(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.before_hash = before;
        self.after_hash = after;
        self
    }
}

/// Small, focused per-action executor.
pub(crate) trait OperationExecutor {
    fn execute(&self, prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>) -> Result<Step>;
}

/// Validate the shape, sandbox the path, decode the payload and probe the target.
pub(crate) fn prepare<'o>(
    root: &Path,
    reserved: Option<&Path>,
    op: &'o FileOperation,
) -> Result<Prepared<'o>> {
    op.validate()?;
    let target = SafePath::from_rooted(root, &op.path)?;
    if is_reserved(&target, reserved) {
        return Err(Error::new(
            ErrorKind::Reserved,
            format!("reserved path: {} belongs to the engine", target.display_rel()),
        ));
    }
    ensure_within_root(&target)?;
    let bytes = if op.action.needs_content() {
        Some(op.decode_content()?)
    } else {
        None
    };
    let state = probe(&target.as_path()).map_err(|e| {
        Error::new(
            ErrorKind::Io,
            format!("cannot inspect {}: {e}", target.display_rel()),
        )
    })?;
    Ok(Prepared {
        op,
        target,
        state,
        bytes,
    })
}

pub(crate) fn dispatch(prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>) -> Result<Step> {
    match &prep.op.action {
        Action::Create => create::CreateExec.execute(prep, ctx),
        Action::Update => update::UpdateExec.execute(prep, ctx),
        Action::Delete => delete::DeleteExec.execute(prep, ctx),
        Action::Unsupported(a) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid operation: unsupported action {a:?}"),
        )),
    }
}
