use std::path::Path;

use crate::fs::{remove_durable, sha256_hex_of, NodeState};
use crate::types::errors::Result;

use super::{Change, ExecCtx, OperationExecutor, Prepared, Step, DRY_RUN_MSG};

/// Removes a regular file. Directories are never removed.
pub(crate) struct DeleteExec;

impl OperationExecutor for DeleteExec {
    fn execute(&self, prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>) -> Result<Step> {
        match prep.state {
            NodeState::Missing => Ok(Step::skipped("file not found")),
            NodeState::Dir | NodeState::Other => Err(prep.conflict()),
            NodeState::File => {
                let path = prep.target.as_path();
                let before = sha256_hex_of(&path);
                if ctx.dry {
                    return Ok(Step::applied(DRY_RUN_MSG, Change::Deleted).hashes(before, None));
                }
                let backup = ctx.capture(prep)?;
                remove(&path, ctx.durable).map_err(|e| prep.io_error("delete", &e))?;
                Ok(Step::applied("file deleted", Change::Deleted)
                    .backup(backup)
                    .hashes(before, None))
            }
        }
    }
}

#[cfg(test)]
thread_local! {
    // Targets ending in this relative path refuse removal on the current thread.
    static FAIL_REMOVE: std::cell::RefCell<Option<std::path::PathBuf>> =
        const { std::cell::RefCell::new(None) };
}

fn remove(path: &Path, durable: bool) -> std::io::Result<()> {
    #[cfg(test)]
    if FAIL_REMOVE.with(|f| f.borrow().as_deref().is_some_and(|p| path.ends_with(p))) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "removal refused",
        ));
    }
    remove_durable(path, durable)
}
