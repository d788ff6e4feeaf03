use crate::fs::{sha256_hex, NodeState};
use crate::types::errors::Result;

use super::create::write_new;
use super::{Change, ExecCtx, OperationExecutor, Prepared, Step, DRY_RUN_MSG};

/// Replaces file content. A missing target is created; identical content is a no-op.
///
/// The identical-content skip applies in dry-run too, so a preview reports `Skipped` exactly
/// where the commit would.
pub(crate) struct UpdateExec;

impl OperationExecutor for UpdateExec {
    fn execute(&self, prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>) -> Result<Step> {
        match prep.state {
            NodeState::Missing => write_new(prep, ctx, "file created (was missing)"),
            NodeState::Dir | NodeState::Other => Err(prep.conflict()),
            NodeState::File => {
                let bytes = prep.payload()?;
                let current =
                    std::fs::read(prep.target.as_path()).map_err(|e| prep.io_error("read", &e))?;
                if current == bytes {
                    return Ok(Step::skipped("content identical"));
                }
                let hashes = (Some(sha256_hex(&current)), Some(sha256_hex(bytes)));
                if ctx.dry {
                    return Ok(Step::applied(DRY_RUN_MSG, Change::Updated).hashes(hashes.0, hashes.1));
                }
                let backup = ctx.capture(prep)?;
                ctx.write(prep, bytes)?;
                Ok(Step::applied("file updated", Change::Updated)
                    .backup(backup)
                    .hashes(hashes.0, hashes.1))
            }
        }
    }
}
