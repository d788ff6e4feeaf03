use crate::fs::{sha256_hex, NodeState};
use crate::types::errors::Result;

use super::{Change, ExecCtx, OperationExecutor, Prepared, Step, DRY_RUN_MSG};

/// Creates a missing file. Never overwrites: an existing file is skipped.
pub(crate) struct CreateExec;

impl OperationExecutor for CreateExec {
    fn execute(&self, prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>) -> Result<Step> {
        match prep.state {
            NodeState::File => Ok(Step::skipped("already exists")),
            NodeState::Dir | NodeState::Other => Err(prep.conflict()),
            NodeState::Missing => write_new(prep, ctx, "file created"),
        }
    }
}

/// Write the payload to a target known to be missing.
pub(super) fn write_new(prep: &Prepared<'_>, ctx: &mut ExecCtx<'_>, message: &str) -> Result<Step> {
    let bytes = prep.payload()?;
    let after = Some(sha256_hex(bytes));
    if ctx.dry {
        return Ok(Step::applied(DRY_RUN_MSG, Change::Created).hashes(None, after));
    }
    ctx.write(prep, bytes)?;
    Ok(Step::applied(message, Change::Created).hashes(None, after))
}
