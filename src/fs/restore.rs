//! Inverse primitives used by rollback.
use std::fs;
use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;

use super::atomic::{remove_durable, write_atomic};

/// Put the bytes captured in `backup` back at `target`, recreating parent directories.
///
/// The restore goes through the atomic writer, so a failed restore never leaves a partial
/// target. The backup's permission bits are applied to the restored file.
///
/// # Errors
///
/// `NotFound` if the backup payload is gone; any IO error from the write.
pub fn restore_from_backup(target: &Path, backup: &Path, durable: bool) -> std::io::Result<()> {
    let bytes = fs::read(backup).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("backup missing: {}", backup.display()),
            )
        } else {
            e
        }
    })?;
    let mode = fs::metadata(backup)?.permissions().mode() & 0o7777;
    write_atomic(target, &bytes, durable)?;
    fs::set_permissions(target, fs::Permissions::from_mode(mode))?;
    Ok(())
}

/// Undo a creation. A target that is already gone counts as undone.
///
/// # Errors
///
/// Returns an IO error if the unlink fails for another reason.
pub fn remove_created(target: &Path, durable: bool) -> std::io::Result<()> {
    remove_durable(target, durable)
}
