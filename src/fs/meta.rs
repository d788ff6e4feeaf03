//! Non-mutating filesystem probes used by the executors and event payloads.
use sha2::{Digest, Sha256};
use std::path::Path;

/// On-disk state of an operation target, as the executors see it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Missing,
    File,
    Dir,
    /// Symlinks (live or dangling) and special files.
    Other,
}

/// Classify `path` without following a final symlink; links of any kind are `Other`.
///
/// # Errors
///
/// Returns an IO error for failures other than the path not existing.
pub fn probe(path: &Path) -> std::io::Result<NodeState> {
    let md = match std::fs::symlink_metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(NodeState::Missing),
        Err(e) => return Err(e),
    };
    let ft = md.file_type();
    Ok(if ft.is_file() {
        NodeState::File
    } else if ft.is_dir() {
        NodeState::Dir
    } else {
        NodeState::Other
    })
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute SHA-256 of a file at `path`, returning a lowercase hex string.
pub fn sha256_hex_of(path: &Path) -> Option<String> {
    let mut f = std::fs::File::open(path).ok()?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut f, &mut hasher).ok()?;
    Some(hex::encode(hasher.finalize()))
}
