//! Path checks that need the live filesystem, complementing the lexical `SafePath` resolution.

use std::path::{Path, PathBuf};

use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::safepath::SafePath;

/// Reject a target that is reached through a symlink pointing outside the workspace root.
///
/// The deepest existing ancestor of the target (the target itself when present) is
/// canonicalized and must remain under the canonical root.
///
/// # Errors
///
/// `PathEscapesRoot` on escape; `Io` if the root cannot be canonicalized.
pub fn ensure_within_root(target: &SafePath) -> Result<()> {
    let root = target
        .root()
        .canonicalize()
        .map_err(|e| Error::new(ErrorKind::Io, format!("workspace root unavailable: {e}")))?;
    let mut probe: PathBuf = target.as_path();
    loop {
        if std::fs::symlink_metadata(&probe).is_ok() {
            // Dangling links cannot be canonicalized; judge them by where they point.
            let resolved = match probe.canonicalize() {
                Ok(p) => p,
                Err(_) => match std::fs::read_link(&probe) {
                    Ok(dest) if dest.is_absolute() => dest,
                    Ok(dest) => probe.parent().unwrap_or(Path::new("/")).join(dest),
                    Err(_) => probe.clone(),
                },
            };
            if !is_lexically_outside(&resolved, &root) {
                return Ok(());
            }
            return Err(Error::new(
                ErrorKind::PathEscapesRoot,
                format!(
                    "path escapes root through a symlink: {}",
                    target.display_rel()
                ),
            ));
        }
        if !probe.pop() {
            return Ok(());
        }
    }
}

// A dangling relative link is only trusted when it cannot climb out.
fn is_lexically_outside(resolved: &Path, root: &Path) -> bool {
    let mut depth: i64 = 0;
    let Ok(rest) = resolved.strip_prefix(root) else {
        return true;
    };
    for c in rest.components() {
        match c {
            std::path::Component::ParentDir => depth -= 1,
            std::path::Component::Normal(_) => depth += 1,
            _ => {}
        }
        if depth < 0 {
            return true;
        }
    }
    false
}

/// True when `target` lies inside `reserved` (a path relative to the same root).
#[must_use]
pub fn is_reserved(target: &SafePath, reserved: Option<&Path>) -> bool {
    match reserved {
        Some(r) if !r.as_os_str().is_empty() => target.rel().starts_with(r),
        _ => false,
    }
}
