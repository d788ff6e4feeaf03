use std::path::{Path, PathBuf};

use super::errors::{Error, ErrorKind, Result};

/// A workspace-relative path proven to resolve inside its root.
///
/// This is the only way caller-supplied paths reach the filesystem layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SafePath {
    /// The workspace root this path is confined to
    root: PathBuf,
    /// Lexically normalized path relative to `root`; empty means the root itself
    rel: PathBuf,
}

impl SafePath {
    /// Resolve an untrusted, caller-supplied path against `root`.
    ///
    /// Backslashes are treated as separators. Leading separators and `./` markers are stripped,
    /// so `/index.html`, `./index.html` and `index.html` all name the same file. `.` segments are
    /// dropped and `..` pops one segment; the path is accepted only if it never climbs above
    /// `root`.
    ///
    /// # Errors
    ///
    /// - `InvalidPath` if `root` is not absolute or the candidate contains a NUL byte.
    /// - `PathEscapesRoot` if the candidate resolves outside `root` or carries a drive prefix.
    pub fn from_rooted(root: &Path, candidate: &str) -> Result<Self> {
        if !root.is_absolute() {
            return Err(Error::new(ErrorKind::InvalidPath, "root must be absolute"));
        }
        if candidate.contains('\0') {
            return Err(Error::new(
                ErrorKind::InvalidPath,
                "invalid path: contains NUL byte",
            ));
        }
        let normalized = candidate.replace('\\', "/");
        let trimmed = strip_leading_markers(&normalized);
        if has_drive_prefix(trimmed) {
            return Err(escapes(candidate));
        }

        let mut rel = PathBuf::new();
        for seg in trimmed.split('/') {
            match seg {
                "" | "." => {}
                ".." => {
                    if !rel.pop() {
                        return Err(escapes(candidate));
                    }
                }
                name => rel.push(name),
            }
        }
        let full = root.join(&rel);
        match full.strip_prefix(root) {
            Ok(r) if !r.is_absolute() => {}
            _ => return Err(escapes(candidate)),
        }
        Ok(SafePath {
            root: root.to_path_buf(),
            rel,
        })
    }

    /// Returns the full path by joining the root and relative components.
    #[must_use]
    pub fn as_path(&self) -> PathBuf {
        self.root.join(&self.rel)
    }

    /// Returns the normalized path relative to the root.
    #[must_use]
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True when the path names the workspace root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.rel.as_os_str().is_empty()
    }

    /// Relative path rendered with `/` separators, stable across platforms.
    #[must_use]
    pub fn display_rel(&self) -> String {
        self.rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn escapes(candidate: &str) -> Error {
    Error::new(
        ErrorKind::PathEscapesRoot,
        format!("path escapes root: {candidate}"),
    )
}

fn strip_leading_markers(mut s: &str) -> &str {
    loop {
        if let Some(rest) = s.strip_prefix('/') {
            s = rest;
        } else if let Some(rest) = s.strip_prefix("./") {
            s = rest;
        } else {
            return s;
        }
    }
}

// `C:foo` / `C:/foo` would be drive-relative or drive-absolute on Windows hosts.
fn has_drive_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 2 && b[0].is_ascii_alphabetic() && b[1] == b':'
}
