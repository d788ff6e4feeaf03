//! Atomic write primitives.
//!
//! Bytes are staged in a sibling temporary file and moved over the target with a single rename,
//! using a TOCTOU-safe sequence on directory handles:
//! `open_dir_nofollow(parent) -> openat(tmp, O_CREAT|O_EXCL) -> write -> fsync -> renameat(tmp, final) -> fsync(dirfd)`.
//!
//! A crash or error at any point leaves the target untouched; at worst an orphaned
//! `*.patchbay.tmp` file remains next to it.
use std::ffi::CString;
use std::fs;
use std::io::Write as _;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt as _;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rustix::fd::OwnedFd;
use rustix::fs::{fchmod, fsync, openat, renameat, unlinkat, AtFlags, Mode, OFlags, CWD};
use rustix::io::Errno;
use uuid::Uuid;

use crate::constants::TMP_SUFFIX;

fn errno_to_io(e: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

fn cstring(bytes: &[u8]) -> std::io::Result<CString> {
    CString::new(bytes)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid cstring"))
}

/// Open a directory with `O_DIRECTORY` | `O_NOFOLLOW` for atomic operations.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir_nofollow(dir: &Path) -> std::io::Result<OwnedFd> {
    let c = cstring(dir.as_os_str().as_bytes())?;
    openat(
        CWD,
        c.as_c_str(),
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        let dir = fs::File::open(parent)?;
        dir.sync_all()?;
    }
    Ok(())
}

/// Injected failure points for exercising the cleanup paths.
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteFault {
    /// Fail after half the payload reached the temp file (disk full).
    ShortWrite,
    /// Fail after the temp file is complete, before the rename.
    BeforeRename,
}

fn tmp_name_for(fname: &std::ffi::OsStr) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let mut rand = Uuid::new_v4().simple().to_string();
    rand.truncate(12);
    format!(".{}.{millis}.{rand}{TMP_SUFFIX}", fname.to_string_lossy())
}

/// Atomically replace (or create) `target` with `bytes`.
///
/// Parent directories are created as needed. An existing target's permission bits carry over to
/// the new file. With `durable`, the payload and the parent directory are fsynced.
///
/// # Errors
///
/// Returns an IO error if any step fails; the target is left as it was.
pub fn write_atomic(target: &Path, bytes: &[u8], durable: bool) -> std::io::Result<()> {
    write_atomic_with(target, bytes, durable, None)
}

pub(crate) fn write_atomic_with(
    target: &Path,
    bytes: &[u8],
    durable: bool,
    fault: Option<WriteFault>,
) -> std::io::Result<()> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let fname = target.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no file name")
    })?;
    fs::create_dir_all(parent)?;
    let prior_mode = fs::metadata(target).ok().map(|m| m.permissions().mode());

    let dirfd = open_dir_nofollow(parent)?;
    let tmp_c = cstring(tmp_name_for(fname).as_bytes())?;
    let new_c = cstring(fname.as_bytes())?;

    let fd = openat(
        &dirfd,
        tmp_c.as_c_str(),
        OFlags::WRONLY | OFlags::CREATE | OFlags::EXCL | OFlags::CLOEXEC | OFlags::NOFOLLOW,
        Mode::from_bits_truncate(0o644),
    )
    .map_err(errno_to_io)?;

    let staged = (|| -> std::io::Result<()> {
        if let Some(mode) = prior_mode {
            fchmod(&fd, Mode::from_bits_truncate(mode)).map_err(errno_to_io)?;
        }
        let mut file = fs::File::from(fd);
        if fault == Some(WriteFault::ShortWrite) {
            file.write_all(&bytes[..bytes.len() / 2])?;
            return Err(std::io::Error::other("injected short write"));
        }
        file.write_all(bytes)?;
        if durable {
            file.sync_all()?;
        }
        if fault == Some(WriteFault::BeforeRename) {
            return Err(std::io::Error::other("injected failure before rename"));
        }
        renameat(&dirfd, tmp_c.as_c_str(), &dirfd, new_c.as_c_str()).map_err(errno_to_io)
    })();

    if let Err(e) = staged {
        let _ = unlinkat(&dirfd, tmp_c.as_c_str(), AtFlags::empty());
        return Err(e);
    }
    if durable {
        let _ = fsync(&dirfd);
    }
    Ok(())
}

/// Unlink `target` relative to its parent directory handle. A missing target is not an error.
///
/// # Errors
///
/// Returns an IO error if the parent cannot be opened or the unlink fails.
pub fn remove_durable(target: &Path, durable: bool) -> std::io::Result<()> {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let fname = target.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "target has no file name")
    })?;
    let dirfd = open_dir_nofollow(parent)?;
    let fname_c = cstring(fname.as_bytes())?;
    match unlinkat(&dirfd, fname_c.as_c_str(), AtFlags::empty()) {
        Ok(()) => {}
        Err(e) if e == Errno::NOENT => {}
        Err(e) => return Err(errno_to_io(e)),
    }
    if durable {
        let _ = fsync(&dirfd);
    }
    Ok(())
}
