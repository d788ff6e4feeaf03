use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;

use crate::constants::LOCK_POLL_MS;
use crate::policy::EngineConfig;
use crate::types::errors::{Error, ErrorKind, Result};

use super::{LockGuard, LockManager};

/// Advisory `flock` on a lock file, polled until the timeout expires.
#[derive(Debug)]
pub struct FileLockManager {
    path: PathBuf,
}

impl FileLockManager {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Lock file inside the configured state directory of `root`.
    #[must_use]
    pub fn for_workspace(root: &Path, config: &EngineConfig) -> Self {
        Self::new(config.lock_path_for(root))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

struct FileGuard {
    file: File,
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl LockGuard for FileGuard {}

impl LockManager for FileLockManager {
    fn acquire_process_lock(&self, timeout_ms: u64) -> Result<Box<dyn LockGuard>> {
        let t0 = Instant::now();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)?;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Box::new(FileGuard { file })),
                Err(_) if t0.elapsed() >= Duration::from_millis(timeout_ms) => {
                    return Err(Error::new(
                        ErrorKind::Locking,
                        format!(
                            "timeout acquiring workspace lock {} after {timeout_ms}ms",
                            self.path.display()
                        ),
                    ));
                }
                Err(_) => thread::sleep(Duration::from_millis(LOCK_POLL_MS)),
            }
        }
    }
}
