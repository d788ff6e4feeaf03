use std::fs;
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::constants::{BACKUP_SEP, BACKUP_SUFFIX};

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Per-batch backup directory.
///
/// The name is allocated up front (`{millis}-{run}`, zero-padded so names sort chronologically),
/// but the directory is only created by the first `backup` call. A folder is never shared
/// between batches.
#[derive(Debug)]
pub struct BackupFolder {
    path: PathBuf,
    materialized: bool,
}

impl BackupFolder {
    /// Allocate a fresh folder name under `base` without touching disk.
    #[must_use]
    pub fn allocate(base: &Path) -> Self {
        let mut run = Uuid::new_v4().simple().to_string();
        run.truncate(8);
        Self {
            path: base.join(format!("{:013}-{run}", now_millis())),
            materialized: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Copy the current bytes of `source` into this folder and return the backup path.
    ///
    /// `rel` is the workspace-relative name of `source`; it is flattened into the backup file
    /// name (`src/app.ts` -> `src__app.ts.{millis}.bak`). If that name is taken, the timestamp is
    /// bumped until it is unique, so touching the same path twice keeps both pre-images.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the folder cannot be created or the copy fails.
    pub fn backup(&mut self, source: &Path, rel: &Path, durable: bool) -> std::io::Result<PathBuf> {
        if !self.materialized {
            fs::create_dir_all(&self.path)?;
            self.materialized = true;
        }
        let stem = flatten_rel(rel);
        let mut ts = now_millis();
        let (dest, mut out) = loop {
            let candidate = self.path.join(format!("{stem}.{ts}{BACKUP_SUFFIX}"));
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(f) => break (candidate, f),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    ts = ts.saturating_add(1);
                }
                Err(e) => return Err(e),
            }
        };
        let copied = (|| -> std::io::Result<()> {
            let mut src = fs::File::open(source)?;
            std::io::copy(&mut src, &mut out)?;
            out.flush()?;
            let mode = src.metadata()?.permissions().mode();
            out.set_permissions(fs::Permissions::from_mode(mode & 0o7777))?;
            if durable {
                out.sync_all()?;
            }
            Ok(())
        })();
        if let Err(e) = copied {
            let _ = fs::remove_file(&dest);
            return Err(e);
        }
        if durable {
            let _ = crate::fs::atomic::fsync_parent_dir(&dest);
        }
        Ok(dest)
    }
}

fn flatten_rel(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        "root".to_string()
    } else {
        parts.join(BACKUP_SEP)
    }
}
