use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::types::PruneResult;

/// Prune batch backup folders under `base` by count and by age. Never deletes the newest folder.
///
/// Folder names start with a zero-padded millisecond timestamp, so lexical order is creation
/// order. `count_limit` is the total number of folders to retain; `age_limit` removes folders
/// whose modification time is older than the limit.
///
/// # Errors
///
/// Returns an IO error if `base` exists but cannot be listed.
pub fn prune_backup_folders(
    base: &Path,
    count_limit: Option<usize>,
    age_limit: Option<Duration>,
) -> std::io::Result<PruneResult> {
    let mut folders: Vec<(String, PathBuf)> = match std::fs::read_dir(base) {
        Ok(rd) => rd
            .flatten()
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|e| (e.file_name().to_string_lossy().into_owned(), e.path()))
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e),
    };
    if folders.is_empty() {
        return Ok(PruneResult::default());
    }
    // Newest first
    folders.sort_by(|a, b| b.0.cmp(&a.0));

    let now = SystemTime::now();
    let mut result = PruneResult::default();
    for (idx, (_, path)) in folders.iter().enumerate() {
        if idx == 0 {
            result.retained_count += 1;
            continue;
        }
        let over_count = count_limit.is_some_and(|limit| idx >= limit);
        let over_age = age_limit.is_some_and(|limit| {
            std::fs::metadata(path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .is_some_and(|age| age > limit)
        });
        if (over_count || over_age) && std::fs::remove_dir_all(path).is_ok() {
            result.pruned_count += 1;
        } else {
            result.retained_count += 1;
        }
    }
    // Persist the removals
    let _ = std::fs::File::open(base).and_then(|d| d.sync_all());
    Ok(result)
}
