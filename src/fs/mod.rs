pub mod atomic;
pub mod backup;
pub mod meta;
pub mod paths;
pub mod restore;

pub use atomic::{fsync_parent_dir, open_dir_nofollow, remove_durable, write_atomic};
pub use backup::{prune_backup_folders, BackupFolder};
pub use meta::{probe, sha256_hex, sha256_hex_of, NodeState};
pub use paths::{ensure_within_root, is_reserved};
pub use restore::{remove_created, restore_from_backup};
