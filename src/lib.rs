#![forbid(unsafe_code)]
//! patchbay: sandboxed, atomic, reversible application of file-operation batches.
//!
//! Safety model highlights:
//! - Every caller-supplied path goes through `SafePath::from_rooted`, which refuses anything that
//!   resolves outside the workspace root; symlinked ancestors are re-checked before mutation.
//! - File bytes are staged in a sibling temp file and moved into place with `renameat` on a
//!   `O_DIRECTORY|O_NOFOLLOW` parent handle, so readers never observe a partial write.
//! - Update/delete capture a pre-image into a per-batch backup folder; rollback replays the
//!   applied stack in reverse from those backups.
//! - Dry-run computes the same results and events without touching disk.
//! - This crate forbids `unsafe` and uses `rustix` for the `*at` syscalls.

pub mod adapters;
pub mod api;
pub mod constants;
pub mod extract;
pub mod fs;
pub mod jobs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
pub use policy::{ApplyOptions, EngineConfig, LockingPolicy};
