//! Backup subsystem: one folder per batch, pre-images of every destructive change.

pub mod folder;
pub mod prune;

pub use folder::*;
pub use prune::*;
