//! Engine configuration and per-batch options.
//!
//! - `options`: [`ApplyOptions`], chosen per batch by the calling layer
//! - `config`: [`EngineConfig`], fixed for an engine instance
//! - `types`: small enums shared by both

pub mod config;
pub mod options;
pub mod types;

pub use config::EngineConfig;
pub use options::ApplyOptions;
pub use types::LockingPolicy;
