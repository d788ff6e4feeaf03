use std::path::PathBuf;

use crate::adapters::LockManager;
use crate::logging::{AuditSink, EventSink};
use crate::policy::EngineConfig;

use super::{ApiError, Engine};

/// Builder for constructing an `Engine` with ergonomic chaining.
/// Mirrors `Engine::new(...).with_*` but defers root validation to `build`.
pub struct EngineBuilder<E: EventSink, A: AuditSink> {
    root: PathBuf,
    events: E,
    audit: A,
    config: EngineConfig,
    lock: Option<Box<dyn LockManager>>,
}

impl<E: EventSink, A: AuditSink> EngineBuilder<E, A> {
    pub fn new(root: impl Into<PathBuf>, events: E, audit: A) -> Self {
        Self {
            root: root.into(),
            events,
            audit,
            config: EngineConfig::default(),
            lock: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    #[must_use]
    pub fn durable(mut self, durable: bool) -> Self {
        self.config.durable = durable;
        self
    }

    /// # Errors
    ///
    /// `ApiError::InvalidRoot` as for `Engine::new`.
    pub fn build(self) -> Result<Engine<E, A>, ApiError> {
        let engine = Engine::new(self.root, self.events, self.audit)?.with_config(self.config);
        Ok(match self.lock {
            Some(lock) => engine.with_lock_manager(lock),
            None => engine,
        })
    }
}
