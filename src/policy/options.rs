use serde::{Deserialize, Serialize};

/// Per-batch switches. Missing keys in the wire form take the defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplyOptions {
    /// Compute results and events without touching disk.
    pub dry_run: bool,
    /// Capture a pre-image before every update and delete.
    pub backup: bool,
    /// Undo everything applied so far and stop at the first failure.
    pub rollback_on_error: bool,
    /// Deliver events to the sink; when false the batch is silent.
    pub publish_events: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            rollback_on_error: true,
            publish_events: true,
        }
    }
}

impl ApplyOptions {
    /// Dry-run with the default safety switches, for previews.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Keep going after a failure; backups are still taken.
    #[must_use]
    pub fn best_effort() -> Self {
        Self {
            rollback_on_error: false,
            ..Self::default()
        }
    }

    /// No backups and no rollback. Failures leave earlier operations in place.
    #[must_use]
    pub fn unguarded() -> Self {
        Self {
            backup: false,
            rollback_on_error: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[must_use]
    pub const fn with_publish_events(mut self, publish: bool) -> Self {
        self.publish_events = publish;
        self
    }
}
