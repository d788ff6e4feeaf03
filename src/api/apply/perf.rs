use std::time::Instant;

use serde::Serialize;

/// Milliseconds spent per phase, summed over a batch.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub(crate) struct PerfAgg {
    #[serde(rename = "backup_ms")]
    pub backup: u64,
    #[serde(rename = "write_ms")]
    pub write: u64,
}

pub(crate) fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}
