//! Schema migration configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Schema migration configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Time limit in seconds for a single migration's `apply`. Exceeding it
    /// is treated as an apply failure. Unset means no limit.
    #[serde(default)]
    pub apply_timeout_seconds: Option<u64>,
}

impl MigrationConfig {
    /// Apply time limit, if one is configured.
    pub fn apply_timeout(&self) -> Option<Duration> {
        self.apply_timeout_seconds.map(Duration::from_secs)
    }
}
