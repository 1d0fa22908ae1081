//! `[database]` section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// PostgreSQL settings. Only `url` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    /// `[database.pool]`
    #[serde(default)]
    pub pool: PoolConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free connection.
    pub acquire_timeout_seconds: u64,
    /// Idle connections are closed after this long; unset keeps them open.
    pub idle_timeout_seconds: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 10,
            idle_timeout_seconds: Some(300),
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_seconds.map(Duration::from_secs)
    }
}
