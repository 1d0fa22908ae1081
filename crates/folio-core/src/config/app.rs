//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL this process is reachable at from itself.
    ///
    /// Shared field-type code reaches domain data through the public API at
    /// this address rather than through the store.
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_public_url() -> String {
    "http://127.0.0.1:3000".to_string()
}

fn default_shutdown_grace() -> u64 {
    10
}
