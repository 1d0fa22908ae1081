//! Plugin system configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Plugin manifest configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Path to the operator plugin manifest (TOML).
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
        }
    }
}

/// Hook dispatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Per-handler time limit in seconds. Unset means handlers may run
    /// indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl HookConfig {
    /// Per-handler time limit, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

fn default_manifest() -> String {
    "config/plugins.toml".to_string()
}
