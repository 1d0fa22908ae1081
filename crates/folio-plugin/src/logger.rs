//! Scoped logger handed to plugins.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::loader::PluginKind;

/// Logger bound to one plugin scope.
///
/// Every record carries a `plugin` field with the scope, so operators can
/// filter a misbehaving plugin's output without the plugin touching the
/// subscriber setup.
#[derive(Clone, PartialEq, Eq)]
pub struct PluginLogger {
    scope: Arc<str>,
}

impl PluginLogger {
    /// Creates a logger with an explicit scope.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: Arc::from(scope.into()),
        }
    }

    /// Creates the `{kind}/{name}` logger used while a plugin loads.
    pub fn for_plugin(kind: PluginKind, name: &str) -> Self {
        Self::new(format!("{}/{}", kind.as_str(), name))
    }

    /// Returns the scope this logger is bound to.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn debug(&self, message: impl fmt::Display) {
        debug!(plugin = %self.scope, "{}", message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        info!(plugin = %self.scope, "{}", message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        warn!(plugin = %self.scope, "{}", message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        error!(plugin = %self.scope, "{}", message);
    }
}

impl fmt::Debug for PluginLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PluginLogger").field(&self.scope).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_scope_format() {
        let logger = PluginLogger::for_plugin(PluginKind::FieldTypes, "checkbox");
        assert_eq!(logger.scope(), "fieldTypes/checkbox");
        assert_eq!(PluginLogger::new("audit").scope(), "audit");
    }
}
