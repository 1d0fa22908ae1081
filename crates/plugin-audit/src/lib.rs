//! # Plugin Audit
//!
//! A Folio plugin that:
//!
//! - records completed content changes in a bounded in-memory trail,
//!   served at `GET /plugins/audit/recent`
//! - rejects websites whose webhook URL is not HTTP(S)
//! - cancels outbound webhook calls to plain-HTTP targets

pub mod error;
pub mod hooks;
pub mod routes;
pub mod trail;

use std::sync::Arc;

use folio_plugin::loader::OneOrMany;
use folio_plugin::PluginCatalog;

pub use error::AuditError;
pub use trail::{AuditRecord, AuditTrail};

/// Manifest name of both the hooks and the routes plugin.
pub const PLUGIN_NAME: &str = "audit";

/// Adds the audit plugins to a catalog, backed by a fresh trail.
pub fn register(catalog: PluginCatalog) -> PluginCatalog {
    register_with(catalog, Arc::new(AuditTrail::default()))
}

/// Adds the audit plugins to a catalog, recording into `trail`.
pub fn register_with(catalog: PluginCatalog, trail: Arc<AuditTrail>) -> PluginCatalog {
    let hook_trail = trail.clone();
    catalog
        .hooks(PLUGIN_NAME, move |ctx| {
            ctx.logger.info(format!("recording up to {} changes", hook_trail.capacity()));
            Ok(OneOrMany::One(hooks::hook_set(hook_trail.clone())))
        })
        .routes(PLUGIN_NAME, move |_| Ok(OneOrMany::One(routes::registrar(trail.clone()))))
}
