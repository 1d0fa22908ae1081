//! Route plugins.
//!
//! A route plugin contributes a function that adds handlers to a router.
//! Each plugin's routes are mounted under `/plugins/{name}`.

use std::fmt;
use std::sync::Arc;

use axum::Router;
use indexmap::IndexMap;
use tracing::info;

/// Adds a plugin's handlers to the router it is given.
pub type RouteRegistrar = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Wraps a closure as a [`RouteRegistrar`].
pub fn registrar<F>(f: F) -> RouteRegistrar
where
    F: Fn(Router) -> Router + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Route registrars grouped by owning plugin.
#[derive(Default)]
pub struct RouteRegistry {
    mounts: IndexMap<String, Vec<RouteRegistrar>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, owner: &str, registrar: RouteRegistrar) {
        self.mounts.entry(owner.to_string()).or_default().push(registrar);
    }

    /// Plugins with at least one registrar, in load order.
    pub fn owners(&self) -> Vec<&str> {
        self.mounts.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Nests every plugin's routes into `router`.
    pub fn mount(&self, router: Router) -> Router {
        self.mounts.iter().fold(router, |router, (owner, registrars)| {
            let plugin_router = registrars
                .iter()
                .fold(Router::new(), |r, register| register(r));
            let prefix = mount_path(owner);
            info!(plugin = %owner, prefix = %prefix, "Mounting plugin routes");
            router.nest(&prefix, plugin_router)
        })
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("owners", &self.owners())
            .finish()
    }
}

/// URL prefix of a plugin's routes.
pub fn mount_path(owner: &str) -> String {
    format!("/plugins/{owner}")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_routes_mounted_under_plugin_prefix() {
        let mut registry = RouteRegistry::new();
        registry.add("status", registrar(|r| r.route("/ping", get(|| async { "pong" }))));
        registry.add("status", registrar(|r| r.route("/version", get(|| async { "1" }))));

        let app = registry.mount(Router::new());

        let response = app
            .clone()
            .oneshot(Request::get("/plugins/status/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(Request::get("/plugins/status/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
