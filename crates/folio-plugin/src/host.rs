//! Extension host: boots plugins and owns the resulting registries.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::info;

use folio_core::{AppError, AppResult};

use crate::field_types::{ApiUrlBuilder, FieldContext, FieldTypeRegistry, LoopbackDataPort};
use crate::hooks::{DispatchReport, HookDispatcher, HookPayload, HookRegistry, SetupPayload};
use crate::loader::{self, LoadSummary, PluginCatalog, PluginKind, PluginSelection};
use crate::routes::RouteRegistry;

/// Frozen field-type, hook, and route registries.
///
/// Built once by [`ExtensionHost::boot`]; cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct ExtensionHost {
    field_types: Arc<FieldTypeRegistry>,
    dispatcher: Arc<HookDispatcher>,
    routes: Arc<RouteRegistry>,
    summaries: Vec<LoadSummary>,
    loopback: Option<Loopback>,
}

/// Client and base URL for field types' loopback data access.
#[derive(Debug, Clone)]
struct Loopback {
    client: reqwest::Client,
    base: ApiUrlBuilder,
}

impl ExtensionHost {
    /// Loads field types, then hooks, then routes.
    pub fn boot(
        catalog: &PluginCatalog,
        selection: &PluginSelection,
        hook_timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let mut field_types = FieldTypeRegistry::new();
        let field_summary = loader::load(
            catalog.field_type_manifest(selection.names(PluginKind::FieldTypes))?,
            PluginKind::FieldTypes,
            |_, field_type| field_types.register(field_type).map_err(AppError::from),
        )?;

        let mut hooks = HookRegistry::new();
        let hook_summary = loader::load(
            catalog.hook_manifest(selection.names(PluginKind::Hooks))?,
            PluginKind::Hooks,
            |plugin, set| {
                hooks.subscribe_set(set, &plugin.name);
                Ok(())
            },
        )?;

        let mut routes = RouteRegistry::new();
        let route_summary = loader::load(
            catalog.route_manifest(selection.names(PluginKind::Routes))?,
            PluginKind::Routes,
            |plugin, registrar| {
                routes.add(&plugin.name, registrar);
                Ok(())
            },
        )?;

        info!(
            field_types = field_types.len(),
            hook_subscriptions = hooks.len(),
            route_plugins = routes.owners().len(),
            "Extension host ready"
        );

        let mut host = Self::from_parts(field_types, hooks, routes, hook_timeout);
        host.summaries = vec![field_summary, hook_summary, route_summary];
        Ok(host)
    }

    /// Assembles a host from registries filled elsewhere.
    pub fn from_parts(
        field_types: FieldTypeRegistry,
        hooks: HookRegistry,
        routes: RouteRegistry,
        hook_timeout: Option<Duration>,
    ) -> Self {
        Self {
            field_types: Arc::new(field_types),
            dispatcher: Arc::new(HookDispatcher::new(Arc::new(hooks)).with_timeout(hook_timeout)),
            routes: Arc::new(routes),
            summaries: Vec::new(),
            loopback: None,
        }
    }

    /// Lets field types reach the public API at `public_url`.
    pub fn with_loopback(mut self, client: reqwest::Client, public_url: &str) -> AppResult<Self> {
        let base = ApiUrlBuilder::new(public_url)?;
        info!(public_url = %public_url, "Field-type loopback data access enabled");
        self.loopback = Some(Loopback { client, base });
        Ok(self)
    }

    /// Attaches a loopback data port scoped to `ctx`, when one is configured.
    pub fn field_context(&self, ctx: FieldContext) -> FieldContext {
        match &self.loopback {
            Some(loopback) => {
                let port = LoopbackDataPort::for_context(loopback.client.clone(), &loopback.base, &ctx);
                ctx.with_data_port(Arc::new(port))
            }
            None => ctx,
        }
    }

    pub fn field_types(&self) -> &Arc<FieldTypeRegistry> {
        &self.field_types
    }

    pub fn dispatcher(&self) -> &Arc<HookDispatcher> {
        &self.dispatcher
    }

    pub fn routes(&self) -> &Arc<RouteRegistry> {
        &self.routes
    }

    /// Per-kind load results from [`boot`](Self::boot).
    pub fn summaries(&self) -> &[LoadSummary] {
        &self.summaries
    }

    /// Dispatches a hook event.
    pub async fn dispatch(&self, payload: &HookPayload) -> AppResult<DispatchReport> {
        self.dispatcher.dispatch(payload).await
    }

    /// Fires `setup` with the registered field types.
    pub async fn setup(&self) -> AppResult<DispatchReport> {
        let field_types = self
            .field_types
            .ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        self.dispatch(&HookPayload::Setup(SetupPayload { field_types }))
            .await
    }

    /// Mounts plugin routes onto the application router.
    pub fn mount_routes(&self, router: Router) -> Router {
        self.routes.mount(router)
    }
}
