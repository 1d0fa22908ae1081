//! Folio server
//!
//! Main entry point that wires the extension core together and starts the
//! HTTP listener.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use folio_core::config::AppConfig;
use folio_core::error::AppError;
use folio_database::DatabasePool;
use folio_plugin::hooks::ServerStartPayload;
use folio_plugin::{ExtensionHost, HookPayload, PluginCatalog, PluginSelection};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("FOLIO_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&config_path, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Plugins compiled into the server.
fn plugin_catalog() -> PluginCatalog {
    plugin_audit::register(PluginCatalog::with_builtin_field_types())
}

/// HTTP client field types use to call back into the public API.
fn loopback_client() -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build loopback client: {e}")))
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    let report = folio_database::run_migrations(db.pool(), &config.migrations).await?;
    if let Some(state) = report.bootstrapped {
        tracing::info!(?state, cursor = %report.cursor_after, "Migration cursor initialised");
    }

    // ── Step 2: Plugins ──────────────────────────────────────────
    let selection = PluginSelection::load(&config.plugins.manifest)?;
    let host = ExtensionHost::boot(&plugin_catalog(), &selection, config.hooks.timeout())?
        .with_loopback(loopback_client()?, &config.server.public_url)?;
    host.setup().await?;

    // ── Step 3: Router ───────────────────────────────────────────
    let health_db = db.clone();
    let app = host
        .mount_routes(Router::new().route(
            "/health",
            get(move || {
                let db = health_db.clone();
                async move {
                    match db.ping().await {
                        Ok(latency) => {
                            (StatusCode::OK, format!("ok ({}ms)", latency.as_millis()))
                        }
                        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.message),
                    }
                }
            }),
        ))
        .layer(TraceLayer::new_for_http());

    // ── Step 4: Listen ───────────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    let bound: SocketAddr = listener.local_addr()?;
    tracing::info!("Folio server listening on {}", bound);

    host.dispatch(&HookPayload::ServerStart(ServerStartPayload {
        address: bound.to_string(),
        started_at: chrono::Utc::now(),
    }))
    .await?;

    // ── Step 5: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, db.close()).await.is_err() {
        tracing::warn!("Database pool did not close within {:?}", grace);
    }

    tracing::info!("Folio server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
