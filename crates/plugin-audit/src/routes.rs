//! HTTP routes of the audit plugin.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use folio_plugin::routes::{RouteRegistrar, registrar as route_registrar};

use crate::trail::{AuditRecord, AuditTrail};

const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// Adds `GET /recent`.
pub fn registrar(trail: Arc<AuditTrail>) -> RouteRegistrar {
    route_registrar(move |router: Router| {
        router.merge(
            Router::new()
                .route("/recent", get(recent))
                .with_state(trail.clone()),
        )
    })
}

async fn recent(State(trail): State<Arc<AuditTrail>>, Query(query): Query<RecentQuery>) -> Json<Vec<AuditRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(trail.capacity());
    Json(trail.recent(limit))
}
