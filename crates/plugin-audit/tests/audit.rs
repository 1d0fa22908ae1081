//! The audit plugin booted through the extension host.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;
use tower::ServiceExt;

use folio_core::error::ErrorKind;
use folio_entity::{CollectionEntryWithData, Website};
use folio_plugin::hooks::{CollectionEntryPayload, WebsiteHookCallPayload, WebsitePayload};
use folio_plugin::{ExtensionHost, HookPayload, PluginCatalog, PluginSelection};
use plugin_audit::{AuditTrail, register_with};

fn boot(trail: Arc<AuditTrail>) -> ExtensionHost {
    let catalog = register_with(PluginCatalog::with_builtin_field_types(), trail);
    let selection = PluginSelection {
        hooks: vec!["audit".to_string()],
        routes: vec!["audit".to_string()],
        ..PluginSelection::default()
    };
    ExtensionHost::boot(&catalog, &selection, None).unwrap()
}

#[tokio::test]
async fn records_changes_and_serves_them() {
    let trail = Arc::new(AuditTrail::with_capacity(10));
    let host = boot(trail.clone());

    let website = Website::new("Portfolio");
    host.dispatch(&HookPayload::AfterWebsiteCreate(WebsitePayload {
        website: website.clone(),
    }))
    .await
    .unwrap();
    let entry = CollectionEntryWithData::new(folio_core::types::CollectionId::new());
    host.dispatch(&HookPayload::AfterCollectionEntryCreate(CollectionEntryPayload {
        entry: entry.clone(),
    }))
    .await
    .unwrap();
    assert_eq!(trail.len(), 2);

    let app = host.mount_routes(Router::new());
    let response = app
        .oneshot(
            Request::get("/plugins/audit/recent?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let records: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(records[0]["event"], "afterCollectionEntryCreate");
    assert_eq!(records[0]["subject"], format!("entry:{}", entry.entry.id));
    assert_eq!(records[1]["subject"], format!("website:{}", website.id));
}

#[tokio::test]
async fn rejects_non_http_webhook_urls() {
    let host = boot(Arc::new(AuditTrail::default()));

    let mut website = Website::new("Docs");
    website.hook_url = Some("ftp://deploy.example/build".to_string());
    let err = host
        .dispatch(&HookPayload::BeforeWebsiteCreate(WebsitePayload {
            website: website.clone(),
        }))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(err.message.contains("ftp://deploy.example/build"));
    assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

    website.hook_url = Some("https://exa mple.com/build".to_string());
    let err = host
        .dispatch(&HookPayload::BeforeWebsiteCreate(WebsitePayload {
            website: website.clone(),
        }))
        .await
        .unwrap_err();
    assert!(err.message.contains("not a valid URL"));

    website.hook_url = Some("https://deploy.example/build".to_string());
    host.dispatch(&HookPayload::BeforeWebsiteModify(WebsitePayload { website }))
        .await
        .unwrap();
}

#[tokio::test]
async fn cancels_plain_http_webhook_calls() {
    let host = boot(Arc::new(AuditTrail::default()));
    let website = Website::new("Docs");

    let insecure = HookPayload::BeforeWebsiteHookCalled(WebsiteHookCallPayload::new(
        website.id,
        "http://deploy.example/build",
        serde_json::json!({}),
    ));
    assert!(host.dispatch(&insecure).await.unwrap().cancelled);

    let secure = HookPayload::BeforeWebsiteHookCalled(WebsiteHookCallPayload::new(
        website.id,
        "https://deploy.example/build",
        serde_json::json!({}),
    ));
    assert!(!host.dispatch(&secure).await.unwrap().cancelled);

    let shouting = HookPayload::BeforeWebsiteHookCalled(WebsiteHookCallPayload::new(
        website.id,
        "HTTPS://deploy.example/build",
        serde_json::json!({}),
    ));
    assert!(!host.dispatch(&shouting).await.unwrap().cancelled);

    let garbled = HookPayload::BeforeWebsiteHookCalled(WebsiteHookCallPayload::new(
        website.id,
        "https://",
        serde_json::json!({}),
    ));
    assert!(host.dispatch(&garbled).await.unwrap().cancelled);
}
