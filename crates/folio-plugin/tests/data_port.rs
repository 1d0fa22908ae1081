//! Field types reaching the public API through the loopback data port.

use std::sync::Arc;

use axum::Router;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Json;
use serde_json::{Value, json};

use folio_core::types::{CollectionId, WebsiteId};
use folio_core::{AppError, AppResult};
use folio_plugin::field_types::{ApiUrlBuilder, FieldTypeRegistry, LoopbackDataPort};
use folio_plugin::{ExtensionHost, PluginCatalog, PluginSelection};
use folio_plugin::prelude::*;

/// Stores the id of another entry in the same collection.
#[derive(Debug)]
struct EntryReference;

#[async_trait]
impl FieldType for EntryReference {
    fn id(&self) -> &str {
        "entry-reference"
    }

    fn name(&self) -> &str {
        "Entry reference"
    }

    fn serialize(&self, value: &FieldValue) -> AppResult<String> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AppError::validation("references are strings"))
    }

    fn deserialize(&self, raw: &str) -> AppResult<FieldValue> {
        Ok(FieldValue::String(raw.to_string()))
    }

    async fn validate(&self, raw: &str, _settings: Option<&FieldValue>, ctx: &FieldContext) -> AppResult<()> {
        let entries = ctx.data_port()?.fetch_json("entries").await?;
        let known = entries["entries"]
            .as_array()
            .map(|list| list.iter().any(|e| e["id"] == raw))
            .unwrap_or(false);
        if known {
            Ok(())
        } else {
            Err(AppError::validation(format!("Entry {raw} does not exist")))
        }
    }

    fn render_input(&self, props: &InputProps<'_>) -> RenderedView {
        RenderedView::new("EntryPicker", json!({ "name": props.input_name }))
    }
}

async fn list_entries(
    Path((_website, _collection)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer editor") => Ok(Json(json!({ "entries": [{ "id": "entry-1" }] }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn serve_api() -> String {
    let app = Router::new().route(
        "/api/websites/{website}/collections/{collection}/entries",
        get(list_entries),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{address}")
}

fn context(public_url: &str, authorization: &str) -> FieldContext {
    let ctx = FieldContext::new()
        .with_website(WebsiteId::new())
        .with_collection(CollectionId::new())
        .with_authorization(authorization);
    let base = ApiUrlBuilder::new(public_url).unwrap();
    let port = LoopbackDataPort::for_context(reqwest::Client::new(), &base, &ctx);
    ctx.with_data_port(Arc::new(port))
}

#[tokio::test]
async fn validation_sees_what_the_user_sees() {
    let public_url = serve_api().await;
    let mut registry = FieldTypeRegistry::new();
    registry.register(Arc::new(EntryReference)).unwrap();

    let editor = context(&public_url, "Bearer editor");
    registry
        .validate("entry-reference", "entry-1", None, &editor)
        .await
        .unwrap();

    let err = registry
        .validate("entry-reference", "entry-2", None, &editor)
        .await
        .unwrap_err();
    assert!(err.message.contains("does not exist"));

    let stranger = context(&public_url, "Bearer nobody");
    let err = registry
        .validate("entry-reference", "entry-1", None, &stranger)
        .await
        .unwrap_err();
    assert_eq!(err.kind, folio_core::error::ErrorKind::Authentication);
}

#[tokio::test]
async fn host_attaches_loopback_port() {
    let public_url = serve_api().await;
    let host = ExtensionHost::boot(&PluginCatalog::with_builtin_field_types(), &PluginSelection::default(), None)
        .unwrap()
        .with_loopback(reqwest::Client::new(), &public_url)
        .unwrap();

    let ctx = host.field_context(
        FieldContext::new()
            .with_website(WebsiteId::new())
            .with_collection(CollectionId::new())
            .with_authorization("Bearer editor"),
    );
    let entries = ctx.data_port().unwrap().fetch_json("entries").await.unwrap();
    assert_eq!(entries["entries"][0]["id"], "entry-1");

    let plain = ExtensionHost::boot(&PluginCatalog::with_builtin_field_types(), &PluginSelection::default(), None).unwrap();
    assert!(plain.field_context(FieldContext::new()).data_port().is_err());
    assert!(plain.with_loopback(reqwest::Client::new(), "not a url").is_err());
}
