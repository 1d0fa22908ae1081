//! Hook payloads.
//!
//! Each event carries a typed payload. Payloads are cloned for closure
//! handlers, so anything a handler mutates for the caller (webhook
//! cancellation) is shared through an `Arc`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use folio_core::types::{CollectionId, CollectionInputId, WebsiteId};
use folio_entity::{Collection, CollectionEntryWithData, CollectionInput, Media, Website};

use super::definitions::HookEvent;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsitePayload {
    pub website: Website,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPayload {
    pub collection: Collection,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInputPayload {
    pub input: CollectionInput,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionEntryPayload {
    pub entry: CollectionEntryWithData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaPayload {
    pub media: Media,
}

/// Change of the input whose value titles a collection's entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionTitlePayload {
    pub collection_id: CollectionId,
    pub title_input_id: Option<CollectionInputId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStartPayload {
    /// Address the listener is bound to.
    pub address: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupPayload {
    /// Ids of every registered field type.
    pub field_types: Vec<String>,
}

/// Shared flag a handler sets to stop an outbound webhook call.
#[derive(Debug, Clone, Default)]
pub struct WebhookCancellation(Arc<AtomicBool>);

impl WebhookCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An outbound webhook call that handlers may cancel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteHookCallPayload {
    pub website_id: WebsiteId,
    pub url: String,
    pub body: serde_json::Value,
    #[serde(skip)]
    cancellation: WebhookCancellation,
}

impl WebsiteHookCallPayload {
    pub fn new(website_id: WebsiteId, url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            website_id,
            url: url.into(),
            body,
            cancellation: WebhookCancellation::new(),
        }
    }

    /// Stops the call. Clones of this payload share the flag.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Event plus its payload.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum HookPayload {
    BeforeWebsiteCreate(WebsitePayload),
    AfterWebsiteCreate(WebsitePayload),
    BeforeWebsiteModify(WebsitePayload),
    AfterWebsiteModify(WebsitePayload),
    BeforeWebsiteDelete(WebsitePayload),
    AfterWebsiteDelete(WebsitePayload),

    BeforeCollectionCreate(CollectionPayload),
    AfterCollectionCreate(CollectionPayload),
    BeforeCollectionModify(CollectionPayload),
    AfterCollectionModify(CollectionPayload),
    BeforeCollectionDelete(CollectionPayload),
    AfterCollectionDelete(CollectionPayload),

    BeforeCollectionInputCreate(CollectionInputPayload),
    AfterCollectionInputCreate(CollectionInputPayload),
    BeforeCollectionInputModify(CollectionInputPayload),
    AfterCollectionInputModify(CollectionInputPayload),
    BeforeCollectionInputDelete(CollectionInputPayload),
    AfterCollectionInputDelete(CollectionInputPayload),

    BeforeCollectionEntryCreate(CollectionEntryPayload),
    AfterCollectionEntryCreate(CollectionEntryPayload),
    BeforeCollectionEntryModify(CollectionEntryPayload),
    AfterCollectionEntryModify(CollectionEntryPayload),
    BeforeCollectionEntryDelete(CollectionEntryPayload),
    AfterCollectionEntryDelete(CollectionEntryPayload),

    ServerStart(ServerStartPayload),
    Setup(SetupPayload),

    BeforeMediaCreate(MediaPayload),
    AfterMediaCreate(MediaPayload),
    AfterMediaConfirm(MediaPayload),
    BeforeMediaDelete(MediaPayload),
    AfterMediaDelete(MediaPayload),

    BeforeCollectionTitleModify(CollectionTitlePayload),
    AfterCollectionTitleModify(CollectionTitlePayload),

    BeforeWebsiteHookCalled(WebsiteHookCallPayload),
}

impl HookPayload {
    /// The event this payload is dispatched for.
    pub fn event(&self) -> HookEvent {
        match self {
            Self::BeforeWebsiteCreate(_) => HookEvent::BeforeWebsiteCreate,
            Self::AfterWebsiteCreate(_) => HookEvent::AfterWebsiteCreate,
            Self::BeforeWebsiteModify(_) => HookEvent::BeforeWebsiteModify,
            Self::AfterWebsiteModify(_) => HookEvent::AfterWebsiteModify,
            Self::BeforeWebsiteDelete(_) => HookEvent::BeforeWebsiteDelete,
            Self::AfterWebsiteDelete(_) => HookEvent::AfterWebsiteDelete,
            Self::BeforeCollectionCreate(_) => HookEvent::BeforeCollectionCreate,
            Self::AfterCollectionCreate(_) => HookEvent::AfterCollectionCreate,
            Self::BeforeCollectionModify(_) => HookEvent::BeforeCollectionModify,
            Self::AfterCollectionModify(_) => HookEvent::AfterCollectionModify,
            Self::BeforeCollectionDelete(_) => HookEvent::BeforeCollectionDelete,
            Self::AfterCollectionDelete(_) => HookEvent::AfterCollectionDelete,
            Self::BeforeCollectionInputCreate(_) => HookEvent::BeforeCollectionInputCreate,
            Self::AfterCollectionInputCreate(_) => HookEvent::AfterCollectionInputCreate,
            Self::BeforeCollectionInputModify(_) => HookEvent::BeforeCollectionInputModify,
            Self::AfterCollectionInputModify(_) => HookEvent::AfterCollectionInputModify,
            Self::BeforeCollectionInputDelete(_) => HookEvent::BeforeCollectionInputDelete,
            Self::AfterCollectionInputDelete(_) => HookEvent::AfterCollectionInputDelete,
            Self::BeforeCollectionEntryCreate(_) => HookEvent::BeforeCollectionEntryCreate,
            Self::AfterCollectionEntryCreate(_) => HookEvent::AfterCollectionEntryCreate,
            Self::BeforeCollectionEntryModify(_) => HookEvent::BeforeCollectionEntryModify,
            Self::AfterCollectionEntryModify(_) => HookEvent::AfterCollectionEntryModify,
            Self::BeforeCollectionEntryDelete(_) => HookEvent::BeforeCollectionEntryDelete,
            Self::AfterCollectionEntryDelete(_) => HookEvent::AfterCollectionEntryDelete,
            Self::ServerStart(_) => HookEvent::ServerStart,
            Self::Setup(_) => HookEvent::Setup,
            Self::BeforeMediaCreate(_) => HookEvent::BeforeMediaCreate,
            Self::AfterMediaCreate(_) => HookEvent::AfterMediaCreate,
            Self::AfterMediaConfirm(_) => HookEvent::AfterMediaConfirm,
            Self::BeforeMediaDelete(_) => HookEvent::BeforeMediaDelete,
            Self::AfterMediaDelete(_) => HookEvent::AfterMediaDelete,
            Self::BeforeCollectionTitleModify(_) => HookEvent::BeforeCollectionTitleModify,
            Self::AfterCollectionTitleModify(_) => HookEvent::AfterCollectionTitleModify,
            Self::BeforeWebsiteHookCalled(_) => HookEvent::BeforeWebsiteHookCalled,
        }
    }

    /// The webhook call, for `beforeWebsiteHookCalled` payloads.
    pub fn webhook_call(&self) -> Option<&WebsiteHookCallPayload> {
        match self {
            Self::BeforeWebsiteHookCalled(call) => Some(call),
            _ => None,
        }
    }
}
