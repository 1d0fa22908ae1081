//! Collection entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{CollectionId, CollectionInputId, WebsiteId};

/// A collection of entries sharing one set of inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Unique collection identifier.
    pub id: CollectionId,
    /// Owning website.
    pub website_id: WebsiteId,
    /// Display title.
    pub title: String,
    /// Input whose value is used as each entry's title.
    pub title_input_id: Option<CollectionInputId>,
    /// When the collection was created.
    pub created_at: DateTime<Utc>,
    /// When the collection was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Create a collection record stamped with the current time.
    pub fn new(website_id: WebsiteId, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CollectionId::new(),
            website_id,
            title: title.into(),
            title_input_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
