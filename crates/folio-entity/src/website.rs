//! Website entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::WebsiteId;

/// A website: the top-level tenant owning collections and media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    /// Unique website identifier.
    pub id: WebsiteId,
    /// Display title.
    pub title: String,
    /// Outbound webhook target notified after content changes.
    pub hook_url: Option<String>,
    /// When the website was created.
    pub created_at: DateTime<Utc>,
    /// When the website was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Website {
    /// Create a website record stamped with the current time.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WebsiteId::new(),
            title: title.into(),
            hook_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
