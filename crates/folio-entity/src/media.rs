//! Media entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{MediaId, WebsiteId};

/// An uploaded media object.
///
/// Uploads are two-phase: the record is created first, and `confirmed`
/// flips once the object store acknowledges the bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    /// Unique media identifier.
    pub id: MediaId,
    /// Owning website.
    pub website_id: WebsiteId,
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the uploader.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Whether the upload has been confirmed.
    pub confirmed: bool,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Media {
    /// Create an unconfirmed media record.
    pub fn new(
        website_id: WebsiteId,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: i64,
    ) -> Self {
        Self {
            id: MediaId::new(),
            website_id,
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            confirmed: false,
            created_at: Utc::now(),
        }
    }
}
