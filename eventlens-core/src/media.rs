//! Media records and their display-time enrichment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a media item is a photo or a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// Kind for a freshly uploaded file, judged by its MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("video") {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }
}

/// A media row as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub event_id: String,
    /// Stored reference to the object (usually its public URL)
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A media row to be inserted after an upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewMedia {
    pub event_id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A media item ready for display.
///
/// Never persisted: signed URLs are recomputed on every listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMedia {
    pub id: String,
    pub event_id: String,
    pub url: String,
    /// Kind after extension-based reclassification
    pub kind: MediaKind,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Time-limited URL of the original; `None` when signing failed
    pub signed_url: Option<String>,
    /// Downscaled preview; always `None` for videos
    pub thumb_url: Option<String>,
    /// Suggested file name when saving the item
    pub download_name: Option<String>,
}
