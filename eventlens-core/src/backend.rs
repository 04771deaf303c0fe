//! The backend seam.
//!
//! Persistence, password verification and object storage all live in a
//! remote backend. Core only talks to it through this trait, so the server
//! can run against the hosted backend or an in-memory fake in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EventLensResult;
use crate::event::Event;
use crate::media::{Media, NewMedia};

/// Image transform applied when signing a preview URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTransform {
    pub width: u32,
    pub quality: u8,
}

impl Default for ImageTransform {
    fn default() -> Self {
        ImageTransform {
            width: 400,
            quality: 60,
        }
    }
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up an event by slug.
    ///
    /// Returns `EventNotFound` when no event has this slug.
    async fn event_by_slug(&self, slug: &str) -> EventLensResult<Event>;

    /// Ask the backend whether `password` unlocks the event.
    ///
    /// `Ok(false)` is a definitive "wrong password"; transport failures are
    /// reported as `Transient` errors instead.
    async fn validate_password(&self, slug: &str, password: &str) -> EventLensResult<bool>;

    /// Media rows of an event, newest `created_at` first.
    async fn list_media_records(&self, event_id: &str) -> EventLensResult<Vec<Media>>;

    /// Create a time-limited URL for an object path inside the media bucket.
    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
        transform: Option<ImageTransform>,
    ) -> EventLensResult<String>;

    /// Store an object and return its public URL.
    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> EventLensResult<String>;

    /// Record a media row.
    async fn insert_media(&self, media: &NewMedia) -> EventLensResult<()>;
}
