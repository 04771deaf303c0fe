//! Turning stored media rows into displayable gallery items.
//!
//! Every stored reference is exchanged for a time-limited signed URL, and
//! photos additionally get a downscaled preview. Items are signed
//! concurrently but the listing only completes once all of them are done,
//! in the order the backend returned them (newest first).

use futures::future::join_all;

use crate::backend::{Backend, ImageTransform};
use crate::config::EventLensConfig;
use crate::error::EventLensResult;
use crate::media::{Media, MediaKind, ResolvedMedia};
use crate::storage_path;

/// Signs media for one bucket.
#[derive(Debug, Clone)]
pub struct MediaResolver {
    bucket: String,
    public_prefix: String,
    expires_in_secs: u64,
    thumbnail: ImageTransform,
}

impl MediaResolver {
    pub fn new(
        bucket: impl Into<String>,
        public_prefix: impl Into<String>,
        expires_in_secs: u64,
        thumbnail: ImageTransform,
    ) -> Self {
        MediaResolver {
            bucket: bucket.into(),
            public_prefix: public_prefix.into(),
            expires_in_secs,
            thumbnail,
        }
    }

    pub fn from_config(config: &EventLensConfig) -> Self {
        MediaResolver::new(
            config.backend.bucket.clone(),
            config.backend.public_prefix(),
            config.media.signed_url_expiry_secs,
            config.media.thumbnail,
        )
    }

    /// All media of an event, signed and ready for display.
    ///
    /// Only a failure to list the rows fails the call; signing failures
    /// leave the affected URL empty.
    pub async fn list_media(
        &self,
        backend: &dyn Backend,
        event_id: &str,
    ) -> EventLensResult<Vec<ResolvedMedia>> {
        let records = backend.list_media_records(event_id).await?;
        tracing::debug!(event_id, count = records.len(), "resolving media");

        let resolved = join_all(records.into_iter().map(|m| self.resolve(backend, m))).await;

        Ok(resolved)
    }

    /// Sign a single item.
    pub async fn resolve(&self, backend: &dyn Backend, media: Media) -> ResolvedMedia {
        let path = storage_path::relative_path(&media.url, &self.public_prefix, &self.bucket);
        let kind = storage_path::classify(&path, media.kind);

        let original = self.sign(backend, &path, None);
        let (signed_url, thumb_url) = match kind {
            MediaKind::Photo => {
                let preview = self.sign(backend, &path, Some(self.thumbnail));
                futures::join!(original, preview)
            }
            MediaKind::Video => (original.await, None),
        };

        let download_name = signed_url
            .as_deref()
            .map(|url| storage_path::download_name(media.description.as_deref(), url));

        ResolvedMedia {
            id: media.id,
            event_id: media.event_id,
            url: media.url,
            kind,
            description: media.description,
            created_at: media.created_at,
            signed_url,
            thumb_url,
            download_name,
        }
    }

    async fn sign(
        &self,
        backend: &dyn Backend,
        path: &str,
        transform: Option<ImageTransform>,
    ) -> Option<String> {
        match backend
            .create_signed_url(path, self.expires_in_secs, transform)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(path, preview = transform.is_some(), error = %e, "could not sign media URL");
                None
            }
        }
    }
}
