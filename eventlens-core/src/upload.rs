//! Guest uploads.

use chrono::Utc;

use crate::backend::Backend;
use crate::error::{EventLensError, EventLensResult};
use crate::event::Event;
use crate::media::{MediaKind, NewMedia};

/// A file sent by a guest.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub description: Option<String>,
}

/// Extension of an uploaded file name, `bin` when it has none.
pub fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && !ext.contains('/') => ext.to_ascii_lowercase(),
        _ => "bin".to_string(),
    }
}

/// Object path for a new upload: `<slug>/<unix-millis>.<ext>`
pub fn object_path(slug: &str, file_name: &str, unix_millis: i64) -> String {
    format!("{slug}/{unix_millis}.{}", file_extension(file_name))
}

/// Store the file and record it as media of `event`.
///
/// Nothing is recorded when the object upload fails.
pub async fn upload_media(
    backend: &dyn Backend,
    event: &Event,
    request: UploadRequest,
) -> EventLensResult<NewMedia> {
    if request.bytes.is_empty() {
        return Err(EventLensError::InvalidInput("no file selected".into()));
    }

    let path = object_path(&event.slug, &request.file_name, Utc::now().timestamp_millis());
    let kind = MediaKind::from_content_type(&request.content_type);
    let size = request.bytes.len();

    let url = backend
        .upload_object(&path, request.bytes, &request.content_type)
        .await
        .map_err(|e| match e {
            EventLensError::Upload(msg) => EventLensError::Upload(msg),
            other => EventLensError::Upload(other.to_string()),
        })?;

    let media = NewMedia {
        event_id: event.id.clone(),
        url,
        kind,
        description: request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };

    backend
        .insert_media(&media)
        .await
        .map_err(|e| EventLensError::Upload(e.to_string()))?;

    tracing::info!(slug = %event.slug, path = %path, size, ?kind, "media uploaded");

    Ok(media)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    fn event() -> Event {
        Event {
            id: "e1".into(),
            slug: "wedding-2024".into(),
            name: "Wedding".into(),
            description: None,
            event_date: None,
        }
    }

    fn request(file_name: &str, content_type: &str) -> UploadRequest {
        UploadRequest {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: vec![1, 2, 3],
            description: Some("  Cake  ".into()),
        }
    }

    #[test]
    fn test_object_path() {
        assert_eq!(
            object_path("party", "IMG_0001.JPG", 1718000000000),
            "party/1718000000000.jpg"
        );
        assert_eq!(object_path("party", "noext", 1), "party/1.bin");
        assert_eq!(object_path("party", "trailing.", 1), "party/1.bin");
    }

    #[tokio::test]
    async fn test_upload_records_media() {
        let backend = FakeBackend::new();

        let media = upload_media(&backend, &event(), request("clip.mp4", "video/mp4"))
            .await
            .unwrap();

        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.event_id, "e1");
        assert_eq!(media.description.as_deref(), Some("Cake"));
        assert!(
            media
                .url
                .starts_with("https://abc.supabase.co/storage/v1/object/public/event-media/wedding-2024/")
        );
        assert!(media.url.ends_with(".mp4"));

        let uploaded = backend.uploaded.lock().unwrap();
        assert_eq!(uploaded.len(), 1);
        assert_eq!(uploaded[0].1, 3);
        assert_eq!(uploaded[0].2, "video/mp4");
        assert_eq!(backend.inserted.lock().unwrap().as_slice(), &[media.clone()]);
    }

    #[tokio::test]
    async fn test_failed_upload_records_nothing() {
        let backend = FakeBackend::new().failing_upload();

        let err = upload_media(&backend, &event(), request("a.jpg", "image/jpeg"))
            .await
            .unwrap_err();

        assert!(matches!(err, EventLensError::Upload(_)));
        assert!(backend.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected() {
        let backend = FakeBackend::new();
        let mut req = request("a.jpg", "image/jpeg");
        req.bytes.clear();

        let err = upload_media(&backend, &event(), req).await.unwrap_err();

        assert!(matches!(err, EventLensError::InvalidInput(_)));
        assert!(backend.uploaded.lock().unwrap().is_empty());
    }
}
