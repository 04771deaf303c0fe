//! In-memory backend for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{Backend, ImageTransform};
use crate::error::{EventLensError, EventLensResult};
use crate::event::Event;
use crate::media::{Media, NewMedia};

#[derive(Default)]
pub struct FakeBackend {
    events: Vec<(Event, String)>,
    media: Vec<Media>,
    fail_password_checks: bool,
    fail_listing: bool,
    fail_upload: bool,
    fail_signing: HashSet<String>,
    sign_delays: HashMap<String, Duration>,
    password_checks: AtomicUsize,
    pub signed: Mutex<Vec<(String, Option<ImageTransform>)>>,
    pub uploaded: Mutex<Vec<(String, usize, String)>>,
    pub inserted: Mutex<Vec<NewMedia>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, slug: &str, id: &str, password: &str) -> Self {
        let event = Event {
            id: id.to_string(),
            slug: slug.to_string(),
            name: format!("Event {slug}"),
            description: None,
            event_date: None,
        };
        self.events.push((event, password.to_string()));
        self
    }

    /// Media rows are returned in insertion order, so add newest first.
    pub fn with_media(mut self, media: Media) -> Self {
        self.media.push(media);
        self
    }

    pub fn failing_password_checks(mut self) -> Self {
        self.fail_password_checks = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_signing_for(mut self, path: &str) -> Self {
        self.fail_signing.insert(path.to_string());
        self
    }

    pub fn delay_signing(mut self, path: &str, delay: Duration) -> Self {
        self.sign_delays.insert(path.to_string(), delay);
        self
    }

    pub fn password_checks(&self) -> usize {
        self.password_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn event_by_slug(&self, slug: &str) -> EventLensResult<Event> {
        self.events
            .iter()
            .find(|(event, _)| event.slug == slug)
            .map(|(event, _)| event.clone())
            .ok_or_else(|| EventLensError::EventNotFound(slug.to_string()))
    }

    async fn validate_password(&self, slug: &str, password: &str) -> EventLensResult<bool> {
        self.password_checks.fetch_add(1, Ordering::SeqCst);

        if self.fail_password_checks {
            return Err(EventLensError::Transient("connection reset".into()));
        }

        Ok(self
            .events
            .iter()
            .any(|(event, pw)| event.slug == slug && pw == password))
    }

    async fn list_media_records(&self, event_id: &str) -> EventLensResult<Vec<Media>> {
        if self.fail_listing {
            return Err(EventLensError::Transient("database unavailable".into()));
        }

        Ok(self
            .media
            .iter()
            .filter(|m| m.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
        transform: Option<ImageTransform>,
    ) -> EventLensResult<String> {
        if let Some(delay) = self.sign_delays.get(path) {
            tokio::time::sleep(*delay).await;
        }

        self.signed
            .lock()
            .unwrap()
            .push((path.to_string(), transform));

        if self.fail_signing.contains(path) {
            return Err(EventLensError::Signing(format!("object not found: {path}")));
        }

        Ok(match transform {
            Some(t) => format!(
                "https://cdn.test/render/{path}?token=t&expires={expires_in_secs}&width={}&quality={}",
                t.width, t.quality
            ),
            None => format!("https://cdn.test/sign/{path}?token=t&expires={expires_in_secs}"),
        })
    }

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> EventLensResult<String> {
        if self.fail_upload {
            return Err(EventLensError::Upload("bucket is full".into()));
        }

        self.uploaded
            .lock()
            .unwrap()
            .push((path.to_string(), bytes.len(), content_type.to_string()));

        Ok(format!(
            "https://abc.supabase.co/storage/v1/object/public/event-media/{path}"
        ))
    }

    async fn insert_media(&self, media: &NewMedia) -> EventLensResult<()> {
        self.inserted.lock().unwrap().push(media.clone());
        Ok(())
    }
}
