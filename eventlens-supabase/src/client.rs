use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use eventlens_core::config::BackendConfig;
use eventlens_core::{
    Backend, Event, EventLensError, EventLensResult, ImageTransform, Media, NewMedia,
};

const EVENT_COLUMNS: &str = "id,name,slug,description,event_date";
const VALIDATE_PASSWORD_RPC: &str = "validate_event_password";

/// HTTP client for one Supabase project and media bucket.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base: Url,
    anon_key: String,
    bucket: String,
    public_prefix: String,
}

#[derive(Serialize)]
struct ValidatePasswordParams<'a> {
    p_slug: &'a str,
    p_password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignRequest {
    expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<ImageTransform>,
}

#[derive(Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> EventLensResult<Self> {
        let base = Url::parse(config.url.trim_end_matches('/'))
            .map_err(|e| EventLensError::Config(format!("Invalid backend.url: {e}")))?;

        if base.cannot_be_a_base() {
            return Err(EventLensError::Config(format!(
                "Invalid backend.url: {}",
                config.url
            )));
        }

        Ok(SupabaseClient {
            http: reqwest::Client::new(),
            base,
            anon_key: config.anon_key.clone(),
            bucket: config.bucket.clone(),
            public_prefix: config.public_prefix(),
        })
    }

    /// `<base>/<segments...>`, each segment percent-encoded.
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn storage_endpoint(&self, action: &[&str], path: &str) -> Url {
        let segments = ["storage", "v1", "object"]
            .into_iter()
            .chain(action.iter().copied())
            .chain([self.bucket.as_str()])
            .chain(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(segments)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> EventLensResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| EventLensError::Transient(format!("Failed to {what}: {e}")))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::debug!(%status, body = %error_text, "backend request failed");

        Err(EventLensError::Transient(format!(
            "Failed to {what}: {status} {error_text}"
        )))
    }

    async fn json<T: serde::de::DeserializeOwned>(
        response: Response,
        what: &str,
    ) -> EventLensResult<T> {
        response
            .json()
            .await
            .map_err(|e| EventLensError::Serialization(format!("Failed to parse {what}: {e}")))
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn event_by_slug(&self, slug: &str) -> EventLensResult<Event> {
        let request = self
            .http
            .get(self.endpoint(["rest", "v1", "events"]))
            .query(&[
                ("select", EVENT_COLUMNS.to_string()),
                ("slug", format!("eq.{slug}")),
                ("limit", "1".to_string()),
            ]);

        let response = self.send(request, "fetch event").await?;
        let events: Vec<Event> = Self::json(response, "event").await?;

        events
            .into_iter()
            .next()
            .ok_or_else(|| EventLensError::EventNotFound(slug.to_string()))
    }

    async fn validate_password(&self, slug: &str, password: &str) -> EventLensResult<bool> {
        let request = self
            .http
            .post(self.endpoint(["rest", "v1", "rpc", VALIDATE_PASSWORD_RPC]))
            .json(&ValidatePasswordParams {
                p_slug: slug,
                p_password: password,
            });

        let response = self.send(request, "validate password").await?;
        // The RPC answers with a bare JSON boolean; null means no such event.
        let valid: Option<bool> = Self::json(response, "password check").await?;

        Ok(valid.unwrap_or(false))
    }

    async fn list_media_records(&self, event_id: &str) -> EventLensResult<Vec<Media>> {
        let request = self
            .http
            .get(self.endpoint(["rest", "v1", "media"]))
            .query(&[
                ("select", "*".to_string()),
                ("event_id", format!("eq.{event_id}")),
                ("order", "created_at.desc".to_string()),
            ]);

        let response = self.send(request, "list media").await?;
        Self::json(response, "media").await
    }

    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
        transform: Option<ImageTransform>,
    ) -> EventLensResult<String> {
        let request = self
            .http
            .post(self.storage_endpoint(&["sign"], path))
            .json(&SignRequest {
                expires_in: expires_in_secs,
                transform,
            });

        let response = self
            .send(request, "sign URL")
            .await
            .map_err(|e| EventLensError::Signing(e.to_string()))?;
        let signed: SignResponse = Self::json(response, "signed URL").await?;

        // signedURL is relative to <base>/storage/v1
        let storage_root = self.endpoint(["storage", "v1"]);
        Ok(format!(
            "{}{}",
            storage_root.as_str().trim_end_matches('/'),
            signed.signed_url
        ))
    }

    async fn upload_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> EventLensResult<String> {
        let request = self
            .http
            .post(self.storage_endpoint(&[], path))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes);

        self.send(request, "upload file")
            .await
            .map_err(|e| EventLensError::Upload(e.to_string()))?;
        tracing::debug!(path, "object stored");

        Ok(format!("{}{}", self.public_prefix, path))
    }

    async fn insert_media(&self, media: &NewMedia) -> EventLensResult<()> {
        let request = self
            .http
            .post(self.endpoint(["rest", "v1", "media"]))
            .header("Prefer", "return=minimal")
            .json(&[media]);

        self.send(request, "save media").await?;
        Ok(())
    }
}
