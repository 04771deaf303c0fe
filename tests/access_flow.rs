use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use eventlens::{AppState, app};
use eventlens_core::{
    Backend, Event, EventLensConfig, EventLensError, EventLensResult, ImageTransform, Media,
    MediaKind, NewMedia,
};

const PREFIX: &str = "https://abc.supabase.co/storage/v1/object/public/event-media/";

#[derive(Default)]
struct StubBackend {
    backend_down: bool,
    inserted: Mutex<Vec<NewMedia>>,
}

#[async_trait]
impl Backend for StubBackend {
    async fn event_by_slug(&self, slug: &str) -> EventLensResult<Event> {
        if slug != "wedding-2024" {
            return Err(EventLensError::EventNotFound(slug.to_string()));
        }
        Ok(Event {
            id: "e1".into(),
            slug: slug.into(),
            name: "Anna & Marco".into(),
            description: None,
            event_date: None,
        })
    }

    async fn validate_password(&self, slug: &str, password: &str) -> EventLensResult<bool> {
        if self.backend_down {
            return Err(EventLensError::Transient("rpc timeout".into()));
        }
        Ok(slug == "wedding-2024" && password == "s3cret")
    }

    async fn list_media_records(&self, event_id: &str) -> EventLensResult<Vec<Media>> {
        let row = |id: &str, file: &str, kind, hour| Media {
            id: id.into(),
            event_id: event_id.into(),
            url: format!("{PREFIX}wedding-2024/{file}"),
            kind,
            description: None,
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 15, hour, 0, 0).unwrap()),
        };

        Ok(vec![
            row("t3", "3.jpg", MediaKind::Photo, 20),
            row("t2", "2.mp4", MediaKind::Photo, 19),
            row("t1", "1.png", MediaKind::Photo, 18),
        ])
    }

    async fn create_signed_url(
        &self,
        path: &str,
        _expires_in_secs: u64,
        transform: Option<ImageTransform>,
    ) -> EventLensResult<String> {
        if path.ends_with("1.png") && transform.is_none() {
            return Err(EventLensError::Signing("object missing".into()));
        }
        Ok(match transform {
            Some(t) => format!("https://cdn.test/render/{path}?width={}", t.width),
            None => format!("https://cdn.test/sign/{path}"),
        })
    }

    async fn upload_object(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> EventLensResult<String> {
        Ok(format!("{PREFIX}{path}"))
    }

    async fn insert_media(&self, media: &NewMedia) -> EventLensResult<()> {
        self.inserted.lock().unwrap().push(media.clone());
        Ok(())
    }
}

fn config() -> EventLensConfig {
    let mut config = EventLensConfig::default();
    config.backend.url = "https://abc.supabase.co".into();
    config.backend.anon_key = "anon".into();
    config
}

fn router_with(backend: Arc<StubBackend>, config: &EventLensConfig) -> Router {
    app(AppState::new(config, backend))
}

fn raw_set_cookie(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn router() -> Router {
    router_with(Arc::new(StubBackend::default()), &config())
}

async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn submit_password(slug: &str, password: &str) -> Request<Body> {
    Request::post(format!("/{slug}/access"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}")))
        .unwrap()
}

fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn session_cookie(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    set_cookie.split(';').next().unwrap().to_string()
}

async fn json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn unlock(router: &Router) -> String {
    let response = send(router, submit_password("wedding-2024", "s3cret")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/wedding-2024/gallery");
    session_cookie(&response)
}

#[tokio::test]
async fn test_locked_gallery_redirects_once_to_access() {
    let router = router();

    let response = send(&router, get("/wedding-2024/gallery", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/wedding-2024/access");

    // The access page itself is never gated
    let response = send(&router, get("/wedding-2024/access", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(body["event"]["name"], "Anna & Marco");
    assert!(body["event"].get("id").is_none());
}

#[tokio::test]
async fn test_wrong_password_keeps_event_locked() {
    let router = router();

    let response = send(&router, submit_password("wedding-2024", "guess")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    let body = json(response).await;
    assert_eq!(body["error"], "Incorrect password. Please try again.");

    let response = send(&router, get("/wedding-2024/gallery", None)).await;
    assert_eq!(location(&response), "/wedding-2024/access");
}

#[tokio::test]
async fn test_empty_password_is_rejected() {
    let router = router();

    let response = send(&router, submit_password("wedding-2024", "")).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_correct_password_opens_gallery() {
    let router = router();
    let cookie = unlock(&router).await;

    let response = send(&router, get("/wedding-2024/gallery", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let media = body["media"].as_array().unwrap();
    let ids: Vec<_> = media.iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["t3", "t2", "t1"]);

    // Stored as photo, reclassified by extension
    assert_eq!(media[1]["kind"], "video");
    assert!(media[1]["thumb_url"].is_null());
    assert_eq!(media[0]["thumb_url"], "https://cdn.test/render/wedding-2024/3.jpg?width=400");

    // Failed signing degrades to null without hiding the item
    assert!(media[2]["signed_url"].is_null());
}

#[tokio::test]
async fn test_unlock_does_not_leak_to_other_visitors() {
    let router = router();
    let _cookie = unlock(&router).await;

    let response = send(&router, get("/wedding-2024/gallery", None)).await;

    assert_eq!(location(&response), "/wedding-2024/access");
}

#[tokio::test]
async fn test_landing_and_access_follow_unlock_state() {
    let router = router();

    let response = send(&router, get("/wedding-2024", None)).await;
    assert_eq!(location(&response), "/wedding-2024/access");

    let cookie = unlock(&router).await;

    let response = send(&router, get("/wedding-2024", Some(&cookie))).await;
    assert_eq!(location(&response), "/wedding-2024/gallery");

    let response = send(&router, get("/wedding-2024/access", Some(&cookie))).await;
    assert_eq!(location(&response), "/wedding-2024/gallery");
}

#[tokio::test]
async fn test_unknown_event_goes_to_neutral_route() {
    let router = router();

    let response = send(&router, get("/no-such-event", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = send(&router, get("/no-such-event/access", None)).await;
    assert_eq!(location(&response), "/");

    let response = send(&router, get("/no-such-event/gallery/extra", None)).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_password_for_unknown_event_goes_to_neutral_route() {
    let router = router();

    let response = send(&router, submit_password("no-such-event", "x")).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_unknown_events_are_not_rate_tracked() {
    let mut config = config();
    config.access.attempts_per_minute = Some(5);
    let state = AppState::new(&config, Arc::new(StubBackend::default()));
    let router = app(state.clone());

    for i in 0..20 {
        let response = send(&router, submit_password(&format!("junk-{i}"), "x")).await;
        assert_eq!(location(&response), "/");
    }
    let limiter = state.attempt_limiter().unwrap();
    assert_eq!(limiter.tracked(), 0);

    send(&router, submit_password("wedding-2024", "guess")).await;
    assert_eq!(limiter.tracked(), 1);
}

#[tokio::test]
async fn test_session_cookie_expires_with_grant_ttl() {
    let mut config = config();
    config.access.grant_ttl_secs = Some(600);
    let router = router_with(Arc::new(StubBackend::default()), &config);

    let response = send(&router, submit_password("wedding-2024", "s3cret")).await;

    assert!(raw_set_cookie(&response).contains("Max-Age="));
}

#[tokio::test]
async fn test_session_cookie_without_ttl_lasts_for_the_browser_session() {
    let router = router();

    let response = send(&router, submit_password("wedding-2024", "s3cret")).await;

    assert!(!raw_set_cookie(&response).contains("Max-Age"));
}

#[tokio::test]
async fn test_cancel_returns_to_neutral_route() {
    let router = router();

    let response = send(
        &router,
        Request::post("/wedding-2024/access/cancel")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_backend_failure_is_reported_and_retryable() {
    let backend = Arc::new(StubBackend {
        backend_down: true,
        ..Default::default()
    });
    let router = router_with(backend, &config());

    let response = send(&router, submit_password("wedding-2024", "s3cret")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("An unexpected error occurred")
    );
}

#[tokio::test]
async fn test_attempt_limit_when_configured() {
    let mut config = config();
    config.access.attempts_per_minute = Some(1);
    let router = router_with(Arc::new(StubBackend::default()), &config);

    let response = send(&router, submit_password("wedding-2024", "guess")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&router, submit_password("wedding-2024", "s3cret")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

fn multipart_upload(cookie: Option<&str>) -> Request<Body> {
    multipart_upload_of(cookie, "jpeg-bytes")
}

fn multipart_upload_of(cookie: Option<&str>, payload: &str) -> Request<Body> {
    let boundary = "eventlens-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"description\"\r\n\r\n\
         Cake\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"cake.JPG\"\r\n\
         Content-Type: image/jpeg\r\n\r\n\
         {payload}\r\n\
         --{boundary}--\r\n"
    );

    let mut builder = Request::post("/wedding-2024/upload").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={boundary}"),
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn test_upload_requires_unlock() {
    let backend = Arc::new(StubBackend::default());
    let router = router_with(backend.clone(), &config());

    let response = send(&router, multipart_upload(None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/wedding-2024/access");
    assert!(backend.inserted.lock().unwrap().is_empty());

    let cookie = unlock(&router).await;
    let response = send(&router, multipart_upload(Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/wedding-2024/gallery");

    let inserted = backend.inserted.lock().unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].kind, MediaKind::Photo);
    assert_eq!(inserted[0].description.as_deref(), Some("Cake"));
    assert!(inserted[0].url.starts_with(PREFIX));
    assert!(inserted[0].url.ends_with(".jpg"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_as_too_large() {
    let backend = Arc::new(StubBackend::default());
    let mut config = config();
    config.server.max_upload_bytes = 256;
    let router = router_with(backend.clone(), &config);
    let cookie = unlock(&router).await;

    let payload = "x".repeat(4096);
    let response = send(&router, multipart_upload_of(Some(&cookie), &payload)).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(backend.inserted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_home_is_neutral() {
    let response = send(&router(), get("/", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "ok");
}
