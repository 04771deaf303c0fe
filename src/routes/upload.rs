//! Upload endpoint

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    response::Redirect,
    routing::post,
};

use eventlens_core::EventLensError;
use eventlens_core::access::GuestRoute;
use eventlens_core::upload::{UploadRequest, upload_media};

use crate::routes::AppError;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new().route(
        "/{slug}/upload",
        post(upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
    )
}

/// POST /:slug/upload - Store a photo or video (multipart `file`, `description`)
async fn upload(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut file = None;
    let mut description = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await.map_err(invalid)?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("description") => {
                description = Some(field.text().await.map_err(invalid)?);
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, bytes)) = file else {
        return Err(EventLensError::InvalidInput("no file selected".into()).into());
    };

    let event = state.backend().event_by_slug(&slug).await?;
    upload_media(
        state.backend(),
        &event,
        UploadRequest {
            file_name,
            content_type,
            bytes,
            description,
        },
    )
    .await?;

    Ok(Redirect::to(&GuestRoute::Gallery.path(&slug)))
}

fn invalid(e: MultipartError) -> EventLensError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        EventLensError::UploadTooLarge(e.body_text())
    } else {
        EventLensError::InvalidInput(e.body_text())
    }
}
