//! Gallery endpoint

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;

use eventlens_core::ResolvedMedia;
use eventlens_core::event::EventSummary;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/{slug}/gallery", get(gallery))
}

/// Gallery returned by API
#[derive(Serialize)]
pub struct GalleryResponse {
    pub event: EventSummary,
    /// Newest first
    pub media: Vec<ResolvedMedia>,
}

/// GET /:slug/gallery - Event media with freshly signed URLs
async fn gallery(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GalleryResponse>, AppError> {
    let event = state.backend().event_by_slug(&slug).await?;
    let media = state
        .resolver()
        .list_media(state.backend(), &event.id)
        .await?;

    Ok(Json(GalleryResponse {
        event: EventSummary::from(&event),
        media,
    }))
}
