//! Landing endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    response::Redirect,
    routing::get,
};
use serde::Serialize;
use tower_sessions::Session;

use eventlens_core::access::AccessGuard;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/{slug}", get(landing))
}

#[derive(Serialize)]
pub struct HomeResponse {
    pub name: &'static str,
    pub status: &'static str,
}

/// GET / - Neutral landing page
async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        name: env!("CARGO_PKG_NAME"),
        status: "ok",
    })
}

/// GET /:slug - Send guests to the gallery or the password prompt
async fn landing(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Redirect, AppError> {
    // Unknown events end up on the neutral page
    state.backend().event_by_slug(&slug).await?;

    let access = state.access(session);
    Ok(Redirect::to(&AccessGuard::entry_point(&access, &slug).await))
}
