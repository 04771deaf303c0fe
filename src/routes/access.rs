//! Password challenge endpoints

use axum::{
    Form, Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use eventlens_core::EventLensError;
use eventlens_core::access::GuestRoute;
use eventlens_core::event::EventSummary;

use crate::routes::AppError;
use crate::state::AppState;

const PROMPT: &str = "Please enter the password to view and upload media.";
const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{slug}/access", get(challenge).post(submit))
        .route("/{slug}/access/cancel", post(cancel))
}

#[derive(Serialize)]
pub struct ChallengeResponse {
    pub event: EventSummary,
    pub prompt: &'static str,
}

#[derive(Deserialize)]
pub struct AccessForm {
    #[serde(default)]
    pub password: String,
}

/// GET /:slug/access - Describe the password challenge for an event
async fn challenge(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
) -> Result<Response, AppError> {
    let event = state.backend().event_by_slug(&slug).await?;

    if state.access(session).is_unlocked(&slug).await {
        return Ok(Redirect::to(&GuestRoute::Gallery.path(&slug)).into_response());
    }

    Ok(Json(ChallengeResponse {
        event: EventSummary::from(&event),
        prompt: PROMPT,
    })
    .into_response())
}

/// POST /:slug/access - Submit the event password
async fn submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
    Form(form): Form<AccessForm>,
) -> Result<Redirect, AppError> {
    // Unknown events go back to the neutral page before any attempt is counted
    let event = state.backend().event_by_slug(&slug).await?;
    let access = state.access(session.clone());

    let unlocked = state
        .challenge()
        .submit(&access, &event.slug, &form.password)
        .await
        .map_err(|e| match e {
            // Backend details stay in the logs
            EventLensError::Transient(_) => {
                EventLensError::Transient(UNEXPECTED_ERROR.to_string())
            }
            other => other,
        })?;

    // Fresh session id once the visitor holds a grant
    session.cycle_id().await?;

    Ok(Redirect::to(&unlocked.redirect_to()))
}

/// POST /:slug/access/cancel - Leave without unlocking
async fn cancel(State(state): State<AppState>, Path(slug): Path<String>) -> Redirect {
    Redirect::to(state.challenge().cancel(&slug))
}
