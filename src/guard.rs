//! Route-layer middleware in front of the gated event pages.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use eventlens_core::access::{AccessGuard, GuardDecision, GuestRoute};

use crate::state::AppState;

pub async fn require_access(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    // Only gated routes carry this layer
    let route = GuestRoute::parse(request.uri().path())
        .map(|(_, route)| route)
        .unwrap_or(GuestRoute::Gallery);

    let access = state.access(session);
    match AccessGuard::check(&access, &slug, route).await {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(to) => Redirect::to(&to).into_response(),
    }
}
