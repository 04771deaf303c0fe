//! eventlens HTTP server: password-gated event galleries.

mod guard;
pub mod routes;
mod session;
pub mod state;

use axum::{Router, middleware, response::Redirect};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use eventlens_core::access::NEUTRAL_ROUTE;

pub use crate::state::AppState;

const SESSION_COOKIE: &str = "eventlens.sid";

/// Browsers cap cookie lifetimes at 400 days.
const MAX_SESSION_SECS: u64 = 400 * 24 * 60 * 60;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    // Sessions stay in memory until the process exits; with a grant TTL
    // they also lapse after that much inactivity.
    let mut sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(state.secure_cookies());
    if let Some(ttl) = state.grant_ttl_secs() {
        let secs = ttl.min(MAX_SESSION_SECS) as i64;
        sessions = sessions.with_expiry(Expiry::OnInactivity(Duration::seconds(secs)));
    }

    let gated = Router::new()
        .merge(routes::gallery::router())
        .merge(routes::upload::router(state.max_upload_bytes()))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_access,
        ));

    Router::new()
        .merge(routes::event::router())
        .merge(routes::access::router())
        .merge(gated)
        .fallback(|| async { Redirect::to(NEUTRAL_ROUTE) })
        .with_state(state)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
}
