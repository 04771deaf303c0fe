pub mod access;
pub mod event;
pub mod gallery;
pub mod upload;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use eventlens_core::EventLensError;
use eventlens_core::access::NEUTRAL_ROUTE;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<EventLensError>() {
            Some(EventLensError::EventNotFound(slug)) => {
                tracing::info!(slug = %slug, "unknown event");
                return Redirect::to(NEUTRAL_ROUTE).into_response();
            }
            Some(EventLensError::IncorrectPassword) => StatusCode::UNAUTHORIZED,
            Some(EventLensError::PasswordRequired | EventLensError::InvalidInput(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Some(EventLensError::UploadTooLarge(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            Some(EventLensError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Some(
                EventLensError::Transient(_)
                | EventLensError::Signing(_)
                | EventLensError::Upload(_),
            ) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
