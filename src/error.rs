use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors that are converted to HTTP responses.
///
/// Authorization failures never reach this type: the page server answers them
/// with a redirect to the login page and the realtime hub rejects the
/// handshake directly.
#[derive(Debug, Error)]
pub enum AppError {
    /// Requested page does not exist on disk.
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
