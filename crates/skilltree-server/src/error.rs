//! Error types for the skill tree server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type for server setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running the server.
#[derive(Debug, Error)]
pub enum Error {
    /// An environment variable could not be parsed
    #[error("Invalid {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    /// Engine error
    #[error(transparent)]
    Core(#[from] skilltree_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Engine error returned from a request handler.
#[derive(Debug)]
pub struct ApiError(pub skilltree_core::Error);

impl From<skilltree_core::Error> for ApiError {
    fn from(e: skilltree_core::Error) -> Self {
        Self(e)
    }
}

impl From<skilltree_core::DraftError> for ApiError {
    fn from(e: skilltree_core::DraftError) -> Self {
        Self(e.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// HTTP status for the wrapped error.
    pub fn status(&self) -> StatusCode {
        use skilltree_core::Error as E;
        match &self.0 {
            E::NodeNotFound(_) => StatusCode::NOT_FOUND,
            E::Connection(_) | E::UnlockBlocked(_) | E::InsufficientPoints { .. } => {
                StatusCode::CONFLICT
            }
            E::InvalidDraft(_) | E::PointsOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            E::Serialization(_) | E::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
