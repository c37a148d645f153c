//! Mapping of service errors onto HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use semcat_categories::CategoryError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// The category service failed.
    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Status code for this error: bad input → 400, duplicate → 409,
    /// everything else → 500.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Category(CategoryError::Validation(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Category(CategoryError::DuplicateName(_)) => StatusCode::CONFLICT,
            Self::Category(
                CategoryError::Embedding(_)
                | CategoryError::Storage(_)
                | CategoryError::DimensionMismatch { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Request failed: {message}");
        } else {
            warn!("Request rejected ({status}): {message}");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
