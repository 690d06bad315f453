//! Error types for the HTTP layer.
//!
//! This module defines the server `Error` enum and its mapping onto HTTP
//! responses. Validation failures from [`fizzbuzz::Error`] all collapse into
//! the same `400 Bad Request` body; the specific reason is only logged.
//!
//! ## Error Cases
//! - `Range`: the requested range was missing, malformed, reversed, or too
//!   large.
//! - `WriteFailure`: rendering the response body failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Body returned for every rejected request.
pub const INVALID_PARAMS_MESSAGE: &str = "request parameters invalid";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request's `from`/`to` parameters failed validation.
    #[error(transparent)]
    Range(#[from] fizzbuzz::Error),

    /// The response body could not be written.
    #[error("Failed to write response: {context}")]
    WriteFailure { context: String },
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Self::Range(_) => {
                (StatusCode::BAD_REQUEST, format!("{INVALID_PARAMS_MESSAGE}\n")).into_response()
            }
            Self::WriteFailure { context } => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{context}\n")).into_response()
            }
        }
    }
}
