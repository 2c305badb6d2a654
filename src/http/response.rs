//! Response construction.
//!
//! # Responsibilities
//! - Turn a relay response into `application/json` with the origin's cookie
//! - Map relay errors to HTTP status codes
//!
//! # Design Decisions
//! - Origin and document failures are 502 Bad Gateway
//! - Missing or invalid settings are 500 Internal Server Error
//! - Error bodies are short plain-text diagnostics

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::routing::{RelayError, RelayResponse};

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            self.body,
        )
            .into_response();

        if let Some(cookie) = self.cookie {
            match HeaderValue::from_str(&cookie) {
                Ok(value) => {
                    response.headers_mut().insert(header::SET_COOKIE, value);
                }
                Err(_) => tracing::warn!(cookie = %cookie, "Dropping unrepresentable cookie"),
            }
        }
        response
    }
}

/// Status code reported for a failed request.
pub fn status_for(error: &RelayError) -> StatusCode {
    match error {
        RelayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RelayError::Transport(_) | RelayError::Document(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (status_for(&self), self.to_string()).into_response()
    }
}
