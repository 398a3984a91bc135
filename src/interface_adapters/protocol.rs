use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

// Simple error envelope for JSON responses. The gateway client reads `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

// Helper to build a JSON error response.
pub fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}
