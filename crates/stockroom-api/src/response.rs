//! Response envelope

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The `{success, message, data}` wrapper every JSON response uses
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl Envelope<()> {
    /// Failure envelope with no data
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Successful handler result, rendered as a 200 envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful response with an empty message
    pub fn success(data: T) -> Self {
        Self {
            data,
            message: String::new(),
        }
    }

    /// Create a successful response carrying an informational message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let envelope = Envelope {
            success: true,
            message: self.message,
            data: Some(self.data),
        };

        (StatusCode::OK, Json(envelope)).into_response()
    }
}
