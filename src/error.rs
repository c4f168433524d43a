use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::routes::ENDPOINTS;

/// Seconds a client should wait before retrying a failed synthesis.
pub const RETRY_AFTER_SECS: u64 = 30;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Synthesis unavailable: {0}")]
    SynthesisUnavailable(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::UnknownVoice(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::SynthesisUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::UnknownVoice(_) => "UNKNOWN_VOICE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            AppError::SynthesisUnavailable(_) => "SYNTHESIS_UNAVAILABLE",
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::UnknownVoice(v) => format!(
                "Voice '{}' is not available; try the default 'female' voice",
                v
            ),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::NotFound(path) => format!("Endpoint '{}' not found", path),
            AppError::MethodNotAllowed(route) => format!("Method not allowed: {}", route),
            AppError::SynthesisUnavailable(msg) => format!(
                "{}; the speech engine may be starting up, wait {} seconds and try again",
                msg, RETRY_AFTER_SECS
            ),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<Vec<&'static str>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Request failed: {} - {}", code, message);
        } else {
            tracing::warn!("Request rejected: {} - {}", code, message);
        }

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            available_endpoints: match self {
                AppError::NotFound(_) => Some(ENDPOINTS.to_vec()),
                _ => None,
            },
        });

        match self {
            AppError::SynthesisUnavailable(_) => (
                status,
                [(header::RETRY_AFTER, RETRY_AFTER_SECS.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
