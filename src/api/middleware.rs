use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::routes::AppState;
use crate::error::AppError;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Correlation id for one request, echoed back in `X-Request-ID`.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }
    response
}

/// Gate for the speak endpoints. A no-op when no keys are configured.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.api_keys.is_empty() {
        check_api_key(&state.api_keys, &req)?;
    }
    Ok(next.run(req).await)
}

fn check_api_key(keys: &[String], req: &Request) -> Result<(), AppError> {
    let headers = req.headers();
    let presented = headers
        .get(&X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
        .map(str::trim);

    match presented {
        None => Err(AppError::Unauthorized("Missing x-api-key header".into())),
        Some(key) if keys.iter().any(|k| k == key) => Ok(()),
        Some(_) => Err(AppError::Unauthorized("Invalid API key".into())),
    }
}
