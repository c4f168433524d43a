use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

use super::middleware::RequestId;
use super::{HealthResponse, SpeakRequest, SpeakResponse, VoicesResponse};
use crate::api::routes::AppState;
use crate::error::AppError;
use crate::tts::{Diagnosis, SynthesisResult, VoiceKey, SAMPLE_TEXT};

static X_AUDIO_SIZE: HeaderName = HeaderName::from_static("x-audio-size");

pub async fn speak(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    payload: Result<Json<SpeakRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) =
        payload.map_err(|e| AppError::InvalidInput(format!("Malformed request body: {}", e)))?;
    respond(&state, request_id, &headers, request).await
}

pub async fn speak_query(
    State(state): State<Arc<AppState>>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    query: Result<Query<SpeakRequest>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(request) =
        query.map_err(|e| AppError::InvalidInput(format!("Malformed query: {}", e)))?;
    respond(&state, request_id, &headers, request).await
}

async fn respond(
    state: &AppState,
    request_id: String,
    headers: &HeaderMap,
    request: SpeakRequest,
) -> Result<Response, AppError> {
    tracing::info!(
        request_id = %request_id,
        voice = request.voice.as_deref().unwrap_or("female"),
        chars = request.text.chars().count(),
        "TTS request"
    );

    let result = state
        .tts
        .synthesize(&request.text, request.voice.as_deref())
        .await?;

    if wants_json(headers) {
        let audio_url = format!(
            "data:{};base64,{}",
            result.content_type,
            STANDARD.encode(&result.audio)
        );
        return Ok(Json(SpeakResponse {
            success: true,
            audio_url,
            character_count: request.text.trim().chars().count(),
            voice: result.voice,
            engine_voice: result.engine_voice,
            audio_size: result.audio.len(),
            request_id,
        })
        .into_response());
    }

    Ok(audio_response(result, None))
}

pub async fn test_audio(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let result = state
        .tts
        .synthesize(SAMPLE_TEXT, Some(VoiceKey::Female.as_str()))
        .await?;
    Ok(audio_response(result, Some("inline; filename=sample.mp3")))
}

pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.tts.voices(),
    })
}

pub async fn diagnose(State(state): State<Arc<AppState>>) -> Json<Diagnosis> {
    let report = state.tts.diagnose().await;
    tracing::info!(status = %report.status, "Diagnosis complete");
    Json(report)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        voices: VoiceKey::ALL.to_vec(),
    })
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(format!("{} {}", method, uri.path()))
}

/// JSON only when the client ranks `application/json` above audio.
fn wants_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mut json_q = 0.0_f32;
    let mut audio_q = 0.0_f32;
    for (media_type, q) in accept.split(',').filter_map(parse_media_range) {
        match media_type.as_str() {
            "application/json" => json_q = json_q.max(q),
            "audio/mpeg" | "audio/*" => audio_q = audio_q.max(q),
            _ => {}
        }
    }

    json_q > 0.0 && json_q > audio_q
}

fn parse_media_range(range: &str) -> Option<(String, f32)> {
    let mut parts = range.split(';');
    let media_type = parts.next()?.trim().to_ascii_lowercase();
    if media_type.is_empty() {
        return None;
    }

    let q = parts
        .filter_map(|param| param.trim().strip_prefix("q="))
        .find_map(|q| q.trim().parse::<f32>().ok())
        .unwrap_or(1.0);

    Some((media_type, q))
}

fn audio_response(result: SynthesisResult, disposition: Option<&str>) -> Response {
    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, result.content_type.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
            (X_AUDIO_SIZE.clone(), result.audio.len().to_string()),
        ],
        result.audio,
    )
        .into_response();

    if let Some(disposition) = disposition {
        if let Ok(value) = disposition.parse() {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    response
}
