pub mod handlers;
pub mod middleware;
pub mod routes;

use serde::{Deserialize, Serialize};

use crate::tts::{VoiceInfo, VoiceKey};

/// Body of `POST /speak`, or the query of `GET /speak`.
#[derive(Debug, Default, Deserialize)]
pub struct SpeakRequest {
    #[serde(default)]
    pub text: String,
    pub voice: Option<String>,
}

/// JSON alternative to raw audio, returned when the client sends
/// `Accept: application/json`.
#[derive(Debug, Serialize)]
pub struct SpeakResponse {
    pub success: bool,
    pub audio_url: String,
    pub character_count: usize,
    pub voice: VoiceKey,
    pub engine_voice: String,
    pub audio_size: usize,
    pub request_id: String,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceInfo>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub voices: Vec<VoiceKey>,
}
