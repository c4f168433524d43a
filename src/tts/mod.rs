pub mod edge;
pub mod voice;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppError;

pub use edge::EdgeTtsEngine;
pub use voice::{UnknownVoicePolicy, VoiceInfo, VoiceKey, VoiceMapping};

pub const AUDIO_MPEG: &str = "audio/mpeg";

/// Text used by the sample audio endpoint and the diagnosis run.
pub const SAMPLE_TEXT: &str =
    "Welcome to ODIADEV! This is a test of the Nigerian Text-to-Speech system.";

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Failed to run {binary} (is it installed?): {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine exited with status {status:?}: {stderr}")]
    Failed { status: Option<i32>, stderr: String },

    #[error("Engine produced no audio")]
    EmptyOutput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// External text-to-speech backend.
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Render `text` with the engine voice `voice_id`, returning MP3 bytes.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, EngineError>;

    /// Cheap availability check; returns the engine's version string.
    async fn probe(&self) -> Result<String, EngineError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub content_type: &'static str,
    pub voice: VoiceKey,
    pub engine_voice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub ok: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    pub status: String,
    pub engine: String,
    pub checks: Vec<Check>,
}

pub struct TtsService {
    engine: Arc<dyn SynthesisEngine>,
    voices: VoiceMapping,
    policy: UnknownVoicePolicy,
    max_text_chars: usize,
    timeout: Duration,
}

impl TtsService {
    pub fn new(
        engine: Arc<dyn SynthesisEngine>,
        voices: VoiceMapping,
        policy: UnknownVoicePolicy,
        max_text_chars: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            voices,
            policy,
            max_text_chars,
            timeout,
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice: Option<&str>,
    ) -> Result<SynthesisResult, AppError> {
        // 1. Validate text
        let text = self.validate_text(text)?;

        // 2. Resolve voice
        let resolved = self.voices.resolve(voice, self.policy)?;

        // 3. Delegate to the engine under the request timeout
        let started = Instant::now();
        let audio = match tokio::time::timeout(
            self.timeout,
            self.engine.synthesize(text, &resolved.engine_voice),
        )
        .await
        {
            Ok(Ok(audio)) => audio,
            Ok(Err(e)) => {
                tracing::error!(
                    engine = self.engine.name(),
                    voice = %resolved.engine_voice,
                    "Synthesis failed: {}",
                    e
                );
                return Err(AppError::SynthesisUnavailable(
                    "Speech synthesis failed".into(),
                ));
            }
            Err(_) => {
                tracing::error!(
                    engine = self.engine.name(),
                    voice = %resolved.engine_voice,
                    timeout_secs = self.timeout.as_secs_f32(),
                    "Synthesis timed out"
                );
                return Err(AppError::SynthesisUnavailable(format!(
                    "Speech synthesis timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        // 4. Reject anything that is not MP3
        if !is_mp3(&audio) {
            tracing::error!(
                engine = self.engine.name(),
                bytes = audio.len(),
                "Engine output is not MP3 audio"
            );
            return Err(AppError::SynthesisUnavailable(
                "Speech engine returned invalid audio".into(),
            ));
        }

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::info!(
            voice = %resolved.key,
            engine_voice = %resolved.engine_voice,
            chars = text.chars().count(),
            bytes = audio.len(),
            elapsed_ms,
            "Synthesized speech"
        );

        Ok(SynthesisResult {
            audio,
            content_type: AUDIO_MPEG,
            voice: resolved.key,
            engine_voice: resolved.engine_voice,
        })
    }

    fn validate_text<'a>(&self, text: &'a str) -> Result<&'a str, AppError> {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Err(AppError::InvalidInput("No text provided".into()));
        }

        if trimmed.chars().count() > self.max_text_chars {
            return Err(AppError::InvalidInput(format!(
                "Text too long (max {} chars); please shorten it",
                self.max_text_chars
            )));
        }

        Ok(trimmed)
    }

    pub fn voices(&self) -> Vec<VoiceInfo> {
        self.voices.list()
    }

    pub async fn diagnose(&self) -> Diagnosis {
        let mut checks = Vec::new();

        let probe = tokio::time::timeout(self.timeout, self.engine.probe()).await;
        checks.push(match probe {
            Ok(Ok(version)) => Check {
                name: "engine".into(),
                ok: true,
                detail: version,
            },
            Ok(Err(e)) => Check {
                name: "engine".into(),
                ok: false,
                detail: e.to_string(),
            },
            Err(_) => Check {
                name: "engine".into(),
                ok: false,
                detail: "probe timed out".into(),
            },
        });

        checks.push(match self.synthesize(SAMPLE_TEXT, None).await {
            Ok(result) => Check {
                name: "synthesis".into(),
                ok: true,
                detail: format!("{} bytes of {}", result.audio.len(), result.content_type),
            },
            Err(e) => Check {
                name: "synthesis".into(),
                ok: false,
                detail: e.to_string(),
            },
        });

        let status = if checks.iter().all(|c| c.ok) {
            "operational"
        } else {
            "degraded"
        };

        Diagnosis {
            status: status.to_string(),
            engine: self.engine.name().to_string(),
            checks,
        }
    }
}

/// True if `audio` starts with an ID3 tag or an MPEG frame sync.
pub fn is_mp3(audio: &[u8]) -> bool {
    match audio {
        [b'I', b'D', b'3', ..] => true,
        [0xFF, second, ..] => second & 0xE0 == 0xE0,
        _ => false,
    }
}
