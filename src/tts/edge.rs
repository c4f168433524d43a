use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::{EngineError, SynthesisEngine};

/// Microsoft Edge neural voices, driven through the `edge-tts` CLI.
pub struct EdgeTtsEngine {
    binary: PathBuf,
}

impl EdgeTtsEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        // A timed-out request drops the future; take the child down with it
        cmd.kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> EngineError {
        EngineError::Spawn {
            binary: self.binary.display().to_string(),
            source: e,
        }
    }
}

#[async_trait]
impl SynthesisEngine for EdgeTtsEngine {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<Vec<u8>, EngineError> {
        let media = tempfile::Builder::new()
            .prefix("speech-")
            .suffix(".mp3")
            .tempfile()?;

        // One token, so argparse never reads dash-leading text as a flag
        let output = self
            .command()
            .arg(format!("--text={}", text))
            .arg("--voice")
            .arg(voice_id)
            .arg("--write-media")
            .arg(media.path())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let audio = tokio::fs::read(media.path()).await?;
        if audio.is_empty() {
            return Err(EngineError::EmptyOutput);
        }

        tracing::debug!(voice = %voice_id, bytes = audio.len(), "edge-tts wrote media");

        Ok(audio)
    }

    async fn probe(&self) -> Result<String, EngineError> {
        let output = self
            .command()
            .arg("--version")
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(EngineError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn name(&self) -> &str {
        "edge-tts"
    }
}
