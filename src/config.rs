use std::net::SocketAddr;
use std::time::Duration;

use crate::tts::UnknownVoicePolicy;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub edge_tts_bin: String,
    pub synthesis_timeout: Duration,
    pub max_text_chars: usize,
    pub unknown_voice_policy: UnknownVoicePolicy,
    pub api_keys: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = get("PORT", "5000")
            .trim()
            .parse::<u16>()
            .map_err(|e| invalid("PORT", e))?;

        let timeout_secs = positive("SYNTHESIS_TIMEOUT_SECS", &get("SYNTHESIS_TIMEOUT_SECS", "45"))?;
        let max_text_chars = positive("MAX_TEXT_CHARS", &get("MAX_TEXT_CHARS", "500"))?;

        let unknown_voice_policy = get("UNKNOWN_VOICE_POLICY", "fallback")
            .parse::<UnknownVoicePolicy>()
            .map_err(|e| invalid("UNKNOWN_VOICE_POLICY", e))?;

        let api_keys = lookup("API_KEYS")
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: get("HOST", "0.0.0.0"),
            port,
            edge_tts_bin: get("EDGE_TTS_BIN", "edge-tts"),
            synthesis_timeout: Duration::from_secs(timeout_secs as u64),
            max_text_chars,
            unknown_voice_policy,
            api_keys,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| invalid("HOST", e))
    }
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn positive(name: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(invalid(name, "must be greater than zero")),
        Ok(n) => Ok(n),
        Err(e) => Err(invalid(name, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.edge_tts_bin, "edge-tts");
        assert_eq!(config.synthesis_timeout, Duration::from_secs(45));
        assert_eq!(config.max_text_chars, 500);
        assert_eq!(config.unknown_voice_policy, UnknownVoicePolicy::Fallback);
        assert!(config.api_keys.is_empty());
        assert_eq!(config.addr().unwrap().port(), 5000);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("SYNTHESIS_TIMEOUT_SECS", "10"),
            ("MAX_TEXT_CHARS", "1000"),
            ("UNKNOWN_VOICE_POLICY", "reject"),
            ("API_KEYS", "my_key, test_key,,"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.synthesis_timeout, Duration::from_secs(10));
        assert_eq!(config.max_text_chars, 1000);
        assert_eq!(config.unknown_voice_policy, UnknownVoicePolicy::Reject);
        assert_eq!(config.api_keys, vec!["my_key", "test_key"]);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(load(&[("SYNTHESIS_TIMEOUT_SECS", "0")]).is_err());
        assert!(load(&[("MAX_TEXT_CHARS", "-3")]).is_err());
        assert!(load(&[("UNKNOWN_VOICE_POLICY", "strict")]).is_err());
    }

    #[test]
    fn test_bad_host() {
        let config = load(&[("HOST", "not a host")]).unwrap();
        assert!(config.addr().is_err());
    }
}
