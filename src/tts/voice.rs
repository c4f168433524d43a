use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;

/// User-facing voice selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKey {
    #[default]
    Female,
    Male,
    Lexi,
    Atlas,
}

impl VoiceKey {
    pub const ALL: [VoiceKey; 4] = [
        VoiceKey::Female,
        VoiceKey::Male,
        VoiceKey::Lexi,
        VoiceKey::Atlas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceKey::Female => "female",
            VoiceKey::Male => "male",
            VoiceKey::Lexi => "lexi",
            VoiceKey::Atlas => "atlas",
        }
    }
}

impl fmt::Display for VoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoiceKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Speaker names are accepted as aliases for their key
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "ezinne" => Ok(VoiceKey::Female),
            "male" | "abeo" => Ok(VoiceKey::Male),
            "lexi" | "aria" => Ok(VoiceKey::Lexi),
            "atlas" | "guy" => Ok(VoiceKey::Atlas),
            _ => Err(AppError::UnknownVoice(s.to_string())),
        }
    }
}

/// What to do with a voice key that is not in the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownVoicePolicy {
    /// Use the default female voice and log a warning.
    #[default]
    Fallback,
    /// Fail the request with `UnknownVoice`.
    Reject,
}

impl FromStr for UnknownVoicePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fallback" => Ok(UnknownVoicePolicy::Fallback),
            "reject" => Ok(UnknownVoicePolicy::Reject),
            other => Err(format!(
                "expected 'fallback' or 'reject', got '{}'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVoice {
    pub key: VoiceKey,
    pub engine_voice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceInfo {
    pub key: VoiceKey,
    pub engine_voice: String,
}

/// Immutable voice key to engine voice id table, built once at startup.
#[derive(Debug, Clone)]
pub struct VoiceMapping {
    voices: HashMap<VoiceKey, String>,
}

impl VoiceMapping {
    pub fn standard() -> Self {
        let voices = [
            (VoiceKey::Female, "en-NG-EzinneNeural"),
            (VoiceKey::Male, "en-NG-AbeoNeural"),
            (VoiceKey::Lexi, "en-US-AriaNeural"),
            (VoiceKey::Atlas, "en-US-GuyNeural"),
        ]
        .into_iter()
        .map(|(key, id)| (key, id.to_string()))
        .collect();

        Self { voices }
    }

    pub fn engine_voice(&self, key: VoiceKey) -> &str {
        // standard() covers every key
        self.voices.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn resolve(
        &self,
        requested: Option<&str>,
        policy: UnknownVoicePolicy,
    ) -> Result<ResolvedVoice, AppError> {
        let key = match requested.map(str::trim).filter(|s| !s.is_empty()) {
            None => VoiceKey::default(),
            Some(raw) => match raw.parse::<VoiceKey>() {
                Ok(key) => key,
                Err(err) => match policy {
                    UnknownVoicePolicy::Reject => return Err(err),
                    UnknownVoicePolicy::Fallback => {
                        tracing::warn!(
                            voice = %raw,
                            fallback = %VoiceKey::default(),
                            "Unknown voice requested, using default voice"
                        );
                        VoiceKey::default()
                    }
                },
            },
        };

        Ok(ResolvedVoice {
            key,
            engine_voice: self.engine_voice(key).to_string(),
        })
    }

    pub fn list(&self) -> Vec<VoiceInfo> {
        VoiceKey::ALL
            .iter()
            .map(|&key| VoiceInfo {
                key,
                engine_voice: self.engine_voice(key).to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_map_to_engine_voices() {
        let mapping = VoiceMapping::standard();
        let cases = [
            ("female", "en-NG-EzinneNeural"),
            ("male", "en-NG-AbeoNeural"),
            ("lexi", "en-US-AriaNeural"),
            ("atlas", "en-US-GuyNeural"),
        ];
        for (key, expected) in cases {
            let resolved = mapping
                .resolve(Some(key), UnknownVoicePolicy::Reject)
                .unwrap();
            assert_eq!(resolved.engine_voice, expected);
            assert_eq!(resolved.key.as_str(), key);
        }
    }

    #[test]
    fn test_missing_voice_defaults_to_female() {
        let mapping = VoiceMapping::standard();
        let resolved = mapping.resolve(None, UnknownVoicePolicy::Reject).unwrap();
        assert_eq!(resolved.key, VoiceKey::Female);

        let blank = mapping.resolve(Some("  "), UnknownVoicePolicy::Reject).unwrap();
        assert_eq!(blank.key, VoiceKey::Female);
    }

    #[test]
    fn test_aliases_and_case() {
        assert_eq!("Abeo".parse::<VoiceKey>().unwrap(), VoiceKey::Male);
        assert_eq!(" EZINNE ".parse::<VoiceKey>().unwrap(), VoiceKey::Female);
        assert_eq!("aria".parse::<VoiceKey>().unwrap(), VoiceKey::Lexi);
        assert_eq!("Guy".parse::<VoiceKey>().unwrap(), VoiceKey::Atlas);
    }

    #[test]
    fn test_unknown_voice_fallback() {
        let mapping = VoiceMapping::standard();
        let resolved = mapping
            .resolve(Some("unknown"), UnknownVoicePolicy::Fallback)
            .unwrap();
        assert_eq!(resolved.key, VoiceKey::Female);
        assert_eq!(resolved.engine_voice, "en-NG-EzinneNeural");
    }

    #[test]
    fn test_jenny_is_not_a_voice() {
        // Only the four keys and their speaker aliases are recognized
        assert!("jenny".parse::<VoiceKey>().is_err());

        let mapping = VoiceMapping::standard();
        let resolved = mapping
            .resolve(Some("jenny"), UnknownVoicePolicy::Fallback)
            .unwrap();
        assert_eq!(resolved.key, VoiceKey::Female);
        assert!(mapping.list().iter().all(|v| v.engine_voice != "en-US-JennyNeural"));
    }

    #[test]
    fn test_unknown_voice_reject() {
        let mapping = VoiceMapping::standard();
        let err = mapping
            .resolve(Some("unknown"), UnknownVoicePolicy::Reject)
            .unwrap_err();
        assert!(matches!(err, AppError::UnknownVoice(v) if v == "unknown"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mapping = VoiceMapping::standard();
        let first = mapping.resolve(Some("male"), UnknownVoicePolicy::Fallback).unwrap();
        for _ in 0..10 {
            let again = mapping.resolve(Some("male"), UnknownVoicePolicy::Fallback).unwrap();
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_list_covers_every_key() {
        let voices = VoiceMapping::standard().list();
        assert_eq!(voices.len(), VoiceKey::ALL.len());
        assert!(voices.iter().all(|v| !v.engine_voice.is_empty()));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            "Reject".parse::<UnknownVoicePolicy>().unwrap(),
            UnknownVoicePolicy::Reject
        );
        assert!("strict".parse::<UnknownVoicePolicy>().is_err());
    }
}
