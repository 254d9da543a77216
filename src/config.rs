//! Configuration types for the chat companion.

use crate::credentials::SecretRef;
use crate::persona::Persona;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Persona selected at startup.
    pub persona: Persona,
    /// Language model provider settings.
    pub llm: LlmConfig,
    /// Voice input (speech recognition) settings.
    pub voice_input: RecognitionConfig,
    /// Voice output (speech synthesis) settings.
    pub voice_output: SynthesisConfig,
}

/// Language model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL for the OpenAI-compatible API, including the version prefix
    /// (e.g. `https://api.openai.com/v1` or `http://localhost:11434/v1`).
    pub api_url: String,
    /// Model name to request from the provider.
    pub api_model: String,
    /// API key reference, resolved once at client construction.
    ///
    /// For keyless local servers set this to `{ type = "none" }`.
    pub api_key: SecretRef,
    /// Per-request timeout in seconds.
    ///
    /// A hung provider request fails at this bound instead of leaving the
    /// conversation awaiting a reply forever.
    pub request_timeout_secs: u64,
    /// Maximum tokens to generate per response.
    pub max_tokens: usize,
    /// Sampling temperature (0.0 = greedy, higher = more random).
    pub temperature: f64,
    /// Top-p (nucleus) sampling threshold.
    pub top_p: f64,
    /// Maximum number of history messages to retain (excluding the system
    /// instruction). Set to 0 to disable trimming.
    pub max_history_messages: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            // Google's OpenAI-compatible endpoint; the original companion
            // shipped against Gemini.
            api_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_owned(),
            api_model: "gemini-2.5-flash".to_owned(),
            api_key: SecretRef::default(),
            request_timeout_secs: 30,
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
            max_history_messages: 40,
        }
    }
}

/// Voice input (speech recognition) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Recognition locale passed to the capability.
    ///
    /// `hi-IN` recognizes both Hindi and most Hinglish speech, so it is the
    /// default for all three personas.
    pub locale: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            locale: "hi-IN".to_owned(),
        }
    }
}

/// Voice output (speech synthesis) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Prefer the first advertised voice whose locale starts with this prefix.
    pub preferred_locale_prefix: String,
    /// If no locale match, fall back to the first voice whose name contains
    /// this substring.
    pub fallback_voice_hint: String,
    /// Playback rate.
    pub rate: f32,
    /// Playback pitch.
    pub pitch: f32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            preferred_locale_prefix: "hi".to_owned(),
            fallback_voice_hint: "Google".to_owned(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::ChatError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be
    /// serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path.
    ///
    /// Resolves to `dirs::config_dir()/dost/config.toml` (platform-appropriate:
    /// `~/.config/dost/` on Linux, `~/Library/Application Support/dost/` on
    /// macOS). Override the directory with the `DOST_CONFIG_DIR` environment
    /// variable.
    pub fn default_config_path() -> PathBuf {
        if let Some(override_dir) = std::env::var_os("DOST_CONFIG_DIR") {
            return PathBuf::from(override_dir).join("config.toml");
        }
        dirs::config_dir()
            .map(|d| d.join("dost"))
            .unwrap_or_else(|| PathBuf::from("/tmp/dost-config"))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.persona, Persona::Hinglish);
        assert_eq!(config.llm.request_timeout_secs, 30);
        assert_eq!(config.voice_input.locale, "hi-IN");
        assert_eq!(config.voice_output.preferred_locale_prefix, "hi");
        assert!((config.voice_output.rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn roundtrip_through_toml() {
        let mut config = AppConfig::default();
        config.persona = Persona::Hindi;
        config.llm.api_model = "test-model".to_owned();
        config.llm.api_key = SecretRef::None;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let loaded: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(loaded.persona, Persona::Hindi);
        assert_eq!(loaded.llm.api_model, "test-model");
        assert_eq!(loaded.llm.api_key, SecretRef::None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let loaded: AppConfig = toml::from_str(
            r#"
[llm]
api_url = "http://localhost:11434/v1"
"#,
        )
        .unwrap();
        assert_eq!(loaded.llm.api_url, "http://localhost:11434/v1");
        assert_eq!(loaded.llm.api_model, "gemini-2.5-flash");
        assert_eq!(loaded.persona, Persona::Hinglish);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.llm.request_timeout_secs = 5;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.llm.request_timeout_secs, 5);
    }

    #[test]
    fn from_file_nonexistent_returns_error() {
        let result = AppConfig::from_file(std::path::Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn from_file_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "this is not valid toml {{{").unwrap();
        assert!(AppConfig::from_file(&path).is_err());
    }

    #[test]
    fn default_config_path_ends_with_config_toml() {
        let path = AppConfig::default_config_path();
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("config.toml"));
        assert!(path_str.contains("dost"));
    }

    #[test]
    fn config_dir_env_override_wins() {
        unsafe { std::env::set_var("DOST_CONFIG_DIR", "/tmp/dost-test-config") };
        let path = AppConfig::default_config_path();
        unsafe { std::env::remove_var("DOST_CONFIG_DIR") };
        assert_eq!(path, PathBuf::from("/tmp/dost-test-config/config.toml"));
    }
}
