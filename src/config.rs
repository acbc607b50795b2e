//! # Configuration Management
//!
//! This module handles loading and managing application configuration from multiple sources:
//! - TOML configuration files (config.toml)
//! - Environment variables (with APP__ prefix)
//! - Default values (built into the code)
//!
//! ## Key Rust Concepts Used:
//! - **Serde**: Converts between Rust structs and TOML/JSON/environment data
//! - **derive macros**: Generate Debug, Clone, Serialize and Deserialize implementations
//! - **Option<T>**: Models settings that may legitimately be absent (the API key)
//! - **Result<T, E>**: Every loading step can fail and is propagated with `?`
//!
//! ## Configuration Priority (highest to lowest):
//! 1. Special environment variables (HOST, PORT, GOOGLE_API_KEY)
//! 2. Environment variables (APP__SERVER__PORT, APP__SPEECH__LANGUAGE_CODE, etc.)
//! 3. Configuration file (config.toml)
//! 4. Default values (defined in the Default impl)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

use crate::speech::DEFAULT_VOICE;

/// Fields wired into the listener, providers or audio store at startup.
const RESTART_ONLY_FIELDS: [(&str, &str); 8] = [
    ("server", "host"),
    ("server", "port"),
    ("speech", "api_key"),
    ("speech", "speech_endpoint"),
    ("speech", "tts_endpoint"),
    ("speech", "request_timeout_secs"),
    ("storage", "static_dir"),
    ("storage", "max_upload_bytes"),
];

/// Main application configuration that contains all settings.
///
/// ## Why separate config structs:
/// The server, the speech providers and the on-disk audio store change for
/// different reasons, so each gets its own section in config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub speech: SpeechConfig,
    pub storage: StorageConfig,
}

/// Server-specific configuration settings.
///
/// ## Common values:
/// - `host = "127.0.0.1"`: Only accept connections from localhost (development)
/// - `host = "0.0.0.0"`: Accept connections from any IP address (production)
/// - `port = 8083`: Port the NeuroSpeak frontend expects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Google Cloud speech settings.
///
/// ## Fields:
/// - `api_key`: Google Cloud API key; when unset the service runs in degraded mode
/// - `language_code`: BCP-47 language used for recognition and reference audio
/// - `speech_endpoint` / `tts_endpoint`: REST base URLs (overridable for proxies)
/// - `default_voice`: Voice used by `/tts` when the request names none
/// - `sample_rate_hertz`: Sample rate of browser recordings (WebM/Opus)
/// - `request_timeout_secs`: Upper bound for a single provider call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub language_code: String,
    pub speech_endpoint: String,
    pub tts_endpoint: String,
    pub default_voice: String,
    pub sample_rate_hertz: u32,
    pub request_timeout_secs: u64,
}

/// Where reference audio lives and how large uploads may be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory served under `/static`
    pub static_dir: String,
    /// Largest accepted audio upload in bytes
    pub max_upload_bytes: usize,
}

/// Provides default configuration values.
///
/// ## Why defaults matter:
/// The service must start without any config file or credentials. Without an
/// API key it still answers every route, using its fallback branches.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8083,
            },
            speech: SpeechConfig {
                api_key: None,
                language_code: "en-US".to_string(),
                speech_endpoint: "https://speech.googleapis.com".to_string(),
                tts_endpoint: "https://texttospeech.googleapis.com".to_string(),
                default_voice: DEFAULT_VOICE.to_string(),
                sample_rate_hertz: 48000,   // Standard rate for web audio
                request_timeout_secs: 30,
            },
            storage: StorageConfig {
                static_dir: "static".to_string(),
                max_upload_bytes: 10 * 1024 * 1024,   // 10 MiB
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources in priority order.
    ///
    /// ## Configuration Loading Process:
    /// 1. Start with built-in defaults
    /// 2. Override with values from config.toml (if it exists)
    /// 3. Override with environment variables prefixed with APP__
    /// 4. Handle special cases for HOST, PORT and GOOGLE_API_KEY
    ///
    /// ## Why a double underscore:
    /// Field names such as `language_code` contain single underscores, so
    /// sections are separated with `__`: `APP__SPEECH__LANGUAGE_CODE=en-GB`.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        // Deployment platforms and the Google tooling use these names directly
        if let Ok(host) = env::var("HOST") {
            settings = settings.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            settings = settings.set_override("server.port", port)?;
        }

        if let Ok(api_key) = env::var("GOOGLE_API_KEY") {
            settings = settings.set_override("speech.api_key", api_key)?;
        }

        let config = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate that the configuration values make sense.
    ///
    /// ## What this checks:
    /// - Server port is not 0
    /// - Language code and endpoints are not blank
    /// - Provider timeout is greater than 0
    /// - Static directory is set and uploads are allowed at all
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port cannot be 0"));
        }

        if self.speech.language_code.trim().is_empty() {
            return Err(anyhow::anyhow!("Speech language code cannot be empty"));
        }

        if self.speech.speech_endpoint.trim().is_empty()
            || self.speech.tts_endpoint.trim().is_empty()
        {
            return Err(anyhow::anyhow!("Speech endpoints cannot be empty"));
        }

        if self.speech.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("Speech request timeout must be greater than 0"));
        }

        if self.storage.static_dir.trim().is_empty() {
            return Err(anyhow::anyhow!("Static directory cannot be empty"));
        }

        if self.storage.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("Max upload size must be greater than 0"));
        }

        Ok(())
    }

    /// Whether Google Cloud credentials are present.
    pub fn has_speech_credentials(&self) -> bool {
        self.speech
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Update configuration from a JSON string (used for runtime config updates).
    ///
    /// ## Partial updates:
    /// Only the fields present in the JSON change. For example
    /// `{"speech": {"language_code": "en-GB"}}` switches the recognition
    /// language and leaves everything else alone.
    ///
    /// ## What cannot change at runtime:
    /// The listener address, provider credentials and endpoints, the static
    /// directory and the upload limit (which also sizes the JSON body limit)
    /// are fixed when the server starts. An update naming any of them is
    /// rejected so the caller is never told a change took effect when it
    /// did not.
    pub fn update_from_json(&mut self, json_str: &str) -> Result<()> {
        let partial_config: serde_json::Value = serde_json::from_str(json_str)?;

        for (section, field) in RESTART_ONLY_FIELDS {
            if partial_config
                .get(section)
                .is_some_and(|values| values.get(field).is_some())
            {
                return Err(anyhow::anyhow!(
                    "{}.{} is read at startup; restart the server to change it",
                    section,
                    field
                ));
            }
        }

        if let Some(speech) = partial_config.get("speech") {
            if let Some(language) = speech.get("language_code").and_then(|v| v.as_str()) {
                self.speech.language_code = language.to_string();
            }
            if let Some(voice) = speech.get("default_voice").and_then(|v| v.as_str()) {
                self.speech.default_voice = voice.to_string();
            }
            if let Some(rate) = speech.get("sample_rate_hertz").and_then(|v| v.as_u64()) {
                self.speech.sample_rate_hertz = u32::try_from(rate)
                    .map_err(|_| anyhow::anyhow!("Sample rate {} is out of range", rate))?;
            }
        }

        // Validate the updated configuration to ensure it's still valid
        self.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The default configuration is valid and runs without credentials.
    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.speech.language_code, "en-US");
        assert!(!config.has_speech_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.static_dir = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.speech.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_api_key_is_not_a_credential() {
        let mut config = AppConfig::default();
        config.speech.api_key = Some(" ".to_string());
        assert!(!config.has_speech_credentials());
        config.speech.api_key = Some("key".to_string());
        assert!(config.has_speech_credentials());
    }

    /// Runtime updates change only the provided fields.
    #[test]
    fn test_config_update() {
        let mut config = AppConfig::default();
        let json = r#"{"speech": {"language_code": "en-GB", "sample_rate_hertz": 16000}}"#;
        assert!(config.update_from_json(json).is_ok());
        assert_eq!(config.speech.language_code, "en-GB");
        assert_eq!(config.speech.sample_rate_hertz, 16000);
        assert_eq!(config.server.port, 8083);
        assert_eq!(config.speech.default_voice, DEFAULT_VOICE);
    }

    #[test]
    fn test_config_update_rejects_invalid_values() {
        let mut config = AppConfig::default();
        assert!(config.update_from_json(r#"{"speech": {"language_code": " "}}"#).is_err());
        assert!(config
            .update_from_json(r#"{"speech": {"sample_rate_hertz": 5000000000}}"#)
            .is_err());
        assert!(config.update_from_json("not json").is_err());
    }

    #[test]
    fn test_update_rejects_restart_only_fields() {
        let updates = [
            r#"{"server": {"port": 9090}}"#,
            r#"{"server": {"host": "0.0.0.0"}}"#,
            r#"{"speech": {"api_key": "sneaky"}}"#,
            r#"{"storage": {"static_dir": "/tmp"}}"#,
            r#"{"storage": {"max_upload_bytes": 1024}}"#,
        ];
        for json in updates {
            let mut config = AppConfig::default();
            let err = config.update_from_json(json).unwrap_err();
            assert!(err.to_string().contains("restart"), "{}", json);
            assert_eq!(config.server.port, 8083);
            assert!(config.speech.api_key.is_none());
            assert_eq!(config.storage.max_upload_bytes, 10 * 1024 * 1024);
        }
    }

    /// A rejected update leaves the allowed fields in the same body untouched.
    #[test]
    fn test_mixed_update_is_all_or_nothing() {
        let mut config = AppConfig::default();
        let json = r#"{"server": {"port": 9090}, "speech": {"language_code": "en-GB"}}"#;
        assert!(config.update_from_json(json).is_err());
        assert_eq!(config.speech.language_code, "en-US");
    }
}
