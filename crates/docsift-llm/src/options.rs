//! Service settings and per-request options
//!
//! [`ApiSettings`] is read once at startup and passed into constructors.
//! [`CompletionOptions`] tunes individual requests.

use crate::LlmError;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Model used when neither the environment nor the options name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Default number of attempts per request
pub const DEFAULT_RETRIES: u32 = 3;

/// Default truncation limit for request text (characters)
pub const DEFAULT_TRUNCATE_CHARS: usize = 2000;

/// Default timeout for the direct HTTP transport (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment keys read by [`ApiSettings::from_env`]
pub mod keys {
    /// API bearer token
    pub const API_KEY: &str = "api_key";
    /// Service base URL, e.g. `https://api.openai.com`
    pub const BASE_URL: &str = "base_url";
    /// Default model name
    pub const MODEL: &str = "model";
    /// Set to `0` to disable TLS certificate verification
    pub const VERIFY_SSL: &str = "OPENAI_VERIFY_SSL";
}

/// Connection settings for the text-generation service
#[derive(Clone, PartialEq)]
pub struct ApiSettings {
    /// Bearer token
    pub api_key: String,
    /// Base URL without trailing slash
    pub base_url: String,
    /// Model used when the request options do not name one
    pub default_model: String,
    /// Verify TLS certificates
    pub verify_ssl: bool,
}

impl ApiSettings {
    /// Create settings directly
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            verify_ssl: true,
        }
    }

    /// Load settings from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, LlmError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from the process environment after applying a specific env file
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, LlmError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| {
            LlmError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] when `api_key` or `base_url` is missing or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| LlmError::Config(format!("{} not found in environment (.env)", key)))
        };

        let api_key = required(keys::API_KEY)?;
        let base_url = required(keys::BASE_URL)?;

        let default_model = lookup(keys::MODEL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let verify_ssl = lookup(keys::VERIFY_SSL)
            .map(|v| v.trim() != "0")
            .unwrap_or(true);

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
            verify_ssl,
        })
    }

    /// Full URL of the chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

/// Options for a single logical completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Model override; the settings' default model is used when `None`
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Optional system message, sent before the user text
    pub system: Option<String>,
    /// Total attempts (at least one is always made)
    pub retries: u32,
    /// Base delay in seconds; attempt `n` waits `backoff_factor * 2^(n-1)`
    pub backoff_factor: f64,
    /// TLS verification override; the settings' value is used when `None`
    pub verify_ssl: Option<bool>,
    /// Truncate request text to this many characters; `None` or zero disables
    pub truncate_chars: Option<usize>,
    /// Timeout for the direct HTTP transport, in seconds
    pub timeout_secs: u64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: 2000,
            system: None,
            retries: DEFAULT_RETRIES,
            backoff_factor: 1.0,
            verify_ssl: None,
            truncate_chars: Some(DEFAULT_TRUNCATE_CHARS),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl CompletionOptions {
    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the system message
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the token limit
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the number of attempts
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the backoff factor in seconds
    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// Set or disable the truncation limit
    pub fn with_truncate_chars(mut self, limit: Option<usize>) -> Self {
        self.truncate_chars = limit;
        self
    }

    /// Direct HTTP transport timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective TLS verification given the process settings
    pub fn verify_ssl(&self, settings: &ApiSettings) -> bool {
        self.verify_ssl.unwrap_or(settings.verify_ssl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_settings_from_lookup() {
        let settings = ApiSettings::from_lookup(lookup(&[
            ("api_key", "sk-test"),
            ("base_url", "https://llm.example.com/"),
            ("model", "qwen-plus"),
        ]))
        .unwrap();

        assert_eq!(settings.api_key, "sk-test");
        assert_eq!(settings.base_url, "https://llm.example.com");
        assert_eq!(settings.default_model, "qwen-plus");
        assert!(settings.verify_ssl);
        assert_eq!(
            settings.completions_url(),
            "https://llm.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = ApiSettings::from_lookup(lookup(&[("base_url", "https://x")]));
        assert!(matches!(result, Err(LlmError::Config(msg)) if msg.contains("api_key")));
    }

    #[test]
    fn test_blank_base_url_is_config_error() {
        let result = ApiSettings::from_lookup(lookup(&[("api_key", "k"), ("base_url", "  ")]));
        assert!(matches!(result, Err(LlmError::Config(msg)) if msg.contains("base_url")));
    }

    #[test]
    fn test_default_model_and_ssl_toggle() {
        let settings = ApiSettings::from_lookup(lookup(&[
            ("api_key", "k"),
            ("base_url", "https://x"),
            ("OPENAI_VERIFY_SSL", "0"),
        ]))
        .unwrap();
        assert_eq!(settings.default_model, DEFAULT_MODEL);
        assert!(!settings.verify_ssl);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = ApiSettings::new("sk-secret", "https://x");
        let printed = format!("{:?}", settings);
        assert!(!printed.contains("sk-secret"));
    }

    #[test]
    fn test_default_options() {
        let options = CompletionOptions::default();
        assert_eq!(options.retries, 3);
        assert_eq!(options.backoff_factor, 1.0);
        assert_eq!(options.truncate_chars, Some(2000));
        assert_eq!(options.max_tokens, 2000);
        assert_eq!(options.temperature, 0.0);
    }

    #[test]
    fn test_verify_ssl_override() {
        let settings = ApiSettings::new("k", "https://x");
        let options = CompletionOptions {
            verify_ssl: Some(false),
            ..Default::default()
        };
        assert!(!options.verify_ssl(&settings));
        assert!(CompletionOptions::default().verify_ssl(&settings));
    }
}
