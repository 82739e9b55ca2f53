//! Run configuration for a batch

use crate::error::ExtractorError;
use crate::prompt::DEFAULT_TEXT_LABEL;
use docsift_domain::DEFAULT_SOURCE_ID_FIELD;
use docsift_llm::CompletionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one batch run
///
/// Only `prompt` is required; every other field has a default.
///
/// # Examples
///
/// ```
/// use docsift_extractor::BatchConfig;
///
/// let config = BatchConfig::from_toml(r#"prompt = "Summarize the paper as JSON.""#).unwrap();
/// assert_eq!(config.max_tokens, 10_000);
/// assert_eq!(config.list_fields, vec!["biases"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Fixed instruction sent ahead of every document
    pub prompt: String,

    /// Directory scanned for inputs; the current directory is used if it is missing
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// File extensions treated as inputs
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Text between the instruction and the document text
    #[serde(default = "default_text_label")]
    pub text_label: String,

    /// Fields repaired from comma-separated strings into lists
    #[serde(default = "default_list_fields")]
    pub list_fields: Vec<String>,

    /// Field that receives the document identifier
    #[serde(default = "default_source_id_field")]
    pub source_id_field: String,

    /// Processed-identifier ledger
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// JSON Lines result store
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// CSV export
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Spreadsheet export
    #[serde(default = "default_xlsx_path")]
    pub xlsx_path: PathBuf,

    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Optional system message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f64,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request text limit in characters; 0 disables truncation
    #[serde(default = "default_truncate_chars")]
    pub truncate_chars: usize,

    /// Attempts per request
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Backoff base in seconds
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Direct HTTP transport timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TLS verification override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("pdfs")
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

fn default_text_label() -> String {
    DEFAULT_TEXT_LABEL.to_string()
}

fn default_list_fields() -> Vec<String> {
    vec!["biases".to_string()]
}

fn default_source_id_field() -> String {
    DEFAULT_SOURCE_ID_FIELD.to_string()
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("processed.json")
}

fn default_results_path() -> PathBuf {
    PathBuf::from("results.jsonl")
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("results.csv")
}

fn default_xlsx_path() -> PathBuf {
    PathBuf::from("results.xlsx")
}

fn default_max_tokens() -> u32 {
    10_000
}

fn default_truncate_chars() -> usize {
    docsift_llm::options::DEFAULT_TRUNCATE_CHARS
}

fn default_retries() -> u32 {
    docsift_llm::options::DEFAULT_RETRIES
}

fn default_backoff_factor() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    docsift_llm::options::DEFAULT_TIMEOUT_SECS
}

impl BatchConfig {
    /// Configuration with `prompt` and every default
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            input_dir: default_input_dir(),
            extensions: default_extensions(),
            text_label: default_text_label(),
            list_fields: default_list_fields(),
            source_id_field: default_source_id_field(),
            ledger_path: default_ledger_path(),
            results_path: default_results_path(),
            csv_path: default_csv_path(),
            xlsx_path: default_xlsx_path(),
            model: None,
            system: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            truncate_chars: default_truncate_chars(),
            retries: default_retries(),
            backoff_factor: default_backoff_factor(),
            timeout_secs: default_timeout_secs(),
            verify_ssl: None,
        }
    }

    /// Load from a file: JSON when the extension is `.json`, TOML otherwise
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExtractorError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json(&contents)?
        } else {
            Self::from_toml(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse JSON
    pub fn from_json(json_str: &str) -> Result<Self, ExtractorError> {
        serde_json::from_str(json_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse JSON: {}", e)))
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.prompt.trim().is_empty() {
            return Err(ExtractorError::Config("prompt must not be empty".to_string()));
        }
        if self.extensions.is_empty() {
            return Err(ExtractorError::Config(
                "extensions must list at least one file type".to_string(),
            ));
        }
        if self.retries == 0 {
            return Err(ExtractorError::Config("retries must be greater than 0".to_string()));
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(ExtractorError::Config(
                "backoff_factor must be a non-negative number".to_string(),
            ));
        }
        if self.source_id_field.is_empty() {
            return Err(ExtractorError::Config("source_id_field must not be empty".to_string()));
        }
        Ok(())
    }

    /// Client options for this run
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            system: self.system.clone(),
            retries: self.retries,
            backoff_factor: self.backoff_factor,
            verify_ssl: self.verify_ssl,
            truncate_chars: (self.truncate_chars > 0).then_some(self.truncate_chars),
            timeout_secs: self.timeout_secs,
        }
    }
}
