//! docsift LLM client layer
//!
//! A resilient client for chat-completions style text-generation services.
//!
//! # Architecture
//!
//! ```text
//! text → truncate → ChatRequest → [Transport, Transport, ...] → reply JSON → text
//!                        ↑______________ retry with backoff ______________|
//! ```
//!
//! A single logical request is attempted up to `retries` times. Within one
//! attempt each configured [`Transport`] is tried in order until one of them
//! delivers a response, so an unavailable transport costs no retry budget.
//!
//! # Providers
//!
//! - [`CompletionClient`]: the real client, implements `LlmProvider`
//! - [`MockProvider`]: deterministic provider for pipeline tests
//!
//! # Examples
//!
//! ```
//! use docsift_llm::{CompletionClient, CompletionOptions, ScriptedTransport};
//! use serde_json::json;
//!
//! let transport = ScriptedTransport::always(Ok(json!({
//!     "choices": [{"message": {"content": "Hello from LLM!"}}]
//! })));
//! let client = CompletionClient::with_transports(
//!     vec![Box::new(transport)],
//!     "gpt-4o",
//!     CompletionOptions::default(),
//! );
//! assert_eq!(client.complete("hi").unwrap(), "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod options;
pub mod reply;
pub mod request;
pub mod transport;

use docsift_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use client::{backoff_delay, CompletionClient, RecordingSleeper, Sleeper, ThreadSleeper};
pub use options::{ApiSettings, CompletionOptions};
pub use reply::extract_reply_text;
pub use request::{truncate_text, ChatMessage, ChatRequest, Role, TRUNCATION_MARKER};
pub use transport::{AsyncChatTransport, BlockingChatTransport, ScriptedTransport, Transport};

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network failure, timeout, or I/O error while talking to the service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// Response body could not be read as JSON
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response carried no text in any choice
    #[error("no content")]
    EmptyReply,

    /// Response carried an embedded error indicator instead of text
    #[error("LLM error: {0}")]
    Upstream(String),

    /// Missing or invalid settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Config(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Transport(format!("Request timed out: {}", e))
        } else if e.is_connect() {
            LlmError::Transport(format!("Connection failed: {}", e))
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else if let Some(status) = e.status() {
            LlmError::Status {
                status: status.as_u16(),
                body: e.to_string(),
            }
        } else {
            LlmError::Transport(e.to_string())
        }
    }
}

/// Mock LLM provider for deterministic pipeline tests
///
/// Returns pre-configured responses without making any network calls.
/// A configured response is chosen when its marker occurs anywhere in the
/// prompt, so tests can key responses on document text.
///
/// # Examples
///
/// ```
/// use docsift_llm::MockProvider;
/// use docsift_domain::traits::LlmProvider;
///
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", "response1");
/// assert_eq!(provider.generate("...alpha...").unwrap(), "response1");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `response` to prompts containing `marker`
    pub fn add_response(&mut self, marker: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(marker.into(), Ok(response.into()));
    }

    /// Fail prompts containing `marker` with `error`
    pub fn add_error(&mut self, marker: impl Into<String>, error: LlmError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(marker.into(), Err(error));
    }

    /// Number of times generate was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Every prompt received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        // Longest marker wins so overlapping markers stay deterministic
        let matched = responses
            .iter()
            .filter(|(marker, _)| prompt.contains(marker.as_str()))
            .max_by_key(|(marker, _)| marker.len());

        match matched {
            Some((_, response)) => response.clone(),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl LlmProviderTrait for CompletionClient {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        self.complete(prompt)
    }
}
