//! Transport strategies
//!
//! A [`Transport`] delivers one [`ChatRequest`] and returns the decoded
//! response body. The client holds an ordered list of them and falls
//! through to the next one when a transport fails within an attempt.
//!
//! # Features
//!
//! - [`AsyncChatTransport`]: async reqwest client on a private runtime,
//!   long timeout (the primary path)
//! - [`BlockingChatTransport`]: blocking reqwest client with the caller's
//!   timeout (the fallback path)
//! - [`ScriptedTransport`]: replays canned results, for tests

use crate::options::ApiSettings;
use crate::request::ChatRequest;
use crate::LlmError;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Timeout for the primary transport (500 seconds)
pub const PRIMARY_TIMEOUT_SECS: u64 = 500;

/// One way of delivering a chat request
pub trait Transport: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Send the request and return the decoded JSON response body
    fn send(&self, request: &ChatRequest) -> Result<Value, LlmError>;
}

fn decode_body(status: reqwest::StatusCode, body: String) -> Result<Value, LlmError> {
    if !status.is_success() {
        return Err(LlmError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
}

/// Chat-completions over an async reqwest client
///
/// Owns a current-thread tokio runtime so it can be driven from the
/// synchronous batch loop.
pub struct AsyncChatTransport {
    url: String,
    api_key: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl AsyncChatTransport {
    /// Create the transport
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the HTTP client or runtime cannot be built.
    pub fn new(settings: &ApiSettings, verify_ssl: bool) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PRIMARY_TIMEOUT_SECS))
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            url: settings.completions_url(),
            api_key: settings.api_key.clone(),
            client,
            runtime,
        })
    }

    async fn post(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_body(status, body)
    }
}

impl Transport for AsyncChatTransport {
    fn name(&self) -> &str {
        "async-http"
    }

    fn send(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        self.runtime.block_on(self.post(request))
    }
}

/// Chat-completions over a blocking reqwest client
pub struct BlockingChatTransport {
    url: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl BlockingChatTransport {
    /// Create the transport
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if the HTTP client cannot be built.
    pub fn new(settings: &ApiSettings, verify_ssl: bool, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: settings.completions_url(),
            api_key: settings.api_key.clone(),
            client,
        })
    }
}

impl Transport for BlockingChatTransport {
    fn name(&self) -> &str {
        "blocking-http"
    }

    fn send(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        decode_body(status, body)
    }
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<Result<Value, LlmError>>,
    repeat: Option<Result<Value, LlmError>>,
    requests: Vec<ChatRequest>,
}

/// Transport that replays scripted results without touching the network
///
/// Clones share the same script and request log, so a test can keep a
/// handle after boxing one into a client.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    name: String,
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    /// Return `result` on every call
    pub fn always(result: Result<Value, LlmError>) -> Self {
        Self::with_script(Script {
            repeat: Some(result),
            ..Script::default()
        })
    }

    /// Return the given results in order, then fail with a transport error
    pub fn sequence(results: Vec<Result<Value, LlmError>>) -> Self {
        Self::with_script(Script {
            queue: results.into(),
            ..Script::default()
        })
    }

    fn with_script(script: Script) -> Self {
        Self {
            name: "scripted".to_string(),
            script: Arc::new(Mutex::new(script)),
        }
    }

    /// Rename the transport, for tests that mix several
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of requests received
    pub fn calls(&self) -> usize {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).requests.len()
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .requests
            .clone()
    }
}

impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        script.requests.push(request.clone());
        if let Some(next) = script.queue.pop_front() {
            return next;
        }
        script
            .repeat
            .clone()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompletionOptions;
    use serde_json::json;

    fn request() -> ChatRequest {
        ChatRequest::build("hello", "m", &CompletionOptions::default())
    }

    #[test]
    fn test_scripted_sequence_then_exhausted() {
        let transport = ScriptedTransport::sequence(vec![Ok(json!({"a": 1}))]);
        assert_eq!(transport.send(&request()).unwrap(), json!({"a": 1}));
        assert!(matches!(transport.send(&request()), Err(LlmError::Transport(_))));
        assert_eq!(transport.calls(), 2);
    }

    #[test]
    fn test_scripted_clone_shares_log() {
        let transport = ScriptedTransport::always(Err(LlmError::EmptyReply)).named("t1");
        let handle = transport.clone();
        let _ = transport.send(&request());
        assert_eq!(handle.calls(), 1);
        assert_eq!(handle.name(), "t1");
        assert_eq!(handle.requests()[0].user_text(), Some("hello"));
    }

    #[test]
    fn test_decode_non_success_status() {
        let err = decode_body(reqwest::StatusCode::BAD_GATEWAY, "upstream down".into()).unwrap_err();
        assert_eq!(
            err,
            LlmError::Status {
                status: 502,
                body: "upstream down".to_string()
            }
        );
    }

    #[test]
    fn test_decode_invalid_json() {
        let err = decode_body(reqwest::StatusCode::OK, "<html>".into()).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[test]
    fn test_blocking_transport_unreachable_endpoint() {
        let settings = ApiSettings::new("k", "http://127.0.0.1:9");
        let transport =
            BlockingChatTransport::new(&settings, true, Duration::from_secs(2)).unwrap();
        let result = transport.send(&request());
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }
}
