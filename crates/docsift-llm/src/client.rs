//! Completion client with retry and exponential backoff

use crate::options::{ApiSettings, CompletionOptions};
use crate::reply::extract_reply_text;
use crate::request::ChatRequest;
use crate::transport::{AsyncChatTransport, BlockingChatTransport, Transport};
use crate::LlmError;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Pauses between attempts
pub trait Sleeper: Send + Sync {
    /// Block for `delay`
    fn sleep(&self, delay: Duration);
}

/// Sleeps the current thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Records requested delays instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(delay);
    }
}

/// Delay after failed attempt number `attempt` (1-based):
/// `backoff_factor * 2^(attempt-1)` seconds.
pub fn backoff_delay(backoff_factor: f64, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31) as i32;
    let secs = backoff_factor * 2f64.powi(exponent);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Client for one logical completion request at a time
///
/// # Examples
///
/// ```no_run
/// use docsift_llm::{ApiSettings, CompletionClient, CompletionOptions};
///
/// let settings = ApiSettings::from_env()?;
/// let client = CompletionClient::new(&settings, CompletionOptions::default())?;
/// let reply = client.complete("List three calculus topics.")?;
/// println!("{}", reply);
/// # Ok::<(), docsift_llm::LlmError>(())
/// ```
pub struct CompletionClient {
    transports: Vec<Box<dyn Transport>>,
    default_model: String,
    options: CompletionOptions,
    sleeper: Box<dyn Sleeper>,
}

impl CompletionClient {
    /// Create a client with the standard transport list: the async HTTP
    /// transport first, the blocking HTTP transport as fallback.
    ///
    /// A transport that cannot be constructed is left out.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if no transport could be constructed.
    pub fn new(settings: &ApiSettings, options: CompletionOptions) -> Result<Self, LlmError> {
        let verify_ssl = options.verify_ssl(settings);
        let mut transports: Vec<Box<dyn Transport>> = Vec::with_capacity(2);
        let mut last_error = None;

        match AsyncChatTransport::new(settings, verify_ssl) {
            Ok(t) => transports.push(Box::new(t)),
            Err(e) => {
                warn!("Async transport unavailable, continuing without it: {}", e);
                last_error = Some(e);
            }
        }
        match BlockingChatTransport::new(settings, verify_ssl, options.timeout()) {
            Ok(t) => transports.push(Box::new(t)),
            Err(e) => {
                warn!("Blocking transport unavailable, continuing without it: {}", e);
                last_error = Some(e);
            }
        }

        if transports.is_empty() {
            return Err(last_error
                .unwrap_or_else(|| LlmError::Config("No transport available".to_string())));
        }

        Ok(Self::with_transports(transports, settings.default_model.clone(), options))
    }

    /// Create a client over an explicit, ordered transport list
    pub fn with_transports(
        transports: Vec<Box<dyn Transport>>,
        default_model: impl Into<String>,
        options: CompletionOptions,
    ) -> Self {
        Self {
            transports,
            default_model: default_model.into(),
            options,
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Request options
    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Names of the configured transports, in order
    pub fn transport_names(&self) -> Vec<&str> {
        self.transports.iter().map(|t| t.name()).collect()
    }

    /// Model that requests are sent with
    pub fn model(&self) -> &str {
        self.options.model.as_deref().unwrap_or(&self.default_model)
    }

    /// Build the request that [`complete`](Self::complete) would send
    pub fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest::build(text, self.model(), &self.options)
    }

    /// Send `text` and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns the error of the final attempt once the retry budget is
    /// spent, or immediately for non-retryable errors.
    pub fn complete(&self, text: &str) -> Result<String, LlmError> {
        let request = self.build_request(text);
        let attempts = self.options.retries.max(1);

        debug!(
            "Completion request: model {}, {} chars, up to {} attempts",
            request.model,
            request.user_text().map_or(0, |t| t.chars().count()),
            attempts
        );

        let mut attempt = 1;
        loop {
            let error = match self.attempt(&request) {
                Ok(text) => {
                    debug!(
                        "Attempt {} succeeded, reply length {} chars",
                        attempt,
                        text.chars().count()
                    );
                    return Ok(text);
                }
                Err(e) => e,
            };

            if !error.is_retryable() || attempt >= attempts {
                return Err(error);
            }

            let delay = backoff_delay(self.options.backoff_factor, attempt);
            warn!(
                "Attempt {}/{} failed: {}; retrying in {:?}",
                attempt, attempts, error, delay
            );
            self.sleeper.sleep(delay);
            attempt += 1;
        }
    }

    fn attempt(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = self.send_with_fallback(request)?;
        extract_reply_text(&body)
    }

    /// Try each transport in order; the first response wins
    fn send_with_fallback(&self, request: &ChatRequest) -> Result<Value, LlmError> {
        let mut last_error = None;
        for transport in &self.transports {
            match transport.send(request) {
                Ok(body) => return Ok(body),
                Err(e) => {
                    debug!("Transport {} failed: {}", transport.name(), e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| LlmError::Config("No transport configured".to_string())))
    }
}
