//! Request payloads for chat-completions endpoints

use crate::options::CompletionOptions;
use serde::Serialize;
use std::borrow::Cow;

/// Appended to request text that was cut to the truncation limit
pub const TRUNCATION_MARKER: &str = "\n\n...<TRUNCATED>...";

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user text
    User,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    /// Speaker
    pub role: Role,
    /// Message text
    pub content: String,
}

/// Body of a chat-completions POST
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model name
    pub model: String,
    /// Optional system message followed by the user text
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Build a request from user text and options.
    ///
    /// The text is truncated to `options.truncate_chars` first.
    pub fn build(text: &str, model: impl Into<String>, options: &CompletionOptions) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system.as_deref().filter(|s| !s.is_empty()) {
            messages.push(ChatMessage {
                role: Role::System,
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: Role::User,
            content: truncate_text(text, options.truncate_chars).into_owned(),
        });

        Self {
            model: model.into(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        }
    }

    /// The user message text as transmitted
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Cut `text` to `limit` characters and append [`TRUNCATION_MARKER`].
///
/// Text within the limit is returned unchanged, as is any text when
/// `limit` is `None` or zero. The cut never splits a character.
pub fn truncate_text(text: &str, limit: Option<usize>) -> Cow<'_, str> {
    let Some(limit) = limit.filter(|&n| n > 0) else {
        return Cow::Borrowed(text);
    };
    match text.char_indices().nth(limit) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(text),
    }
}
