//! Reply-shape extraction
//!
//! Chat-completions compatible services disagree on where a choice keeps
//! its text. Each choice is parsed into a [`ChoiceShape`] and an ordered
//! list of rules picks the first non-empty fragment.

use crate::LlmError;
use serde::Deserialize;
use serde_json::Value;

/// Known layouts of one entry in `choices`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChoiceShape {
    /// `{"message": {"content": ..}}` or `{"message": {"text": ..}}`
    Chat { message: MessageShape },
    /// `{"text": ..}` or `{"content": ..}`
    Flat {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        content: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct MessageShape {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

type FragmentRule = fn(&ChoiceShape) -> Option<&str>;

const FRAGMENT_RULES: [FragmentRule; 4] = [message_content, message_text, flat_text, flat_content];

fn message_content(choice: &ChoiceShape) -> Option<&str> {
    match choice {
        ChoiceShape::Chat { message } => message.content.as_deref(),
        _ => None,
    }
}

fn message_text(choice: &ChoiceShape) -> Option<&str> {
    match choice {
        ChoiceShape::Chat { message } => message.text.as_deref(),
        _ => None,
    }
}

fn flat_text(choice: &ChoiceShape) -> Option<&str> {
    match choice {
        ChoiceShape::Flat { text, .. } => text.as_deref(),
        _ => None,
    }
}

fn flat_content(choice: &ChoiceShape) -> Option<&str> {
    match choice {
        ChoiceShape::Flat { content, .. } => content.as_deref(),
        _ => None,
    }
}

fn fragment(choice: &ChoiceShape) -> Option<&str> {
    FRAGMENT_RULES
        .iter()
        .find_map(|rule| rule(choice).filter(|text| !text.is_empty()))
}

/// Pull the reply text out of a chat-completions response body.
///
/// Fragments from every choice are joined with newlines and trimmed.
///
/// # Errors
///
/// - [`LlmError::Upstream`] when no text was found and the body carries an
///   `error` entry
/// - [`LlmError::EmptyReply`] when no text was found otherwise
pub fn extract_reply_text(body: &Value) -> Result<String, LlmError> {
    let fragments: Vec<String> = body
        .get("choices")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|choice| ChoiceShape::deserialize(choice).ok())
        .filter_map(|choice| fragment(&choice).map(str::to_owned))
        .collect();

    let joined = fragments.join("\n");
    let text = joined.trim();
    if !text.is_empty() {
        return Ok(text.to_string());
    }

    match embedded_error(body) {
        Some(message) => Err(LlmError::Upstream(message)),
        None => Err(LlmError::EmptyReply),
    }
}

/// Error indicator at the top level or inside an object-shaped `choices`
fn embedded_error(body: &Value) -> Option<String> {
    let error = body
        .get("error")
        .or_else(|| body.get("choices").and_then(|c| c.get("error")))?;

    let message = match error {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    };
    Some(message)
}
