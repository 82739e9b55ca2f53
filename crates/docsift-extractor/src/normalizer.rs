//! Recover a structured object from a free-text LLM reply

use serde_json::{Map, Value};
use thiserror::Error;

/// The reply held no usable JSON object
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    /// No `{` ... `}` span in the reply
    #[error("no object boundaries")]
    NoObjectBoundaries {
        /// Reply after fence stripping
        raw: String,
    },

    /// The `{` ... `}` span is not a valid JSON object
    #[error("JSON parse error: {reason}")]
    Parse {
        /// Parser message
        reason: String,
        /// The span that failed to parse
        raw: String,
    },
}

impl NormalizeError {
    /// Offending text, for manual inspection
    pub fn raw(&self) -> &str {
        match self {
            NormalizeError::NoObjectBoundaries { raw } | NormalizeError::Parse { raw, .. } => raw,
        }
    }
}

/// Extracts the structured object from a model reply
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    list_fields: Vec<String>,
}

impl ResponseNormalizer {
    /// Normalizer that repairs the named fields into lists
    pub fn new<I, S>(list_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list_fields: list_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields repaired from comma-separated strings into lists
    pub fn list_fields(&self) -> &[String] {
        &self.list_fields
    }

    /// Parse the object between the first `{` and the last `}` of `reply`.
    ///
    /// Markdown code fences around the reply are removed first. List fields
    /// that arrive as a single comma-separated string are split.
    pub fn extract_object(&self, reply: &str) -> Result<Map<String, Value>, NormalizeError> {
        let text = strip_code_fence(reply);

        let span = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(NormalizeError::NoObjectBoundaries {
                    raw: text.to_string(),
                })
            }
        };

        let mut object: Map<String, Value> =
            serde_json::from_str(span).map_err(|e| NormalizeError::Parse {
                reason: e.to_string(),
                raw: span.to_string(),
            })?;

        for field in &self.list_fields {
            if let Some(Value::String(joined)) = object.get(field) {
                let items = split_list(joined);
                object.insert(field.clone(), Value::Array(items));
            }
        }

        Ok(object)
    }
}

/// Remove a surrounding ```` ``` ```` fence and its language tag, if any
pub fn strip_code_fence(reply: &str) -> &str {
    const FENCE: &str = "```";

    let trimmed = reply.trim();
    if trimmed.len() < 2 * FENCE.len() || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE) {
        return trimmed;
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(inner.len());
    inner[tag_len..].trim()
}

/// Split `"a, b,, c"` into `["a", "b", "c"]`
fn split_list(joined: &str) -> Vec<Value> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect()
}
