//! Response envelope normalization.
//!
//! The workflow engine answers with a JSON object carrying a top-level
//! `success` flag plus an operation payload, but sometimes wraps that single
//! object in a one-element array. [`normalize`] is the only place raw wire
//! responses are parsed and validated; orchestrators and callers only ever
//! see the normalized shape or one of the typed payloads below.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parses and validates a raw response body.
///
/// - Unparsable JSON raises [`Error::Envelope`] with a bounded body preview.
/// - An array whose first element is an object unwraps to that element.
/// - `success` must be `true` and every key in `required_keys` must be
///   present, otherwise [`Error::Validation`].
pub fn normalize(body: &str, required_keys: &[&str]) -> Result<Value> {
    let parsed: Value =
        serde_json::from_str(body).map_err(|_| Error::envelope_preview(body))?;
    let envelope = unwrap_single(parsed);

    if !envelope
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(Error::validation(
            "envelope is missing `success: true`",
        ));
    }
    for key in required_keys {
        if envelope.get(*key).is_none() {
            return Err(Error::validation(format!("envelope is missing `{key}`")));
        }
    }
    Ok(envelope)
}

/// The engine occasionally wraps a single result object in an array.
fn unwrap_single(value: Value) -> Value {
    match value {
        Value::Array(mut items) if matches!(items.first(), Some(Value::Object(_))) => {
            items.swap_remove(0)
        }
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSuggestion {
    pub term: String,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub intent: Option<String>,
}

/// Keyword research payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordList {
    pub keywords: Vec<KeywordSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentIdea {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_keyword: Option<String>,
    #[serde(default)]
    pub target_keywords: Vec<String>,
}

/// Content-ideas payload. `strategy_notes` and `meta` are free-form
/// workflow extras carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeaSet {
    pub ideas: Vec<ContentIdea>,
    #[serde(default)]
    pub strategy_notes: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
}

/// SEO audit payload. Recommendations are workflow-defined and opaque to
/// this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub score: u32,
    pub recommendations: Vec<Value>,
}
