//! Normalizing Gemini responses into plain text.
//!
//! Text can show up in several places depending on how the response was
//! produced: a direct `text` field, a lazily computed accessor, a nested
//! `response` object, or the raw `candidates[].content.parts[].text` tree.

use serde_json::Value;
use std::fmt;

/// Lazily computed text, as produced by SDK-style wrappers.
pub type TextAccessor = Box<dyn Fn() -> Option<String> + Send + Sync>;

/// A text value that is either present or computed on demand.
pub enum TextSource {
    Direct(String),
    Accessor(TextAccessor),
}

impl TextSource {
    fn resolve(&self) -> Option<String> {
        let text = match self {
            TextSource::Direct(text) => Some(text.clone()),
            TextSource::Accessor(accessor) => accessor(),
        };
        text.filter(|text| !text.is_empty())
    }
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Direct(text) => f.debug_tuple("Direct").field(text).finish(),
            TextSource::Accessor(_) => f.write_str("Accessor(..)"),
        }
    }
}

/// One part of a candidate's content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPart {
    pub text: Option<String>,
}

/// A generation candidate. Missing content is allowed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub parts: Option<Vec<ContentPart>>,
}

/// A loosely-shaped model response.
#[derive(Debug, Default)]
pub struct ModelResponse {
    pub text: Option<TextSource>,
    pub response: Option<Box<ModelResponse>>,
    pub candidates: Vec<Candidate>,
}

impl ModelResponse {
    /// A response carrying only a direct text field.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(TextSource::Direct(text.into())),
            ..Default::default()
        }
    }

    /// A response carrying only candidates.
    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            ..Default::default()
        }
    }

    /// Build from raw JSON. Shapes that don't match are ignored rather than rejected.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let text = object
            .get("text")
            .and_then(Value::as_str)
            .map(|t| TextSource::Direct(t.to_string()));

        let response = object
            .get("response")
            .filter(|nested| nested.is_object())
            .map(|nested| Box::new(Self::from_value(nested)));

        let candidates = object
            .get("candidates")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(candidate_from_value).collect())
            .unwrap_or_default();

        Self {
            text,
            response,
            candidates,
        }
    }
}

fn candidate_from_value(value: &Value) -> Candidate {
    let parts = value
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .map(|part| ContentPart {
                    text: part.get("text").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        });

    Candidate { parts }
}

/// Joined text of the first candidate's parts, if any part has text.
fn first_candidate_text(candidates: &[Candidate]) -> Option<String> {
    let parts = candidates.first()?.parts.as_ref()?;
    let fragments: Vec<&str> = parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n"))
    }
}

/// Extract plain text from a model response.
///
/// Tried in order: direct text or accessor, the nested response's direct text or
/// accessor, the first candidate's parts, then the nested response's first
/// candidate's parts. Returns an empty string when nothing yields text.
pub fn extract_text(response: &ModelResponse) -> String {
    if let Some(text) = response.text.as_ref().and_then(TextSource::resolve) {
        return text;
    }

    let nested = response.response.as_deref();

    if let Some(text) = nested
        .and_then(|n| n.text.as_ref())
        .and_then(TextSource::resolve)
    {
        return text;
    }

    if let Some(text) = first_candidate_text(&response.candidates) {
        return text;
    }

    nested
        .and_then(|n| first_candidate_text(&n.candidates))
        .unwrap_or_default()
}
