//! Response Extractor: recovers one JSON object from a free-text model reply.
//!
//! Strategy: locate the outermost `{ ... }` span (first `{` to last `}`) and parse
//! it, ignoring any prose or code-fence markers around it. When that span does not
//! parse (e.g. trailing commentary contains a stray `}`), each `{` is tried in turn
//! as the start of a single JSON value.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::prompts::NOT_FOUND;
use crate::analysis::result::{AnalysisResult, Recommendation};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("no JSON object found in model reply")]
    NoJsonObject,

    #[error("model reply contains malformed JSON: {0}")]
    InvalidJson(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is invalid: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

fn object_span() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"))
}

/// Extracts the JSON object embedded in `reply`.
pub fn extract_json_object(reply: &str) -> Result<Map<String, Value>, ExtractionError> {
    let span = object_span()
        .find(reply)
        .ok_or(ExtractionError::NoJsonObject)?;

    let first_error = match serde_json::from_str::<Value>(span.as_str()) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(_) => "outermost span is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    for (offset, _) in reply.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&reply[offset..]).into_iter::<Value>();
        if let Some(Ok(Value::Object(map))) = values.next() {
            return Ok(map);
        }
    }

    Err(ExtractionError::InvalidJson(first_error))
}

/// Extracts and validates an `AnalysisResult` from a raw model reply.
pub fn parse_analysis(reply: &str) -> Result<AnalysisResult, ExtractionError> {
    let object = extract_json_object(reply)?;
    validate_analysis(&object)
}

/// Validates an extracted object into a typed result.
pub fn validate_analysis(object: &Map<String, Value>) -> Result<AnalysisResult, ExtractionError> {
    let verdict = object
        .get("hire_recommendation")
        .ok_or(ExtractionError::MissingField("hire_recommendation"))?;
    let hire_recommendation = verdict
        .as_str()
        .and_then(Recommendation::parse)
        .ok_or_else(|| ExtractionError::InvalidField {
            field: "hire_recommendation",
            reason: format!("expected \"yes\" or \"no\", got {verdict}"),
        })?;

    Ok(AnalysisResult {
        name: contact_field(object, "name"),
        email: contact_field(object, "email"),
        phone: contact_field(object, "phone"),
        hire_recommendation,
        match_reason: contact_field(object, "match_reason"),
        highlights: string_list(object, "highlights")?,
        risks: string_list(object, "risks")?,
    })
}

fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ExtractionError> {
    let items = object
        .get(field)
        .ok_or(ExtractionError::MissingField(field))?
        .as_array()
        .ok_or_else(|| ExtractionError::InvalidField {
            field,
            reason: "expected a list of strings".to_string(),
        })?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| ExtractionError::InvalidField {
                    field,
                    reason: format!("list item {item} is not a string"),
                })
        })
        .collect()
}

/// Optional text field; the not-found sentinel and blanks map to `None`.
fn contact_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    let value = object.get(field)?.as_str()?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(NOT_FOUND) || value == "未提取" {
        None
    } else {
        Some(value.to_string())
    }
}
