//! Model id extraction from raw request bodies

use serde::Deserialize;
use thiserror::Error;

/// UTF-8 byte-order mark some clients prepend to JSON bodies
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Quoted field name looked for before attempting a parse
const MODEL_FIELD: &[u8] = b"\"model\"";

/// Why a body could not yield a model id
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("missing model in request body")]
    NoModelField,

    #[error("request body is not a JSON object: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct ModelField {
    #[serde(default)]
    model: Option<String>,
}

/// Extract the top-level `model` field from a JSON object body.
///
/// The substring check is only an early exit for bodies that cannot contain
/// the field; the parse result decides everything else. `body` is only
/// borrowed, so the caller forwards the exact bytes it received.
pub fn extract_model_id(body: &[u8]) -> Result<String, InspectError> {
    if !contains_ignore_ascii_case(body, MODEL_FIELD) {
        return Err(InspectError::NoModelField);
    }

    let json = trim_leading_noise(body);
    if json.first() != Some(&b'{') {
        // serde would happily read a struct from a JSON array
        return Err(InspectError::MalformedBody(serde::de::Error::custom(
            "expected a JSON object",
        )));
    }

    let parsed: ModelField = serde_json::from_slice(json)?;
    match parsed.model {
        Some(model) if !model.is_empty() => Ok(model),
        _ => Err(InspectError::NoModelField),
    }
}

fn contains_ignore_ascii_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

fn trim_leading_noise(body: &[u8]) -> &[u8] {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    &body[start..]
}
