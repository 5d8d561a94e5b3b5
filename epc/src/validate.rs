//! Structural payload checks shared by the point validators.
//!
//! The message text is part of the observable contract: callers assert on
//! strings of the form `"Body[.path] received by extensibility point is not
//! <expected>"`, so helpers build them in one place.

use serde_json::{Map, Value};

use epc_common::PipelineError;

fn label(path: &str) -> String {
    if path.is_empty() {
        "Body".to_string()
    } else {
        format!("Body.{path}")
    }
}

fn not_expected(path: &str, expected: &str) -> PipelineError {
    PipelineError::bad_request(format!(
        "{} received by extensibility point is not {expected}",
        label(path)
    ))
}

/// Require the value at `path` to be a JSON object.
pub(crate) fn require_object<'a>(
    value: Option<&'a Value>,
    path: &str,
) -> Result<&'a Map<String, Value>, PipelineError> {
    value
        .and_then(Value::as_object)
        .ok_or_else(|| not_expected(path, "an object"))
}

/// Require the value at `path` to be a string.
pub(crate) fn require_string<'a>(
    value: Option<&'a Value>,
    path: &str,
) -> Result<&'a str, PipelineError> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| not_expected(path, "a string"))
}

/// Require the value at `path` to be absent, null, or an array.
pub(crate) fn optional_array(value: Option<&Value>, path: &str) -> Result<(), PipelineError> {
    match value {
        None | Some(Value::Null) | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(PipelineError::bad_request(format!(
            "{} received by extensibility point is neither empty nor an array",
            label(path)
        ))),
    }
}

/// Require the value at `path` to be one of the allowed string constants.
pub(crate) fn require_one_of<'a>(
    value: Option<&'a Value>,
    path: &str,
    allowed: &[&str],
) -> Result<&'a str, PipelineError> {
    if let Some(text) = value.and_then(Value::as_str)
        && allowed.contains(&text)
    {
        return Ok(text);
    }
    let rendered = allowed
        .iter()
        .map(|v| format!("`{v}`"))
        .collect::<Vec<_>>()
        .join(" or ");
    Err(not_expected(path, &rendered))
}
