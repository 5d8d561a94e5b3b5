//! Response envelope and RFC 7807 problem body.
//!
//! Exactly one envelope is produced per handler invocation. Error responses
//! use the problem shape `{title, status, detail}` uniformly; no stack traces
//! are ever emitted.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{PipelineError, StatusMapping};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Normalized HTTP response written to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// Serialized JSON payload.
    pub body: String,
}

impl ResponseEnvelope {
    /// Build an envelope with the given status and pre-serialized body.
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is in the success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Parse the body back into a JSON value. Test and introspection helper.
    pub fn data(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// RFC 7807 problem details body.
///
/// `extensions` are additional members carried by the error's `data`; reserved
/// fields are never overwritten by extensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl Problem {
    /// Render a pipeline error as a problem body using the configured status
    /// mapping.
    pub fn from_error(error: &PipelineError, status: &StatusMapping) -> Self {
        let mut extensions = Map::new();
        if let Some(Value::Object(data)) = &error.data {
            for (key, value) in data {
                if matches!(key.as_str(), "title" | "status" | "detail") {
                    continue;
                }
                extensions.insert(key.clone(), value.clone());
            }
        }

        Self {
            title: error.kind.title().to_string(),
            status: status.status_for(error.kind),
            detail: error.message.clone(),
            extensions,
        }
    }
}
