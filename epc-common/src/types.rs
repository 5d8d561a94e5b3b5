//! Common types used across EPC components.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name of the deployment secret that toggles authorization enforcement.
pub const EXTENSION_SECRET: &str = "auth0-extension-secret";

/// Per-request context assembled by the hosting transport.
///
/// Read-only to the pipeline: validators derive fresh values from it but never
/// write back. `body` is present when the transport already parsed the
/// payload; otherwise `raw_body` carries the unparsed bytes and the response
/// adapter parses them for body-carrying methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationContext {
    /// HTTP method, e.g. "POST".
    #[serde(default)]
    pub method: String,
    /// Header name to value, names lowercased by the transport.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Query string parameters.
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Deployment secrets. Empty when no secrets are configured.
    #[serde(default)]
    pub secrets: BTreeMap<String, String>,
    /// Parsed request payload, when the transport parsed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Unparsed request payload. Never serialized into snapshots.
    #[serde(skip)]
    pub raw_body: Option<String>,
}

impl InvocationContext {
    /// Look up a header value, ignoring name case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a configured secret.
    pub fn secret(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    /// JSON snapshot of this context with the effective body substituted in.
    ///
    /// Attached as the `webtask` back-reference on context objects handed to
    /// user functions. Introspection only; the raw body is excluded.
    pub fn snapshot_with_body(&self, body: &Value) -> Value {
        let mut snapshot = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Default::default()));
        if let Value::Object(map) = &mut snapshot {
            if body.is_null() {
                map.remove("body");
            } else {
                map.insert("body".to_string(), body.clone());
            }
        }
        snapshot
    }
}
