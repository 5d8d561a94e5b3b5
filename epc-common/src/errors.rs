//! Error taxonomy for the extension point pipeline.
//!
//! Every failure that terminates a request is a [`PipelineError`] carrying one
//! of the canonical [`ErrorKind`]s. Kinds map to HTTP statuses through a
//! [`StatusMapping`], which is a deployment configuration decision: historical
//! hosts disagreed on the codes (401 vs 403 vs 500 for authorization
//! failures), so the mapping is overridable rather than hard-coded.
//!
//! | Kind              | Code                   | Default status |
//! |-------------------|------------------------|----------------|
//! | BadRequest        | `bad_request`          | 400            |
//! | Unauthorized      | `unauthorized`         | 401            |
//! | BadImplementation | `bad_implementation`   | 500            |
//! | ScriptCompile     | `script_compile_error` | 500            |
//! | User              | `user_error`           | 500            |
//! | OAuth             | `oauth_error`          | 400            |
//! | Server            | `server_error`         | 500            |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical error kinds for pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed or structurally invalid payload.
    BadRequest,
    /// Missing or incorrect extension secret.
    Unauthorized,
    /// Internal fault, including serialization failures.
    BadImplementation,
    /// The user script could not be compiled.
    ScriptCompile,
    /// The user function reported a failure.
    User,
    /// OAuth-class error raised by a user function.
    OAuth,
    /// Server-class error raised by a user function.
    Server,
}

impl ErrorKind {
    /// Stable machine-readable code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::BadImplementation => "bad_implementation",
            Self::ScriptCompile => "script_compile_error",
            Self::User => "user_error",
            Self::OAuth => "oauth_error",
            Self::Server => "server_error",
        }
    }

    /// Human-readable title used in problem bodies.
    pub fn title(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::BadImplementation => "Bad Implementation",
            Self::ScriptCompile => "Script Compile Error",
            Self::User => "User Error",
            Self::OAuth => "OAuth Error",
            Self::Server => "Server Error",
        }
    }

    /// Default HTTP status for this kind.
    pub fn default_status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::OAuth => 400,
            Self::BadImplementation | Self::ScriptCompile | Self::User | Self::Server => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Per-kind HTTP status overrides.
///
/// Deserialized from the `[status]` config section; every field defaults to
/// the kind's semantic status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMapping {
    #[serde(default = "default_bad_request")]
    pub bad_request: u16,
    #[serde(default = "default_unauthorized")]
    pub unauthorized: u16,
    #[serde(default = "default_server_class")]
    pub bad_implementation: u16,
    #[serde(default = "default_server_class")]
    pub script_compile: u16,
    #[serde(default = "default_server_class")]
    pub user: u16,
    #[serde(default = "default_bad_request")]
    pub oauth: u16,
    #[serde(default = "default_server_class")]
    pub server: u16,
}

fn default_bad_request() -> u16 {
    400
}

fn default_unauthorized() -> u16 {
    401
}

fn default_server_class() -> u16 {
    500
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self {
            bad_request: default_bad_request(),
            unauthorized: default_unauthorized(),
            bad_implementation: default_server_class(),
            script_compile: default_server_class(),
            user: default_server_class(),
            oauth: default_bad_request(),
            server: default_server_class(),
        }
    }
}

impl StatusMapping {
    /// Resolve the HTTP status for an error kind.
    pub fn status_for(&self, kind: ErrorKind) -> u16 {
        match kind {
            ErrorKind::BadRequest => self.bad_request,
            ErrorKind::Unauthorized => self.unauthorized,
            ErrorKind::BadImplementation => self.bad_implementation,
            ErrorKind::ScriptCompile => self.script_compile,
            ErrorKind::User => self.user,
            ErrorKind::OAuth => self.oauth,
            ErrorKind::Server => self.server,
        }
    }
}

/// Terminal error for one request's processing.
///
/// `data` holds extension members merged into the outgoing problem body
/// (reserved problem fields are never overwritten).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn bad_implementation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadImplementation, message)
    }

    pub fn script_compile(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ScriptCompile, message)
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::User, message)
    }

    /// Attach extension members for the problem body.
    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_are_stable() {
        assert_eq!(ErrorKind::BadRequest.code(), "bad_request");
        assert_eq!(ErrorKind::Unauthorized.code(), "unauthorized");
        assert_eq!(ErrorKind::ScriptCompile.code(), "script_compile_error");
        assert_eq!(ErrorKind::OAuth.code(), "oauth_error");
    }

    #[test]
    fn test_default_mapping_matches_kind_defaults() {
        let mapping = StatusMapping::default();
        for kind in [
            ErrorKind::BadRequest,
            ErrorKind::Unauthorized,
            ErrorKind::BadImplementation,
            ErrorKind::ScriptCompile,
            ErrorKind::User,
            ErrorKind::OAuth,
            ErrorKind::Server,
        ] {
            assert_eq!(mapping.status_for(kind), kind.default_status());
        }
    }

    #[test]
    fn test_mapping_overrides_apply() {
        let mapping = StatusMapping {
            unauthorized: 403,
            bad_request: 500,
            ..StatusMapping::default()
        };
        assert_eq!(mapping.status_for(ErrorKind::Unauthorized), 403);
        assert_eq!(mapping.status_for(ErrorKind::BadRequest), 500);
        assert_eq!(mapping.status_for(ErrorKind::Server), 500);
    }

    #[test]
    fn test_mapping_deserializes_with_partial_fields() {
        let mapping: StatusMapping = toml::from_str("unauthorized = 403").unwrap();
        assert_eq!(mapping.unauthorized, 403);
        assert_eq!(mapping.bad_request, 400);
        assert_eq!(mapping.script_compile, 500);
    }

    #[test]
    fn test_pipeline_error_display_is_message() {
        let error = PipelineError::bad_request("Body received by extensibility point is not an object");
        assert_eq!(
            error.to_string(),
            "Body received by extensibility point is not an object"
        );
        assert_eq!(error.kind, ErrorKind::BadRequest);
        assert!(error.data.is_none());
    }

    #[test]
    fn test_with_data_attaches_extensions() {
        let error = PipelineError::script_compile("Unable to compile the extensibility code")
            .with_data(serde_json::json!({ "error_description": "unexpected token" }));
        assert_eq!(
            error.data.unwrap()["error_description"],
            "unexpected token"
        );
    }
}
