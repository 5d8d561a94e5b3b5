//! Response adapter: body acquisition, payload serialization and problem
//! rendering.
//!
//! The adapter owns the last mile of every request: it parses the raw payload
//! when the transport did not, serializes the success value, and renders
//! pipeline errors as RFC 7807 problem bodies. A serialization failure on the
//! success path recovers through the error path exactly once.

use serde_json::Value;

use epc_common::{InvocationContext, PipelineError, Problem, ResponseEnvelope, StatusMapping};

/// Emitted when even the problem body cannot be serialized. Terminal: this
/// path never recurses.
const FALLBACK_BODY: &str =
    r#"{"title":"Bad Implementation","status":500,"detail":"Error when JSON serializing the problem body"}"#;

fn method_carries_body(method: &str) -> bool {
    !matches!(
        method.to_ascii_uppercase().as_str(),
        "GET" | "HEAD" | "OPTIONS"
    )
}

/// Resolve the effective request body.
///
/// A body the transport already parsed wins. Otherwise, for methods that may
/// carry a body, the raw payload is JSON-parsed here; parse failure
/// short-circuits to the error path. Bodyless requests resolve to `Null`. The
/// caller's context is never mutated.
pub fn effective_body(ctx: &InvocationContext) -> Result<Value, PipelineError> {
    if let Some(body) = &ctx.body {
        return Ok(body.clone());
    }
    if let Some(raw) = &ctx.raw_body
        && method_carries_body(&ctx.method)
    {
        return serde_json::from_str(raw).map_err(|error| {
            PipelineError::bad_request(format!("Invalid JSON request body: {error}"))
        });
    }
    Ok(Value::Null)
}

/// Build the success envelope for a payload value.
pub fn respond(data: &Value, status: &StatusMapping) -> ResponseEnvelope {
    match serde_json::to_string(data) {
        Ok(body) => ResponseEnvelope::new(200, body),
        Err(error) => {
            tracing::warn!(%error, "payload serialization failed");
            // Recurses into the error path exactly once.
            respond_with_error(
                &PipelineError::bad_implementation(
                    "Error when JSON serializing the result of the extension point",
                ),
                status,
            )
        }
    }
}

/// Build the error envelope for a pipeline error.
pub fn respond_with_error(error: &PipelineError, status: &StatusMapping) -> ResponseEnvelope {
    let problem = Problem::from_error(error, status);
    let body = serde_json::to_string(&problem).unwrap_or_else(|_| FALLBACK_BODY.to_string());
    ResponseEnvelope::new(problem.status, body)
}
