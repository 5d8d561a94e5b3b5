//! Authorization guard for extensibility points.
//!
//! Enforcement is toggled by the presence of the `auth0-extension-secret`
//! deployment secret: when it is absent or empty every request is authorized.
//! When configured, the `authorization` header must carry `Bearer <token>`
//! (scheme case-insensitive, whole value trimmed) with the token exactly
//! equal to the secret. The guard runs before any body parsing or validation
//! and has no side effects.

use std::sync::LazyLock;

use regex::Regex;

use epc_common::types::EXTENSION_SECRET;
use epc_common::{InvocationContext, PipelineError};

static BEARER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^bearer (.+)$").expect("bearer pattern is valid"));

/// Check whether the request is authorized for the deployment.
///
/// Failure carries no sensitive data: neither the configured secret nor the
/// presented credential appears in the error message.
pub fn authorize(ctx: &InvocationContext) -> Result<(), PipelineError> {
    let Some(secret) = ctx.secret(EXTENSION_SECRET).filter(|s| !s.is_empty()) else {
        // No secret configured means no enforcement.
        return Ok(());
    };

    let header = ctx.header("authorization").unwrap_or_default().trim();
    if let Some(captures) = BEARER.captures(header)
        && &captures[1] == secret
    {
        return Ok(());
    }

    tracing::debug!("request rejected by authorization guard");
    Err(PipelineError::unauthorized(
        "Unauthorized extensibility point",
    ))
}
