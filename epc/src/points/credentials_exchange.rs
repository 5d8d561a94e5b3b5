//! The password-exchange extensibility point (legacy credentials exchange).
//!
//! Predates the context argument: user function signature is
//! `(client, scope, audience)` and the result value passes through the
//! identity payload adapter. Kept registered for deployments that still
//! target the old name.

use serde_json::Value;

use epc_common::{InvocationContext, PipelineError};

use crate::validate::{optional_array, require_object, require_string};

use super::ExtensibilityPoint;

pub struct CredentialsExchange;

impl ExtensibilityPoint for CredentialsExchange {
    fn name(&self) -> &'static str {
        "password-exchange"
    }

    fn map_arguments(
        &self,
        _ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError> {
        let body_obj = require_object(Some(body), "")?;
        let client = require_object(body_obj.get("client"), "client")?;
        optional_array(body_obj.get("scope"), "scope")?;
        let audience = require_string(body_obj.get("audience"), "audience")?;

        Ok(vec![
            Value::Object(client.clone()),
            body_obj.get("scope").cloned().unwrap_or(Value::Null),
            Value::String(audience.to_string()),
        ])
    }
}
