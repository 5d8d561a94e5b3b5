//! The client-credentials-exchange extensibility point.
//!
//! User function signature: `(client, scope, audience, context)`. The context
//! argument is the optional `body.context` object (an empty object when
//! absent) extended with the `webtask` back-reference.
//!
//! This point defines typed outcome mapping: every invocation that reaches the
//! user function responds with a `{result, data}` payload distinguishing
//! `success`, `oauth_error` and `user_error`, so OAuth-class failures raised
//! by user code travel as data rather than as transport errors.

use serde_json::{Map, Value, json};

use epc_common::protocol::UserResult;
use epc_common::{InvocationContext, PipelineError};

use crate::validate::{optional_array, require_object, require_string};

use super::ExtensibilityPoint;

pub struct ClientCredentialsExchange;

impl ExtensibilityPoint for ClientCredentialsExchange {
    fn name(&self) -> &'static str {
        "client-credentials-exchange"
    }

    fn map_arguments(
        &self,
        ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError> {
        let body_obj = require_object(Some(body), "")?;
        let client = require_object(body_obj.get("client"), "client")?;
        optional_array(body_obj.get("scope"), "scope")?;
        let audience = require_string(body_obj.get("audience"), "audience")?;

        let mut context = match body_obj.get("context").and_then(Value::as_object) {
            Some(map) => map.clone(),
            None => Map::new(),
        };
        context.insert("webtask".to_string(), ctx.snapshot_with_body(body));

        Ok(vec![
            Value::Object(client.clone()),
            body_obj.get("scope").cloned().unwrap_or(Value::Null),
            Value::String(audience.to_string()),
            Value::Object(context),
        ])
    }

    fn complete(&self, outcome: UserResult) -> Result<Value, PipelineError> {
        match outcome {
            Ok(value) => Ok(json!({
                "result": "success",
                "data": value.unwrap_or(Value::Null),
            })),
            Err(error) => match error.oauth_error() {
                Some(code) => Ok(json!({
                    "result": "oauth_error",
                    "data": {
                        "error": code,
                        "error_code": error.error_code(),
                        "error_description": error.to_string(),
                    },
                })),
                None => Ok(json!({
                    "result": "user_error",
                    "data": {
                        "error": "user_error",
                        "error_description": error.to_string(),
                    },
                })),
            },
        }
    }
}
