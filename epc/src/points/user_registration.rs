//! The user-registration family of extensibility points.
//!
//! Covers `pre-user-registration`, `post-user-registration` and
//! `post-change-password`, which share one payload schema and user-function
//! signature `(user, context)`. The context handed to the user function is a
//! shallow copy of `body.context` extended with the `webtask` back-reference.
//! A missing result value is replaced by an empty object so downstream
//! serialization always has a value.

use serde_json::{Value, json};

use epc_common::{InvocationContext, PipelineError};

use crate::validate::require_object;

use super::ExtensibilityPoint;

pub struct UserRegistration {
    name: &'static str,
}

impl UserRegistration {
    pub fn pre_user_registration() -> Self {
        Self {
            name: "pre-user-registration",
        }
    }

    pub fn post_user_registration() -> Self {
        Self {
            name: "post-user-registration",
        }
    }

    pub fn post_change_password() -> Self {
        Self {
            name: "post-change-password",
        }
    }
}

impl ExtensibilityPoint for UserRegistration {
    fn name(&self) -> &'static str {
        self.name
    }

    fn map_arguments(
        &self,
        ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError> {
        let body_obj = require_object(Some(body), "")?;
        let user = require_object(body_obj.get("user"), "user")?;
        let context_obj = require_object(body_obj.get("context"), "context")?;
        require_object(context_obj.get("connection"), "context.connection")?;

        let mut context = context_obj.clone();
        context.insert("webtask".to_string(), ctx.snapshot_with_body(body));

        Ok(vec![Value::Object(user.clone()), Value::Object(context)])
    }

    fn adapt_payload(&self, value: Option<Value>) -> Value {
        value.unwrap_or_else(|| json!({}))
    }
}
