//! The send-phone-message extensibility point.
//!
//! User function signature: `(recipient, text, context)`. The context is the
//! inbound `body.context` passed through unchanged after validation.

use serde_json::Value;

use epc_common::{InvocationContext, PipelineError};

use crate::validate::{require_object, require_one_of, require_string};

use super::ExtensibilityPoint;

pub struct SendPhoneMessage;

impl ExtensibilityPoint for SendPhoneMessage {
    fn name(&self) -> &'static str {
        "send-phone-message"
    }

    fn map_arguments(
        &self,
        _ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError> {
        let body_obj = require_object(Some(body), "")?;
        let recipient = require_string(body_obj.get("recipient"), "recipient")?;
        let text = require_string(body_obj.get("text"), "text")?;
        let context = require_object(body_obj.get("context"), "context")?;

        require_one_of(
            context.get("message_type"),
            "context.message_type",
            &["sms", "voice"],
        )?;
        require_one_of(
            context.get("action"),
            "context.action",
            &["enrollment", "second-factor-authentication"],
        )?;
        require_string(context.get("language"), "context.language")?;
        require_string(context.get("code"), "context.code")?;
        require_string(context.get("ip"), "context.ip")?;
        require_string(context.get("user_agent"), "context.user_agent")?;

        // Client metadata is optional for now.
        if let Some(client) = context.get("client") {
            let client_obj = require_object(Some(client), "context.client")?;
            require_string(client_obj.get("client_id"), "context.client.client_id")?;
            require_string(client_obj.get("name"), "context.client.name")?;
            require_object(
                client_obj.get("client_metadata"),
                "context.client.client_metadata",
            )?;
        }
        require_object(context.get("user"), "context.user")?;

        Ok(vec![
            Value::String(recipient.to_string()),
            Value::String(text.to_string()),
            Value::Object(context.clone()),
        ])
    }
}
