//! The generic extensibility point.
//!
//! Accepts any body shape and passes the whole invocation context through to
//! the user function. This is the only point that accepts raw-transport
//! functions, which receive the context and build the response themselves.

use serde_json::Value;

use epc_common::{InvocationContext, PipelineError};

use super::ExtensibilityPoint;

pub struct Generic;

impl ExtensibilityPoint for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn map_arguments(
        &self,
        ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError> {
        Ok(vec![ctx.snapshot_with_body(body)])
    }

    fn allows_raw_transport(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_passes_full_context_snapshot() {
        let mut ctx = InvocationContext::default();
        ctx.headers
            .insert("authorization".to_string(), "Bearer foo".to_string());

        let args = Generic
            .map_arguments(&ctx, &json!({ "id": "client" }))
            .unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0]["body"]["id"], "client");
        assert_eq!(args[0]["headers"]["authorization"], "Bearer foo");
    }

    #[test]
    fn test_accepts_any_body_shape() {
        let ctx = InvocationContext::default();
        assert!(Generic.map_arguments(&ctx, &json!("scalar")).is_ok());
        assert!(Generic.map_arguments(&ctx, &Value::Null).is_ok());
    }

    #[test]
    fn test_allows_raw_transport() {
        assert!(Generic.allows_raw_transport());
    }
}
