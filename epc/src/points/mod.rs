//! Extensibility point definitions.
//!
//! Each point owns its payload validation, the mapping from the inbound body
//! to the user function's ordered arguments, and the adaptation of the user
//! function's outcome into the success payload.

pub mod client_credentials_exchange;
pub mod credentials_exchange;
pub mod generic;
pub mod send_phone_message;
pub mod user_registration;

use serde_json::Value;

use epc_common::protocol::UserResult;
use epc_common::{InvocationContext, PipelineError};

pub use client_credentials_exchange::ClientCredentialsExchange;
pub use credentials_exchange::CredentialsExchange;
pub use generic::Generic;
pub use send_phone_message::SendPhoneMessage;
pub use user_registration::UserRegistration;

/// A named extensibility point: payload schema plus user-function signature.
pub trait ExtensibilityPoint: Send + Sync {
    /// Registered point name, e.g. `"client-credentials-exchange"`.
    fn name(&self) -> &'static str;

    /// Ordered structural checks over the effective body, failing fast on the
    /// first violation; returns the positional arguments for the user
    /// function. Must not mutate the inbound context; derived context objects
    /// are fresh values.
    fn map_arguments(
        &self,
        ctx: &InvocationContext,
        body: &Value,
    ) -> Result<Vec<Value>, PipelineError>;

    /// Adapt the user function's result value into the success payload.
    fn adapt_payload(&self, value: Option<Value>) -> Value {
        value.unwrap_or(Value::Null)
    }

    /// Map the user function's outcome to the response payload or a terminal
    /// error. Points with typed error mapping override this.
    fn complete(&self, outcome: UserResult) -> Result<Value, PipelineError> {
        match outcome {
            Ok(value) => Ok(self.adapt_payload(value)),
            Err(error) => Err(PipelineError::user(error.to_string())),
        }
    }

    /// Whether raw-transport functions are accepted at this point.
    fn allows_raw_transport(&self) -> bool {
        false
    }
}
