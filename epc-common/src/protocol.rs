//! Contract with the external script-compiling collaborator.
//!
//! The compiler itself is a black box behind [`ScriptCompiler`]: it takes
//! source text and returns either a callable or a compile error. The callable
//! declares its interface through the [`CompiledFunction`] variant tag instead
//! of having its parameter count inspected at runtime: envelope functions run
//! inside the response pipeline, raw-transport functions build the response
//! themselves.
//!
//! User functions signal failures through [`ScriptError`], a fixed public
//! error type constructed directly by user code. This replaces the historical
//! approach of splicing error-class declarations into the script source, and
//! keeps no shared mutable state between compiled scripts.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::envelope::ResponseEnvelope;
use crate::types::InvocationContext;

/// Outcome of invoking a user function: an optional payload value, or a typed
/// script error.
pub type UserResult = Result<Option<Value>, ScriptError>;

/// A compiled user function running inside the response pipeline.
///
/// `args` are the ordered positional arguments produced by the point's
/// argument mapper; an absent optional argument is passed as `Value::Null`.
pub trait UserFunction: Send + Sync {
    fn call(&self, args: &[Value]) -> UserResult;
}

impl<F> UserFunction for F
where
    F: Fn(&[Value]) -> UserResult + Send + Sync,
{
    fn call(&self, args: &[Value]) -> UserResult {
        self(args)
    }
}

/// A compiled user function operating directly on the transport.
///
/// Bypasses envelope construction entirely; the function owns the full
/// response shape.
pub trait RawFunction: Send + Sync {
    fn call(&self, ctx: &InvocationContext) -> ResponseEnvelope;
}

impl<F> RawFunction for F
where
    F: Fn(&InvocationContext) -> ResponseEnvelope + Send + Sync,
{
    fn call(&self, ctx: &InvocationContext) -> ResponseEnvelope {
        self(ctx)
    }
}

/// The callable produced by the script compiler, tagged with its interface.
#[derive(Clone)]
pub enum CompiledFunction {
    /// Runs inside the pipeline; result is marshalled into the envelope.
    Envelope(Arc<dyn UserFunction>),
    /// Operates on the raw transport. Accepted by the `generic` point only.
    RawTransport(Arc<dyn RawFunction>),
}

impl CompiledFunction {
    /// Wrap a closure as an envelope-style function.
    pub fn envelope<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> UserResult + Send + Sync + 'static,
    {
        Self::Envelope(Arc::new(func))
    }

    /// Wrap a closure as a raw-transport function.
    pub fn raw<F>(func: F) -> Self
    where
        F: Fn(&InvocationContext) -> ResponseEnvelope + Send + Sync + 'static,
    {
        Self::RawTransport(Arc::new(func))
    }
}

impl std::fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Envelope(_) => f.write_str("CompiledFunction::Envelope"),
            Self::RawTransport(_) => f.write_str("CompiledFunction::RawTransport"),
        }
    }
}

/// Error reported by the external compiler for unparseable source.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// External script-compiling collaborator.
pub trait ScriptCompiler: Send + Sync {
    fn compile(&self, script: &str) -> Result<CompiledFunction, CompileError>;
}

/// Input to an extensibility-point compiler.
pub struct CompileOptions<'a> {
    /// Raw user script text.
    pub script: &'a str,
    /// The external compiler to delegate to.
    pub compiler: &'a dyn ScriptCompiler,
}

/// Typed failure surface available to user functions.
///
/// The OAuth-class variants carry the caller-chosen `code` and human
/// `description` that credential-exchange points marshal into their structured
/// error payloads. `Failed` is a deliberate, untyped failure.
#[derive(Debug, Clone, Error)]
pub enum ScriptError {
    #[error("{description}")]
    InvalidRequest { code: String, description: String },
    #[error("{description}")]
    InvalidScope { code: String, description: String },
    #[error("{description}")]
    Server { code: String, description: String },
    #[error("{0}")]
    Failed(String),
}

impl ScriptError {
    pub fn invalid_request(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::InvalidRequest {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn invalid_scope(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::InvalidScope {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn server(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self::Server {
            code: code.into(),
            description: description.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// OAuth wire identifier for the OAuth-class variants.
    pub fn oauth_error(&self) -> Option<&'static str> {
        match self {
            Self::InvalidRequest { .. } => Some("invalid_request"),
            Self::InvalidScope { .. } => Some("invalid_scope"),
            Self::Server { .. } => Some("server_error"),
            Self::Failed(_) => None,
        }
    }

    /// Caller-chosen error code for the OAuth-class variants.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { code, .. }
            | Self::InvalidScope { code, .. }
            | Self::Server { code, .. } => Some(code),
            Self::Failed(_) => None,
        }
    }
}
