//! Compiler factory: turns user scripts into sanctioned request handlers.
//!
//! A [`Compiler`] binds one extensibility point to the configured status
//! mapping. Compiling delegates the script text to the external collaborator
//! and wraps whatever comes back: a successful compilation becomes a pipeline
//! handler (authorization guard, payload validator, user function, outcome
//! mapping, response adapter), a failed one becomes a synthetic handler that
//! reports the compile error through the same response pathway on every
//! invocation.

use std::sync::Arc;

use serde_json::{Value, json};

use epc_common::protocol::{CompileOptions, CompiledFunction, RawFunction, UserFunction};
use epc_common::{InvocationContext, PipelineError, ResponseEnvelope, StatusMapping};

use crate::adapter;
use crate::authorization::authorize;
use crate::points::ExtensibilityPoint;

/// Compiler for one registered extensibility point.
pub struct Compiler {
    point: Arc<dyn ExtensibilityPoint>,
    status: StatusMapping,
}

impl Compiler {
    pub(crate) fn new(point: Arc<dyn ExtensibilityPoint>, status: StatusMapping) -> Self {
        Self { point, status }
    }

    /// Name of the point this compiler serves.
    pub fn point_name(&self) -> &'static str {
        self.point.name()
    }

    /// Compile a user script into a handler.
    ///
    /// Never fails: compile errors produce a handler that reports them, so
    /// error reporting stays on the one response pathway.
    pub fn compile(&self, options: CompileOptions<'_>) -> CompiledHandler {
        let kind = match options.compiler.compile(options.script) {
            Err(error) => {
                tracing::warn!(point = self.point.name(), %error, "script compilation failed");
                HandlerKind::CompileFailure {
                    description: error.message,
                }
            }
            Ok(CompiledFunction::Envelope(func)) => HandlerKind::Envelope {
                point: Arc::clone(&self.point),
                func,
            },
            Ok(CompiledFunction::RawTransport(func)) if self.point.allows_raw_transport() => {
                HandlerKind::Raw { func }
            }
            Ok(CompiledFunction::RawTransport(_)) => {
                tracing::warn!(
                    point = self.point.name(),
                    "raw transport function rejected at envelope-only point"
                );
                HandlerKind::CompileFailure {
                    description: format!(
                        "extensibility point {} requires an envelope-style function",
                        self.point.name()
                    ),
                }
            }
        };

        CompiledHandler {
            status: self.status.clone(),
            kind,
        }
    }
}

/// The callable produced once per deployed script and invoked per request.
///
/// Holds no mutable state: invocations are independent and safe to run
/// concurrently, and each produces exactly one envelope.
pub struct CompiledHandler {
    status: StatusMapping,
    kind: HandlerKind,
}

enum HandlerKind {
    /// Full pipeline around an envelope-style user function.
    Envelope {
        point: Arc<dyn ExtensibilityPoint>,
        func: Arc<dyn UserFunction>,
    },
    /// Authorization guard only; the user function owns the response.
    Raw { func: Arc<dyn RawFunction> },
    /// The script did not compile; every invocation reports it.
    CompileFailure { description: String },
}

impl CompiledHandler {
    /// Handle one request.
    pub fn invoke(&self, ctx: &InvocationContext) -> ResponseEnvelope {
        match &self.kind {
            HandlerKind::CompileFailure { description } => {
                let error = PipelineError::script_compile("Unable to compile the extensibility code")
                    .with_data(json!({ "error_description": description }));
                adapter::respond_with_error(&error, &self.status)
            }
            HandlerKind::Raw { func } => match authorize(ctx) {
                Ok(()) => func.call(ctx),
                Err(error) => adapter::respond_with_error(&error, &self.status),
            },
            HandlerKind::Envelope { point, func } => {
                match run_pipeline(point.as_ref(), func.as_ref(), ctx) {
                    Ok(data) => adapter::respond(&data, &self.status),
                    Err(error) => {
                        tracing::debug!(
                            point = point.name(),
                            kind = %error.kind,
                            "request terminated by pipeline error"
                        );
                        adapter::respond_with_error(&error, &self.status)
                    }
                }
            }
        }
    }
}

fn run_pipeline(
    point: &dyn ExtensibilityPoint,
    func: &dyn UserFunction,
    ctx: &InvocationContext,
) -> Result<Value, PipelineError> {
    // Guard first: nothing from the caller is trusted before this passes.
    authorize(ctx)?;
    let body = adapter::effective_body(ctx)?;
    let args = point.map_arguments(ctx, &body)?;
    point.complete(func.call(&args))
}
