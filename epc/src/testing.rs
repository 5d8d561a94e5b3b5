//! Test doubles for the external collaborator and invocation contexts.
//!
//! [`MockCompiler`] stands in for the real script compiler: scripts are
//! registered by their source text and looked up verbatim, so tests control
//! exactly what a given script compiles to. Unregistered text yields a
//! compile error, which is how tests exercise the compile-failure pathway.

use std::collections::BTreeMap;

use serde_json::Value;

use epc_common::protocol::{
    CompileError, CompiledFunction, ScriptCompiler, UserResult,
};
use epc_common::{InvocationContext, ResponseEnvelope};

/// Script-text to compiled-function table.
#[derive(Default)]
pub struct MockCompiler {
    scripts: BTreeMap<String, CompiledFunction>,
}

impl MockCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an envelope-style function under the given script text.
    #[must_use]
    pub fn with_envelope<F>(mut self, script: &str, func: F) -> Self
    where
        F: Fn(&[Value]) -> UserResult + Send + Sync + 'static,
    {
        self.scripts
            .insert(script.to_string(), CompiledFunction::envelope(func));
        self
    }

    /// Register a raw-transport function under the given script text.
    #[must_use]
    pub fn with_raw<F>(mut self, script: &str, func: F) -> Self
    where
        F: Fn(&InvocationContext) -> ResponseEnvelope + Send + Sync + 'static,
    {
        self.scripts
            .insert(script.to_string(), CompiledFunction::raw(func));
        self
    }
}

impl ScriptCompiler for MockCompiler {
    fn compile(&self, script: &str) -> Result<CompiledFunction, CompileError> {
        self.scripts
            .get(script)
            .cloned()
            .ok_or_else(|| CompileError::new(format!("unknown script: {script}")))
    }
}

/// Fluent construction of invocation contexts for tests.
///
/// Defaults to a POST request with no headers, secrets or body.
pub struct ContextBuilder {
    ctx: InvocationContext,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: InvocationContext {
                method: "POST".to_string(),
                ..InvocationContext::default()
            },
        }
    }

    #[must_use]
    pub fn method(mut self, method: &str) -> Self {
        self.ctx.method = method.to_string();
        self
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.ctx
            .headers
            .insert(name.to_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn secret(mut self, name: &str, value: &str) -> Self {
        self.ctx
            .secrets
            .insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.ctx
            .query
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Set an already-parsed body.
    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.ctx.body = Some(body);
        self
    }

    /// Set an unparsed payload, leaving parsing to the response adapter.
    #[must_use]
    pub fn raw_body(mut self, raw: &str) -> Self {
        self.ctx.raw_body = Some(raw.to_string());
        self
    }

    pub fn build(self) -> InvocationContext {
        self.ctx
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
