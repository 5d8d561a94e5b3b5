//! Extension point compilers.
//!
//! Turns user-authored scripts into sanctioned handlers for named
//! extensibility points. Compilation of the script itself is delegated to an
//! external collaborator behind [`epc_common::ScriptCompiler`]; this crate
//! provides the surrounding contract: the authorization guard, per-point
//! payload validation, error normalization and response-envelope formatting.
//!
//! The entry point is the [`Registry`], which maps point names to their
//! [`Compiler`]. Compiling a script yields a [`CompiledHandler`] that the
//! hosting transport invokes once per request:
//!
//! ```ignore
//! let registry = Registry::new(&EpcConfig::default());
//! let compiler = registry.compiler("client-credentials-exchange").unwrap();
//! let handler = compiler.compile(CompileOptions { script, compiler: &nodejs });
//! let envelope = handler.invoke(&ctx);
//! ```

pub mod adapter;
pub mod authorization;
pub mod factory;
pub mod host;
pub mod points;
pub mod testing;
mod validate;

use std::collections::BTreeMap;
use std::sync::Arc;

use epc_common::EpcConfig;

use crate::points::{
    ClientCredentialsExchange, CredentialsExchange, ExtensibilityPoint, Generic, SendPhoneMessage,
    UserRegistration,
};

pub use crate::factory::{Compiler, CompiledHandler};
pub use epc_common::{
    CompileError, CompileOptions, CompiledFunction, ErrorKind, InvocationContext, PipelineError,
    Problem, ResponseEnvelope, ScriptCompiler, ScriptError, StatusMapping,
};

/// Maps extensibility-point names to their compiler configuration.
///
/// Immutable once constructed; one registry serves a whole deployment.
pub struct Registry {
    compilers: BTreeMap<&'static str, Compiler>,
}

impl Registry {
    /// Build the registry for a deployment configuration.
    pub fn new(config: &EpcConfig) -> Self {
        Self::with_status(config.status.clone())
    }

    /// Build the registry with an explicit status mapping.
    pub fn with_status(status: StatusMapping) -> Self {
        let points: Vec<Arc<dyn ExtensibilityPoint>> = vec![
            Arc::new(Generic),
            Arc::new(ClientCredentialsExchange),
            Arc::new(CredentialsExchange),
            Arc::new(UserRegistration::pre_user_registration()),
            Arc::new(UserRegistration::post_user_registration()),
            Arc::new(UserRegistration::post_change_password()),
            Arc::new(SendPhoneMessage),
        ];

        let mut compilers = BTreeMap::new();
        for point in points {
            let name = point.name();
            compilers.insert(name, Compiler::new(point, status.clone()));
        }
        Self { compilers }
    }

    /// Look up the compiler for a point name.
    pub fn compiler(&self, name: &str) -> Option<&Compiler> {
        self.compilers.get(name)
    }

    /// Registered point names, in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.compilers.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(&EpcConfig::default())
    }
}
