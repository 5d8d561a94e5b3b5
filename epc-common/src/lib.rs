//! Shared types for Extension Point Compilers.
//!
//! This crate holds the leaf pieces of the pipeline contract: the error
//! taxonomy and status mapping, the per-request invocation context, the
//! response envelope and problem body, deployment configuration, and the
//! protocol with the external script-compiling collaborator. The pipeline
//! itself lives in the `epc` crate.

pub mod config;
pub mod envelope;
pub mod errors;
pub mod logging;
pub mod protocol;
pub mod types;

pub use config::{ConfigError, EpcConfig, GeneralConfig};
pub use envelope::{APPLICATION_JSON, CONTENT_TYPE, Problem, ResponseEnvelope};
pub use errors::{ErrorKind, PipelineError, StatusMapping};
pub use protocol::{
    CompileError, CompileOptions, CompiledFunction, RawFunction, ScriptCompiler, ScriptError,
    UserFunction, UserResult,
};
pub use types::{EXTENSION_SECRET, InvocationContext};
