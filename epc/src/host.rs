//! HTTP host surface for deployed extensibility points.
//!
//! Provides:
//! - `POST /points/{name}` - invoke the handler deployed at a point
//! - `GET /health` - host health and deployed point names
//!
//! The host owns the deployed handlers and the deployment secrets; the script
//! compiler is injected by the embedder at deploy time. Request bodies are
//! handed to handlers unparsed, leaving JSON parsing to the response adapter.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{
        HeaderMap, Method, StatusCode,
        header::{HeaderName, HeaderValue},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use thiserror::Error;

use epc_common::protocol::CompileOptions;
use epc_common::{EpcConfig, InvocationContext, Problem, ResponseEnvelope, ScriptCompiler};

use crate::Registry;
use crate::factory::CompiledHandler;

/// Errors surfaced while managing deployments.
#[derive(Debug, Error)]
pub enum HostError {
    /// The named extensibility point is not registered.
    #[error("unknown extensibility point: {0}")]
    UnknownPoint(String),
}

/// A set of deployed extensibility-point handlers behind one router.
pub struct Host {
    registry: Registry,
    secrets: BTreeMap<String, String>,
    handlers: BTreeMap<String, CompiledHandler>,
}

impl Host {
    pub fn new(config: &EpcConfig, secrets: BTreeMap<String, String>) -> Self {
        Self {
            registry: Registry::new(config),
            secrets,
            handlers: BTreeMap::new(),
        }
    }

    /// Deploy a script at a named point.
    ///
    /// Compile failures still deploy: the resulting handler reports the
    /// compile error on every invocation, which keeps error reporting on the
    /// uniform response pathway.
    pub fn deploy(
        &mut self,
        point: &str,
        script: &str,
        compiler: &dyn ScriptCompiler,
    ) -> Result<(), HostError> {
        let point_compiler = self
            .registry
            .compiler(point)
            .ok_or_else(|| HostError::UnknownPoint(point.to_string()))?;
        let handler = point_compiler.compile(CompileOptions { script, compiler });
        tracing::info!(point, "deployed extensibility point script");
        self.handlers.insert(point.to_string(), handler);
        Ok(())
    }

    /// Names of the deployed points, in lexical order.
    pub fn deployed(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Build the router serving this host's deployments.
    pub fn into_router(self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/points/{name}", post(invoke_handler))
            .with_state(Arc::new(self))
    }
}

async fn health_handler(State(host): State<Arc<Host>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "points": host.handlers.keys().collect::<Vec<_>>(),
    }))
}

async fn invoke_handler(
    State(host): State<Arc<Host>>,
    Path(name): Path<String>,
    Query(query): Query<BTreeMap<String, String>>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    let Some(handler) = host.handlers.get(&name) else {
        tracing::debug!(point = %name, "request for unknown extensibility point");
        let problem = Problem {
            title: "Not Found".to_string(),
            status: 404,
            detail: format!("No script deployed at extensibility point: {name}"),
            extensions: Default::default(),
        };
        let body = serde_json::to_string(&problem).unwrap_or_else(|_| "{}".to_string());
        return envelope_response(ResponseEnvelope::new(404, body));
    };

    let mut ctx = InvocationContext {
        method: method.to_string(),
        query,
        secrets: host.secrets.clone(),
        ..InvocationContext::default()
    };
    for (header_name, value) in &headers {
        if let Ok(value) = value.to_str() {
            ctx.headers
                .insert(header_name.as_str().to_string(), value.to_string());
        }
    }
    if !body.is_empty() {
        ctx.raw_body = Some(body);
    }

    envelope_response(handler.invoke(&ctx))
}

fn envelope_response(envelope: ResponseEnvelope) -> Response {
    let status = StatusCode::from_u16(envelope.status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut headers = HeaderMap::new();
    for (name, value) in &envelope.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            headers.insert(name, value);
        }
    }
    (status, headers, envelope.body).into_response()
}

/// Start serving a host on the given port.
///
/// # Returns
/// A handle to the spawned server task.
pub async fn start_server(
    port: u16,
    host: Host,
) -> tokio::task::JoinHandle<Result<(), std::io::Error>> {
    let router = host.into_router();
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Starting extensibility point host on port {}", port);

    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await
    })
}
