//! Integration tests for the client-credentials-exchange extensibility point.

use epc::testing::{ContextBuilder, MockCompiler};
use epc::{CompileOptions, CompiledHandler, Registry, ScriptError};
use epc_common::types::EXTENSION_SECRET;
use serde_json::{Value, json};

fn compile(mock: &MockCompiler, script: &str) -> CompiledHandler {
    Registry::default()
        .compiler("client-credentials-exchange")
        .unwrap()
        .compile(CompileOptions {
            script,
            compiler: mock,
        })
}

/// Mirrors a script returning `{ client, scope, audience }` with a marker
/// added to the client, omitting absent arguments the way user scripts do.
fn exchange_compiler() -> MockCompiler {
    MockCompiler::new().with_envelope("exchange", |args| {
        let mut client = args[0].clone();
        client["baz"] = json!("baz");
        let mut response = json!({ "client": client, "audience": args[2] });
        if !args[1].is_null() {
            response["scope"] = args[1].clone();
        }
        Ok(Some(response))
    })
}

#[test]
fn test_success_when_scope_is_undefined() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "client" }, "audience": "audience" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 200);
    let payload = envelope.data().unwrap();
    assert_eq!(payload["result"], "success");
    let data = &payload["data"];
    assert_eq!(data["client"]["id"], "client");
    assert_eq!(data["client"]["baz"], "baz");
    assert_eq!(data["client"].as_object().unwrap().len(), 2);
    assert!(data.get("scope").is_none());
    assert_eq!(data["audience"], "audience");
    assert_eq!(data.as_object().unwrap().len(), 2);
}

#[test]
fn test_success_modifying_and_returning_context() {
    let mock = MockCompiler::new().with_envelope("context", |args| {
        let mut context = args[3].clone();
        context["hello"] = json!("moon");
        context.as_object_mut().unwrap().remove("webtask");
        Ok(Some(json!({
            "client": args[0],
            "scope": args[1],
            "audience": args[2],
            "context": context,
        })))
    });
    let handler = compile(&mock, "context");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({
                "client": { "id": "client" },
                "scope": ["scope"],
                "audience": "audience",
                "context": { "hello": "world", "foo": "bar" },
            }))
            .build(),
    );

    let payload = envelope.data().unwrap();
    let data = &payload["data"];
    assert_eq!(data["scope"], json!(["scope"]));
    assert_eq!(data["context"]["hello"], "moon");
    assert_eq!(data["context"]["foo"], "bar");
    assert_eq!(data["context"].as_object().unwrap().len(), 2);
    assert_eq!(data.as_object().unwrap().len(), 4);
}

#[test]
fn test_success_authenticated() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .secret(EXTENSION_SECRET, "foo")
            .header("authorization", "Bearer foo")
            .body(json!({ "client": { "id": "client" }, "scope": ["scope"], "audience": "audience" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 200);
    assert_eq!(envelope.data().unwrap()["result"], "success");
}

#[test]
fn test_creates_default_empty_context_with_webtask_property() {
    let mock = MockCompiler::new().with_envelope("inspect-context", |args| {
        let context = args[3].as_object().unwrap();
        Ok(Some(json!({
            "length": context.len(),
            "webtask": context["webtask"].is_object(),
        })))
    });
    let handler = compile(&mock, "inspect-context");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "client" }, "scope": ["scope"], "audience": "audience" }))
            .build(),
    );

    let data = envelope.data().unwrap()["data"].clone();
    assert_eq!(data["length"], 1);
    assert_eq!(data["webtask"], true);
}

#[test]
fn test_webtask_back_reference_carries_request_context() {
    let mock = MockCompiler::new().with_envelope("inspect-webtask", |args| {
        Ok(Some(args[3]["webtask"].clone()))
    });
    let handler = compile(&mock, "inspect-webtask");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .header("x-trace", "on")
            .body(json!({ "client": {}, "audience": "a" }))
            .build(),
    );

    let webtask = envelope.data().unwrap()["data"].clone();
    assert_eq!(webtask["method"], "POST");
    assert_eq!(webtask["headers"]["x-trace"], "on");
    assert_eq!(webtask["body"]["audience"], "a");
}

#[test]
fn test_rejects_calls_with_invalid_payload() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(&ContextBuilder::new().body(json!("no good")).build());
    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.data().unwrap()["detail"],
        "Body received by extensibility point is not an object"
    );
}

#[test]
fn test_rejects_calls_with_bad_client() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": "client", "audience": "audience" }))
            .build(),
    );
    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.data().unwrap()["detail"],
        "Body.client received by extensibility point is not an object"
    );
}

#[test]
fn test_rejects_calls_with_bad_scope() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "scope": "scope", "audience": "audience" }))
            .build(),
    );
    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.data().unwrap()["detail"],
        "Body.scope received by extensibility point is neither empty nor an array"
    );
}

#[test]
fn test_rejects_calls_with_bad_audience() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "scope": ["scope"], "audience": [] }))
            .build(),
    );
    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.data().unwrap()["detail"],
        "Body.audience received by extensibility point is not a string"
    );
}

#[test]
fn test_rejects_calls_without_authorization_secret() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .secret(EXTENSION_SECRET, "foo")
            .body(json!({ "client": { "id": "client" }, "scope": ["scope"], "audience": "audience" }))
            .build(),
    );
    assert_eq!(envelope.status_code, 401);
}

#[test]
fn test_rejects_calls_with_wrong_authorization_secret() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .secret(EXTENSION_SECRET, "foo")
            .header("authorization", "Bearer bar")
            .body(json!({ "client": { "id": "client" }, "scope": ["scope"], "audience": "audience" }))
            .build(),
    );
    assert_eq!(envelope.status_code, 401);
}

#[test]
fn test_transforms_invalid_request_errors_into_an_error_payload() {
    let mock = MockCompiler::new().with_envelope("invalid-request", |_args| {
        Err(ScriptError::invalid_request("custom-error-code", "bad request"))
    });
    let handler = compile(&mock, "invalid-request");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "client" }, "audience": "audience" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 200);
    let payload = envelope.data().unwrap();
    assert_eq!(payload["result"], "oauth_error");
    assert_eq!(payload["data"]["error"], "invalid_request");
    assert_eq!(payload["data"]["error_code"], "custom-error-code");
    assert_eq!(payload["data"]["error_description"], "bad request");
}

#[test]
fn test_transforms_invalid_scope_errors_into_an_error_payload() {
    let mock = MockCompiler::new().with_envelope("invalid-scope", |_args| {
        Err(ScriptError::invalid_scope("custom-error-code", "bad scope"))
    });
    let handler = compile(&mock, "invalid-scope");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "client" }, "audience": "audience" }))
            .build(),
    );

    let payload = envelope.data().unwrap();
    assert_eq!(payload["result"], "oauth_error");
    assert_eq!(payload["data"]["error"], "invalid_scope");
    assert_eq!(payload["data"]["error_description"], "bad scope");
}

#[test]
fn test_transforms_server_errors_into_an_error_payload() {
    let mock = MockCompiler::new().with_envelope("server-error", |_args| {
        Err(ScriptError::server("custom-error-code", "server failure"))
    });
    let handler = compile(&mock, "server-error");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "client" }, "audience": "audience" }))
            .build(),
    );

    let payload = envelope.data().unwrap();
    assert_eq!(payload["result"], "oauth_error");
    assert_eq!(payload["data"]["error"], "server_error");
    assert_eq!(payload["data"]["error_code"], "custom-error-code");
    assert_eq!(payload["data"]["error_description"], "server failure");
}

#[test]
fn test_untyped_failures_become_user_error_payloads() {
    let mock = MockCompiler::new()
        .with_envelope("failed", |_args| Err(ScriptError::failed("something broke")));
    let handler = compile(&mock, "failed");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "audience": "a" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 200);
    let payload = envelope.data().unwrap();
    assert_eq!(payload["result"], "user_error");
    assert_eq!(payload["data"]["error"], "user_error");
    assert_eq!(payload["data"]["error_description"], "something broke");
}

#[test]
fn test_compile_failure_reports_through_the_same_pathway() {
    let mock = MockCompiler::new();
    let handler = compile(&mock, "not registered");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "audience": "a" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 500);
    let data = envelope.data().unwrap();
    assert_eq!(data["title"], "Script Compile Error");
    assert_eq!(data["detail"], "Unable to compile the extensibility code");
}

#[test]
fn test_validation_does_not_mutate_the_inbound_context() {
    let mock = exchange_compiler();
    let handler = compile(&mock, "exchange");

    let ctx = ContextBuilder::new()
        .body(json!({ "client": { "id": "client" }, "audience": "audience" }))
        .build();
    let before: Value = serde_json::to_value(&ctx).unwrap();
    let _ = handler.invoke(&ctx);
    assert_eq!(serde_json::to_value(&ctx).unwrap(), before);
}
