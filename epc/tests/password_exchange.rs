//! Integration tests for the legacy password-exchange extensibility point.

use epc::testing::{ContextBuilder, MockCompiler};
use epc::{CompileOptions, CompiledHandler, Registry};
use serde_json::json;

fn compile(mock: &MockCompiler, script: &str) -> CompiledHandler {
    Registry::default()
        .compiler("password-exchange")
        .unwrap()
        .compile(CompileOptions {
            script,
            compiler: mock,
        })
}

#[test]
fn test_user_function_gets_three_arguments() {
    let mock = MockCompiler::new().with_envelope("args", |args| {
        Ok(Some(json!({
            "count": args.len(),
            "client": args[0],
            "audience": args[2],
        })))
    });
    let handler = compile(&mock, "args");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": { "id": "c" }, "scope": ["s"], "audience": "a" }))
            .build(),
    );

    assert_eq!(envelope.status_code, 200);
    let data = envelope.data().unwrap();
    assert_eq!(data["count"], 3);
    assert_eq!(data["client"]["id"], "c");
    assert_eq!(data["audience"], "a");
}

#[test]
fn test_access_token_passes_through_identity_adapter() {
    let mock = MockCompiler::new()
        .with_envelope("token", |_args| Ok(Some(json!("the-access-token"))));
    let handler = compile(&mock, "token");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "audience": "a" }))
            .build(),
    );

    // No {result, data} wrapper at the legacy point.
    assert_eq!(envelope.body, "\"the-access-token\"");
}

#[test]
fn test_shares_exchange_validation() {
    let mock = MockCompiler::new().with_envelope("noop", |_args| Ok(None));
    let handler = compile(&mock, "noop");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "scope": "scope", "audience": "a" }))
            .build(),
    );
    assert_eq!(envelope.status_code, 400);
    assert_eq!(
        envelope.data().unwrap()["detail"],
        "Body.scope received by extensibility point is neither empty nor an array"
    );
}

#[test]
fn test_script_errors_are_user_errors_here() {
    let mock = MockCompiler::new().with_envelope("fail", |_args| {
        Err(epc::ScriptError::invalid_request("code", "bad request"))
    });
    let handler = compile(&mock, "fail");

    let envelope = handler.invoke(
        &ContextBuilder::new()
            .body(json!({ "client": {}, "audience": "a" }))
            .build(),
    );

    // The legacy point has no typed outcome mapping: OAuth-class script
    // errors surface as plain user errors.
    assert_eq!(envelope.status_code, 500);
    let problem = envelope.data().unwrap();
    assert_eq!(problem["title"], "User Error");
    assert_eq!(problem["detail"], "bad request");
}
