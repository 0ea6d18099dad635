use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_smithy_mocks::{mock, mock_client, Rule};
use aws_smithy_types::Blob;
use client::{ClientConfig, ServiceClient};
use dispatch_lambda::LambdaDispatcher;
use model::{Determinism, ErrorKind, ExecuteRequest};
use serde_json::json;
use std::sync::Arc;
use test_utils::{create_failing_lambda_client, create_mock_lambda_client, TEST_NAMESPACE};

fn client_over(lambda: aws_sdk_lambda::Client) -> ServiceClient {
    ServiceClient::new(
        ClientConfig::new(TEST_NAMESPACE),
        Arc::new(LambdaDispatcher::new(lambda)),
    )
}

#[tokio::test]
async fn invokes_the_function_within_the_namespace() {
    // Only answers for the resolved name, so a bad namespace join fails loudly
    let invoke_rule: Rule = mock!(aws_sdk_lambda::Client::invoke)
        .match_requests(|req| req.function_name() == Some("images-resize"))
        .then_output(|| {
            InvokeOutput::builder()
                .status_code(200)
                .payload(Blob::new(r#"{ "status": "resized" }"#))
                .build()
        });
    let client: ServiceClient = client_over(mock_client!(aws_sdk_lambda, [&invoke_rule]));

    let response: serde_json::Value = client
        .execute(ExecuteRequest::new("resize", &json!({ "id": "item_1" })).unwrap())
        .await
        .expect("invocation should succeed");

    assert_eq!(json!({ "status": "resized" }), response);
}

#[tokio::test]
async fn deterministic_callers_all_see_the_raw_response() {
    // Overlap accounting lives in the unit tests against the counting
    // dispatcher; over the mocked SDK client what matters is that every
    // caller resolves with the backend payload untouched
    let client: ServiceClient =
        client_over(create_mock_lambda_client(r#"{ "status": "resized" }"#));

    let results: Vec<_> = futures::future::join_all((0..3).map(|_| {
        client.execute(
            ExecuteRequest::time_deterministic("resize", &json!({ "id": "item_1" })).unwrap(),
        )
    }))
    .await;

    for result in results {
        assert_eq!(json!({ "status": "resized" }), result.unwrap());
    }
}

#[tokio::test]
async fn error_response_surfaces_as_an_invocation_error() {
    let client: ServiceClient = client_over(create_failing_lambda_client(
        "Unhandled",
        r#"{ "errorMessage": "missing data" }"#,
    ));

    let err = client
        .execute(ExecuteRequest::new("resize", &json!({ "missing": "data" })).unwrap())
        .await
        .expect_err("invocation should fail");

    // Distinguishable from a transport failure by kind alone
    assert_eq!(ErrorKind::Invocation, err.kind());
}

#[tokio::test]
async fn settled_fingerprints_are_not_cached() {
    // Two distinct responses in sequence: if the second call were served from
    // the first settlement it would see the first body again
    let invoke_rule: Rule = mock!(aws_sdk_lambda::Client::invoke)
        .match_requests(|_| true)
        .sequence()
        .output(|| {
            InvokeOutput::builder()
                .status_code(200)
                .payload(Blob::new(r#"{ "revision": 1 }"#))
                .build()
        })
        .output(|| {
            InvokeOutput::builder()
                .status_code(200)
                .payload(Blob::new(r#"{ "revision": 2 }"#))
                .build()
        })
        .build();
    let client: ServiceClient = client_over(mock_client!(aws_sdk_lambda, [&invoke_rule]));

    let request: ExecuteRequest = ExecuteRequest::from_value(
        "resize",
        json!({ "id": "item_1" }),
        Determinism::TimeDeterministic,
    );

    let first: serde_json::Value = client.execute(request.clone()).await.unwrap();
    let second: serde_json::Value = client.execute(request).await.unwrap();

    assert_eq!(json!({ "revision": 1 }), first);
    assert_eq!(json!({ "revision": 2 }), second);
}
