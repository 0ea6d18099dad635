use async_trait::async_trait;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_smithy_mocks::{mock, mock_client, Rule};
use aws_smithy_types::Blob;
use dispatch::{DispatchError, InvokeDispatcher};
use model::env::LAMBDA_CLIENT_NAMESPACE;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test namespace value
pub const TEST_NAMESPACE: &str = "images";

/// Setup default environment variables used in testing
pub fn setup_default_env() {
    env::set_var(LAMBDA_CLIENT_NAMESPACE, TEST_NAMESPACE);
}

/// A default mock Lambda client which returns a fixed JSON body for every invoke
pub fn create_mock_lambda_client(body: &'static str) -> aws_sdk_lambda::Client {
    let invoke_rule: Rule = mock!(aws_sdk_lambda::Client::invoke)
        .match_requests(|_| true)
        .sequence()
        .output(move || {
            InvokeOutput::builder()
                .status_code(200)
                .payload(Blob::new(body))
                .build()
        })
        .repeatedly()
        .build();

    mock_client!(aws_sdk_lambda, [&invoke_rule])
}

/// A mock Lambda client whose handler reports a failure on every invoke
pub fn create_failing_lambda_client(
    marker: &'static str,
    body: &'static str,
) -> aws_sdk_lambda::Client {
    let invoke_rule: Rule = mock!(aws_sdk_lambda::Client::invoke)
        .match_requests(|_| true)
        .sequence()
        .output(move || {
            InvokeOutput::builder()
                .status_code(200)
                .function_error(marker)
                .payload(Blob::new(body))
                .build()
        })
        .repeatedly()
        .build();

    mock_client!(aws_sdk_lambda, [&invoke_rule])
}

/// Dispatcher returning a canned outcome while counting how many remote calls
/// were actually performed. An optional stall keeps the call in flight long
/// enough for concurrent callers to pile up behind it.
pub struct CountingDispatcher {
    calls: AtomicUsize,
    outcome: Result<serde_json::Value, DispatchError>,
    stall: Option<Duration>,
}

impl CountingDispatcher {
    pub fn returning(value: serde_json::Value) -> CountingDispatcher {
        CountingDispatcher {
            calls: AtomicUsize::new(0),
            outcome: Ok(value),
            stall: None,
        }
    }

    pub fn failing(error: DispatchError) -> CountingDispatcher {
        CountingDispatcher {
            calls: AtomicUsize::new(0),
            outcome: Err(error),
            stall: None,
        }
    }

    pub fn with_stall(mut self, stall: Duration) -> CountingDispatcher {
        self.stall = Some(stall);
        self
    }

    /// How many underlying calls have been performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvokeDispatcher for CountingDispatcher {
    async fn invoke(
        &self,
        _function_name: &str,
        _payload: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }

        self.outcome.clone()
    }
}
