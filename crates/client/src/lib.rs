use dispatch::InvokeDispatcher;
use fingerprint::FingerprintKey;
use model::{ExecuteError, ExecuteRequest};
use registry::{Admission, InFlightRegistry, Settlement};
use std::sync::Arc;

mod config;

pub use config::ClientConfig;

/// Client for invoking remote handlers deployed under one namespace.
///
/// Concurrent `TIME_DETERMINISTIC` requests with equal content are collapsed
/// into a single underlying call: the first caller performs the invocation and
/// every overlapping caller receives the identical outcome. Once an outcome is
/// published nothing is cached; a later identical request invokes again.
pub struct ServiceClient {
    config: ClientConfig,
    registry: InFlightRegistry,
    dispatcher: Arc<dyn InvokeDispatcher>,
}

impl ServiceClient {
    /// Create a new `ServiceClient` supplying all collaborators.
    pub fn new(config: ClientConfig, dispatcher: Arc<dyn InvokeDispatcher>) -> ServiceClient {
        ServiceClient {
            config,
            registry: InFlightRegistry::new(),
            dispatcher,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Invoke a handler and suspend until its outcome is available.
    ///
    /// The caller either leads a fresh invocation or joins one already in
    /// flight for the same fingerprint; in both cases the resolved value (or
    /// failure) is exactly what the underlying call produced.
    pub async fn execute(
        &self,
        request: ExecuteRequest,
    ) -> Result<serde_json::Value, ExecuteError> {
        let key: FingerprintKey = fingerprint::compute_key(
            &self.config.namespace,
            &request.handler_name,
            &request.event,
            request.determinism,
        )?;

        match self.registry.acquire_or_join(&key) {
            Admission::Leader(guard) => {
                tracing::debug!(handler_name = %request.handler_name, key = %key, "Leading invocation");

                let function_name: String = self.config.function_name(&request.handler_name);
                let outcome: Settlement = self
                    .dispatcher
                    .invoke(&function_name, request.event)
                    .await
                    .map_err(ExecuteError::from);

                if let Err(err) = &outcome {
                    tracing::warn!(handler_name = %request.handler_name, "Invocation failed: {err}");
                }

                // Publish to every joined caller before resolving our own
                guard.settle(&outcome);

                outcome
            }
            Admission::Follower(handle) => {
                tracing::debug!(handler_name = %request.handler_name, key = %key, "Joining in-flight invocation");

                handle.wait().await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch::DispatchError;
    use model::InvocationError;
    use serde_json::json;
    use std::time::Duration;
    use test_utils::{CountingDispatcher, TEST_NAMESPACE};

    fn test_client(dispatcher: &Arc<CountingDispatcher>) -> ServiceClient {
        ServiceClient::new(ClientConfig::new(TEST_NAMESPACE), dispatcher.clone())
    }

    fn deterministic_request() -> ExecuteRequest {
        ExecuteRequest::time_deterministic("resize", &json!({ "id": "item_1" }))
            .expect("request should build")
    }

    #[tokio::test]
    async fn concurrent_deterministic_calls_share_one_invocation() {
        let dispatcher: Arc<CountingDispatcher> = Arc::new(
            CountingDispatcher::returning(json!({ "status": "resized" }))
                .with_stall(Duration::from_millis(25)),
        );
        let client: ServiceClient = test_client(&dispatcher);

        let results: Vec<Result<serde_json::Value, ExecuteError>> =
            futures::future::join_all((0..4).map(|_| client.execute(deterministic_request())))
                .await;

        assert_eq!(1, dispatcher.calls());
        for result in results {
            assert_eq!(json!({ "status": "resized" }), result.unwrap());
        }
    }

    #[tokio::test]
    async fn sequential_deterministic_calls_invoke_again() {
        let dispatcher: Arc<CountingDispatcher> =
            Arc::new(CountingDispatcher::returning(json!({ "status": "resized" })));
        let client: ServiceClient = test_client(&dispatcher);

        client
            .execute(deterministic_request())
            .await
            .expect("first call should succeed");
        client
            .execute(deterministic_request())
            .await
            .expect("second call should succeed");

        // Settlement retired the entry, so nothing was cached across calls
        assert_eq!(2, dispatcher.calls());
    }

    #[tokio::test]
    async fn non_deterministic_calls_are_independent() {
        let dispatcher: Arc<CountingDispatcher> = Arc::new(
            CountingDispatcher::returning(json!({ "status": "resized" }))
                .with_stall(Duration::from_millis(25)),
        );
        let client: ServiceClient = test_client(&dispatcher);

        let request: ExecuteRequest =
            ExecuteRequest::new("resize", &json!({ "id": "item_1" })).expect("request should build");

        futures::future::join_all((0..4).map(|_| client.execute(request.clone()))).await;

        assert_eq!(4, dispatcher.calls());
    }

    #[tokio::test]
    async fn failure_reaches_every_caller_identically() {
        let backend_error: InvocationError = InvocationError {
            error_type: Some("Unhandled".to_string()),
            payload: json!({ "errorMessage": "missing data" }),
        };
        let dispatcher: Arc<CountingDispatcher> = Arc::new(
            CountingDispatcher::failing(DispatchError::Invocation(backend_error.clone()))
                .with_stall(Duration::from_millis(25)),
        );
        let client: ServiceClient = test_client(&dispatcher);

        let results: Vec<Result<serde_json::Value, ExecuteError>> =
            futures::future::join_all((0..3).map(|_| client.execute(deterministic_request())))
                .await;

        assert_eq!(1, dispatcher.calls());
        for result in results {
            assert_eq!(ExecuteError::Invocation(backend_error.clone()), result.unwrap_err());
        }
    }

    #[tokio::test]
    async fn mixed_payloads_do_not_collapse() {
        let dispatcher: Arc<CountingDispatcher> = Arc::new(
            CountingDispatcher::returning(json!({ "status": "resized" }))
                .with_stall(Duration::from_millis(25)),
        );
        let client: ServiceClient = test_client(&dispatcher);

        let first: ExecuteRequest =
            ExecuteRequest::time_deterministic("resize", &json!({ "id": "item_1" })).unwrap();
        let second: ExecuteRequest =
            ExecuteRequest::time_deterministic("resize", &json!({ "id": "item_2" })).unwrap();

        futures::future::join_all([client.execute(first), client.execute(second)]).await;

        assert_eq!(2, dispatcher.calls());
    }
}
