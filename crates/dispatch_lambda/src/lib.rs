use async_trait::async_trait;
use aws_sdk_lambda::operation::invoke::InvokeOutput;
use aws_sdk_lambda::types::InvocationType;
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::Blob;
use dispatch::{DispatchError, InvokeDispatcher};
use model::InvocationError;

/// Dispatcher backed by the AWS Lambda Invoke API.
pub struct LambdaDispatcher {
    lambda: aws_sdk_lambda::Client,
}

impl LambdaDispatcher {
    pub fn new(lambda: aws_sdk_lambda::Client) -> LambdaDispatcher {
        LambdaDispatcher { lambda }
    }
}

#[async_trait]
impl InvokeDispatcher for LambdaDispatcher {
    async fn invoke(
        &self,
        function_name: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError> {
        let body: Vec<u8> = serde_json::to_vec(&payload)
            .map_err(|err| DispatchError::transport(format!("unsendable payload: {}", err)))?;

        tracing::debug!(function_name, "Invoking function");

        let output: InvokeOutput = self
            .lambda
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|err| {
                DispatchError::transport(format!("{}", DisplayErrorContext(&err)))
            })?;

        let response: serde_json::Value = decode_payload(output.payload())?;

        // The invoke call itself succeeded but the handler reported a failure;
        // its error payload is passed through untouched
        if let Some(marker) = output.function_error() {
            tracing::debug!(function_name, marker, "Function reported an error");

            return Err(DispatchError::Invocation(InvocationError {
                error_type: Some(marker.to_string()),
                payload: response,
            }));
        }

        Ok(response)
    }
}

fn decode_payload(blob: Option<&Blob>) -> Result<serde_json::Value, DispatchError> {
    match blob {
        Some(blob) if !blob.as_ref().is_empty() => serde_json::from_slice(blob.as_ref())
            .map_err(|err| {
                DispatchError::transport(format!("undecodable response payload: {}", err))
            }),
        _ => Ok(serde_json::Value::Null),
    }
}
