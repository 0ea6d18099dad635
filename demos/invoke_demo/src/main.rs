use aws_config::BehaviorVersion;
use client::{ClientConfig, ServiceClient};
use dispatch_lambda::LambdaDispatcher;
use model::{Error, ExecuteRequest};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Handler to invoke within the configured namespace
const EXECUTE_HANDLER_NAME: &'static str = "EXECUTE_HANDLER_NAME";
/// JSON payload to send
const EXECUTE_PAYLOAD: &'static str = "EXECUTE_PAYLOAD";

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config: ClientConfig = ClientConfig::from_env()?;
    let handler_name: String = std::env::var(EXECUTE_HANDLER_NAME)?;
    let payload: serde_json::Value = serde_json::from_str(&std::env::var(EXECUTE_PAYLOAD)?)?;

    let aws_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dispatcher: Arc<LambdaDispatcher> =
        Arc::new(LambdaDispatcher::new(aws_sdk_lambda::Client::new(&aws_config)));
    let client: ServiceClient = ServiceClient::new(config, dispatcher);

    tracing::info!(handler_name = %handler_name, "Invoking handler");

    let response: serde_json::Value = client
        .execute(ExecuteRequest::time_deterministic(handler_name, &payload)?)
        .await?;

    tracing::info!("Response: {response}");

    Ok(())
}
