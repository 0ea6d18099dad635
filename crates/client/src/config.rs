use model::env::LAMBDA_CLIENT_NAMESPACE;
use model::ExecuteError;

/// Static configuration for a `ServiceClient`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Namespace all of this client's handlers are deployed under
    pub namespace: String,
}

impl ClientConfig {
    pub fn new(namespace: impl Into<String>) -> ClientConfig {
        ClientConfig {
            namespace: namespace.into(),
        }
    }

    /// Pull the namespace from the environment, honouring a local `.env` file.
    pub fn from_env() -> Result<ClientConfig, ExecuteError> {
        dotenv::dotenv().ok();

        let namespace: String = std::env::var(LAMBDA_CLIENT_NAMESPACE).map_err(|_| {
            ExecuteError::configuration(format!(
                "Missing {} environment variable",
                LAMBDA_CLIENT_NAMESPACE
            ))
        })?;

        if namespace.is_empty() {
            return Err(ExecuteError::configuration(format!(
                "{} must not be empty",
                LAMBDA_CLIENT_NAMESPACE
            )));
        }

        Ok(ClientConfig { namespace })
    }

    /// Resolve the deployed function name for a handler in this namespace.
    pub fn function_name(&self, handler_name: &str) -> String {
        format!("{}-{}", self.namespace, handler_name)
    }
}
