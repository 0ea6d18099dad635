use async_trait::async_trait;
use model::{ExecuteError, InvocationError};
use std::fmt::{Display, Formatter};

/// How the client reaches the remote compute backend.
/// The production implementation invokes AWS Lambda; tests substitute their
/// own. Retry policy belongs to implementations, not to callers.
#[async_trait]
pub trait InvokeDispatcher: Send + Sync {
    /// Perform exactly one remote call against the resolved function.
    async fn invoke(
        &self,
        function_name: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError>;
}

/// Failures raised by a dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    // The backend could not be reached (connection, timeout, SDK failure)
    Transport { message: String },
    // The backend ran the handler and the handler reported a failure
    Invocation(InvocationError),
}

impl DispatchError {
    pub fn transport(message: impl Into<String>) -> DispatchError {
        DispatchError::Transport {
            message: message.into(),
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::Transport { message } => write!(f, "transport failure: {}", message),
            DispatchError::Invocation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<DispatchError> for ExecuteError {
    fn from(err: DispatchError) -> ExecuteError {
        match err {
            DispatchError::Transport { message } => ExecuteError::Transport { message },
            DispatchError::Invocation(inner) => ExecuteError::Invocation(inner),
        }
    }
}
