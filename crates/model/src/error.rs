use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Errors surfaced by `execute`.
/// Deduplicated callers all receive the same variant with the same content,
/// so every variant is cheap to clone and comparable.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecuteError {
    // The client was misconfigured; never retried
    Configuration { message: String },
    // The backend could not be reached or did not answer in time
    Transport { message: String },
    // The backend ran the handler and the handler reported a failure
    Invocation(InvocationError),
}

/// Discriminant for matching on the error category without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Invocation,
}

/// An application-level failure reported by the backend.
/// Carries the backend's error payload verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationError {
    pub error_type: Option<String>,
    pub payload: serde_json::Value,
}

impl ExecuteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecuteError::Configuration { .. } => ErrorKind::Configuration,
            ExecuteError::Transport { .. } => ErrorKind::Transport,
            ExecuteError::Invocation(_) => ErrorKind::Invocation,
        }
    }

    pub fn configuration(message: impl Into<String>) -> ExecuteError {
        ExecuteError::Configuration {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> ExecuteError {
        ExecuteError::Transport {
            message: message.into(),
        }
    }
}

impl Display for ExecuteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::Configuration { message } => {
                write!(f, "configuration error: {}", message)
            }
            ExecuteError::Transport { message } => write!(f, "transport failure: {}", message),
            ExecuteError::Invocation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ExecuteError {}

impl Display for InvocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(error_type) => write!(f, "handler failed ({}): {}", error_type, self.payload),
            None => write!(f, "handler failed: {}", self.payload),
        }
    }
}

impl std::error::Error for InvocationError {}

impl From<InvocationError> for ExecuteError {
    fn from(err: InvocationError) -> ExecuteError {
        ExecuteError::Invocation(err)
    }
}
