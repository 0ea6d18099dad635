use serde::{Deserialize, Serialize};

pub mod env;
mod error;

pub use error::{ErrorKind, ExecuteError, InvocationError};

pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Controls whether concurrent identical requests may share one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Determinism {
    /// Every request triggers its own invocation.
    #[default]
    None,
    /// Requests with equal (namespace, handler, event) issued while one of
    /// them is still in flight all resolve to that single invocation's
    /// outcome. Equality is content-only; the time of the call is ignored.
    TimeDeterministic,
}

/// A single request to invoke a remote handler.
/// The event payload is held in its JSON form so one outcome can be shared
/// verbatim between deduplicated callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub handler_name: String,
    pub event: serde_json::Value,
    pub determinism: Determinism,
}

impl ExecuteRequest {
    /// Build a request from any serializable payload.
    /// A payload with no JSON representation is a configuration error.
    pub fn new<T: Serialize>(
        handler_name: impl Into<String>,
        event: &T,
    ) -> Result<ExecuteRequest, ExecuteError> {
        Ok(ExecuteRequest {
            handler_name: handler_name.into(),
            event: to_event_value(event)?,
            determinism: Determinism::None,
        })
    }

    /// Build a request which deduplicates against concurrent identical calls.
    pub fn time_deterministic<T: Serialize>(
        handler_name: impl Into<String>,
        event: &T,
    ) -> Result<ExecuteRequest, ExecuteError> {
        Ok(ExecuteRequest {
            handler_name: handler_name.into(),
            event: to_event_value(event)?,
            determinism: Determinism::TimeDeterministic,
        })
    }

    pub fn from_value(
        handler_name: impl Into<String>,
        event: serde_json::Value,
        determinism: Determinism,
    ) -> ExecuteRequest {
        ExecuteRequest {
            handler_name: handler_name.into(),
            event,
            determinism,
        }
    }
}

fn to_event_value<T: Serialize>(event: &T) -> Result<serde_json::Value, ExecuteError> {
    serde_json::to_value(event).map_err(|err| {
        ExecuteError::configuration(format!("payload cannot be represented as JSON: {}", err))
    })
}
