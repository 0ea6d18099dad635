use model::{Determinism, ExecuteError};
use sha2::{Digest, Sha256};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// The identity of one logical invocation.
/// Requests which fingerprint identically while overlapping in time share a
/// single underlying call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FingerprintKey(String);

impl Display for FingerprintKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the identity key for a request.
///
/// Under `Determinism::None` every call gets a fresh key, so no two requests
/// can ever collapse into one invocation. Under `TimeDeterministic` the key is
/// a digest over (namespace, handler, event) with the event in canonical form,
/// so structurally equal requests produce equal keys regardless of when they
/// are issued or how their object keys were ordered at the call site.
pub fn compute_key(
    namespace: &str,
    handler_name: &str,
    event: &serde_json::Value,
    determinism: Determinism,
) -> Result<FingerprintKey, ExecuteError> {
    match determinism {
        Determinism::None => Ok(FingerprintKey(Uuid::new_v4().to_string())),
        Determinism::TimeDeterministic => {
            let canonical: String = canonical_event(event)?;

            let mut hasher = Sha256::new();
            // Length-prefix each component so component boundaries can't shift
            for part in [namespace, handler_name, canonical.as_str()] {
                hasher.update((part.len() as u64).to_be_bytes());
                hasher.update(part.as_bytes());
            }

            Ok(FingerprintKey(hex::encode(hasher.finalize())))
        }
    }
}

/// Serialize the event with stable object key ordering.
fn canonical_event(event: &serde_json::Value) -> Result<String, ExecuteError> {
    // serde_json keeps object entries in a sorted map, so rendering a Value
    // already yields a canonical form
    serde_json::to_string(event).map_err(|err| {
        ExecuteError::configuration(format!("payload cannot be canonically serialized: {}", err))
    })
}
