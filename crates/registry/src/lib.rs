use fingerprint::FingerprintKey;
use model::ExecuteError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// The outcome shared by every caller of one deduplicated invocation.
pub type Settlement = Result<serde_json::Value, ExecuteError>;

type PendingMap = Arc<Mutex<HashMap<FingerprintKey, PendingInvocation>>>;

/// A pending entry lives from the leader's acquisition until settlement.
/// Followers park a sender here and await the paired receiver.
struct PendingInvocation {
    waiters: Vec<oneshot::Sender<Settlement>>,
}

/// Tracks invocations currently in flight, keyed by fingerprint.
///
/// For a given key at most one caller holds the `Leader` role at a time; the
/// lookup and insert happen under a single lock acquisition so two concurrent
/// callers can never both lead. The lock is only ever held across map
/// mutation, never across the remote call itself, so slow invocations don't
/// stall unrelated keys.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    pending: PendingMap,
}

/// The role handed to a caller for one key.
pub enum Admission {
    /// This caller performs the remote call and settles the entry.
    Leader(LeaderGuard),
    /// Another caller is already in flight; await its settlement.
    Follower(WaitHandle),
}

impl InFlightRegistry {
    pub fn new() -> InFlightRegistry {
        InFlightRegistry::default()
    }

    /// Claim the key or join whoever already holds it.
    pub fn acquire_or_join(&self, key: &FingerprintKey) -> Admission {
        let mut pending = self.pending.lock().unwrap();

        match pending.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let (sender, receiver) = oneshot::channel();
                entry.get_mut().waiters.push(sender);

                Admission::Follower(WaitHandle { receiver })
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingInvocation {
                    waiters: Vec::new(),
                });

                Admission::Leader(LeaderGuard {
                    pending: self.pending.clone(),
                    key: key.clone(),
                    settled: false,
                })
            }
        }
    }

    /// Number of invocations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

/// Held by the one caller responsible for performing the remote call.
///
/// Settling retires the entry and wakes every follower. Dropping the guard
/// without settling (the leading task was cancelled) settles with a transport
/// failure instead, so followers never wait forever.
pub struct LeaderGuard {
    pending: PendingMap,
    key: FingerprintKey,
    settled: bool,
}

impl LeaderGuard {
    /// Publish the outcome to every waiter and retire the entry.
    /// A later call with the same fingerprint starts a fresh invocation.
    pub fn settle(mut self, outcome: &Settlement) {
        self.settled = true;

        notify_waiters(&self.pending, &self.key, outcome);
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        tracing::warn!(key = %self.key, "Leading caller abandoned before settling");

        let outcome: Settlement = Err(ExecuteError::transport(
            "invocation abandoned before a result was published",
        ));
        notify_waiters(&self.pending, &self.key, &outcome);
    }
}

/// Held by callers who joined an invocation someone else is performing.
pub struct WaitHandle {
    receiver: oneshot::Receiver<Settlement>,
}

impl WaitHandle {
    /// Suspend until the leading caller settles, then yield its exact outcome.
    pub async fn wait(self) -> Settlement {
        match self.receiver.await {
            Ok(outcome) => outcome,
            // Unreachable while the leader guard exists; kept as a transport
            // failure rather than a panic
            Err(_) => Err(ExecuteError::transport(
                "in-flight invocation disappeared before settling",
            )),
        }
    }
}

fn notify_waiters(pending: &PendingMap, key: &FingerprintKey, outcome: &Settlement) {
    let waiters: Vec<oneshot::Sender<Settlement>> = pending
        .lock()
        .unwrap()
        .remove(key)
        .map(|entry| entry.waiters)
        .unwrap_or_default();

    for waiter in waiters {
        // A follower that cancelled its wait is skipped
        let _ = waiter.send(outcome.clone());
    }
}
