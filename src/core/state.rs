use crate::domain::model::ResolutionState;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Identifies one resolution attempt. Commits from any older attempt are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptToken(u64);

impl AttemptToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// The single observable `ResolutionState` container.
///
/// The attempt counter is only read or advanced inside the watch channel's
/// write lock, so a stale commit can never land between a newer attempt's
/// check and write.
pub struct StateCell {
    tx: watch::Sender<ResolutionState>,
    current: AtomicU64,
}

impl StateCell {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ResolutionState::Idle);
        Self {
            tx,
            current: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionState> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ResolutionState {
        self.tx.borrow().clone()
    }

    /// Starts a new attempt, superseding whatever is in flight.
    pub fn begin(&self, initial: ResolutionState) -> AttemptToken {
        let mut token = AttemptToken(0);
        self.tx.send_modify(|state| {
            token = AttemptToken(self.current.fetch_add(1, Ordering::SeqCst) + 1);
            *state = initial;
        });
        token
    }

    /// Replaces the state if `token` is still the latest attempt.
    pub fn commit(&self, token: AttemptToken, next: ResolutionState) -> bool {
        self.tx.send_if_modified(|state| {
            if self.current.load(Ordering::SeqCst) != token.0 {
                return false;
            }
            *state = next;
            true
        })
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
