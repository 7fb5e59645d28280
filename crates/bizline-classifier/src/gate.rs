//! The single-flight gate guarding the classification backend
//!
//! At most one account holds the gate at a time. Callers that find it held
//! are turned away immediately with the holder's identity; nobody waits.

use bizline_domain::AccountId;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::debug;

/// Gate state: the holder fields exist only while the gate is held
#[derive(Debug, Default)]
enum GateState {
    #[default]
    Free,
    Held {
        owner: AccountId,
        since: Instant,
    },
}

/// Process-wide gate over the classification backend
///
/// Create one per service and share it by `Arc`.
#[derive(Debug, Default)]
pub struct Gate {
    state: Mutex<GateState>,
}

/// Result of a non-blocking acquisition attempt
#[derive(Debug)]
pub enum AcquireResult {
    /// The caller now holds the gate until the guard is released or dropped
    Granted(GateGuard),

    /// Another account holds the gate
    Denied {
        /// The current holder
        owner: AccountId,
    },
}

/// Snapshot of the gate for observability
#[derive(Debug, Clone, PartialEq)]
pub struct GateStatus {
    /// Whether the gate is held
    pub busy: bool,

    /// The holder, when busy
    pub owner: Option<AccountId>,

    /// Seconds since the gate was acquired, zero when free
    pub elapsed_seconds: f64,
}

impl Gate {
    /// Create a new, free gate
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // The critical sections below cannot panic, so a poisoned lock still
        // holds a consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Try to take the gate for `account` without waiting
    pub fn try_acquire(self: &Arc<Self>, account: &AccountId) -> AcquireResult {
        let mut state = self.lock();
        match &*state {
            GateState::Held { owner, .. } => {
                debug!(requester = %account, owner = %owner, "Gate denied");
                AcquireResult::Denied {
                    owner: owner.clone(),
                }
            }
            GateState::Free => {
                *state = GateState::Held {
                    owner: account.clone(),
                    since: Instant::now(),
                };
                debug!(owner = %account, "Gate acquired");
                AcquireResult::Granted(GateGuard {
                    gate: Arc::clone(self),
                    owner: account.clone(),
                })
            }
        }
    }

    /// Clear the holder unconditionally
    fn release(&self) {
        *self.lock() = GateState::Free;
    }

    /// Current state of the gate
    ///
    /// Takes the gate lock briefly and never waits on a holder, so the busy
    /// flag, owner and elapsed time are one consistent snapshot.
    pub fn status(&self) -> GateStatus {
        match &*self.lock() {
            GateState::Free => GateStatus {
                busy: false,
                owner: None,
                elapsed_seconds: 0.0,
            },
            GateState::Held { owner, since } => GateStatus {
                busy: true,
                owner: Some(owner.clone()),
                elapsed_seconds: since.elapsed().as_secs_f64(),
            },
        }
    }

    /// Whether the gate is currently held
    pub fn is_busy(&self) -> bool {
        matches!(*self.lock(), GateState::Held { .. })
    }
}

/// Proof of holding the gate; releases it when dropped
///
/// Dropping covers every exit path: normal return, error, panic unwinding and
/// task cancellation.
#[derive(Debug)]
#[must_use = "the gate is released as soon as the guard is dropped"]
pub struct GateGuard {
    gate: Arc<Gate>,
    owner: AccountId,
}

impl GateGuard {
    /// The account holding the gate
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Release the gate now
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.gate.release();
        debug!(owner = %self.owner, "Gate released");
    }
}
