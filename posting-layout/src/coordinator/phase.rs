//! Coordinator phases and the guard that serializes operations.

use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

/// Where the coordinator is in handling an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Ready to accept a drag or edit
    Idle,
    /// Building the new model (synchronous)
    Computing,
    /// Store writes in flight
    Persisting,
    /// Reading the authoritative tree back
    Reloading,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Computing => "computing",
            Phase::Persisting => "persisting",
            Phase::Reloading => "reloading",
        }
    }

    /// Whether the UI should accept drag input
    pub fn accepts_input(&self) -> bool {
        matches!(self, Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the coordinator out of `Idle` for the lifetime of one operation.
///
/// Dropping the guard, on success, error or cancellation, returns to `Idle`.
pub(crate) struct PhaseGuard<'a> {
    phase: &'a watch::Sender<Phase>,
}

impl<'a> PhaseGuard<'a> {
    /// Leave `Idle` for `Computing`, or report the phase that blocks us
    pub(crate) fn acquire(phase: &'a watch::Sender<Phase>) -> Result<Self, Phase> {
        let mut blocking = Phase::Idle;
        let acquired = phase.send_if_modified(|current| {
            if *current == Phase::Idle {
                *current = Phase::Computing;
                true
            } else {
                blocking = *current;
                false
            }
        });

        if acquired {
            debug!(phase = %Phase::Computing, "phase change");
            Ok(Self { phase })
        } else {
            Err(blocking)
        }
    }

    pub(crate) fn advance(&self, next: Phase) {
        debug!(phase = %next, "phase change");
        self.phase.send_replace(next);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(Phase::Idle);
        debug!(phase = %Phase::Idle, "phase change");
    }
}
