use crate::core::actions::cancellation::CancelToken;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// How often a paused worker rechecks for cancellation.
const PAUSE_RECHECK_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Default)]
struct Gate {
    paused: Mutex<bool>,
    resumed: Condvar,
}

/// One pause gate per worker slot. Workers pass through their gate at
/// regular row intervals and block there while it is closed.
#[derive(Debug)]
pub struct PauseGates {
    gates: Vec<Gate>,
}

impl PauseGates {
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            gates: (0..slots).map(|_| Gate::default()).collect(),
        }
    }

    #[must_use]
    pub fn slots(&self) -> usize {
        self.gates.len()
    }

    pub fn pause(&self, slot: usize) {
        if let Some(gate) = self.gates.get(slot) {
            *lock(gate) = true;
        }
    }

    pub fn resume(&self, slot: usize) {
        if let Some(gate) = self.gates.get(slot) {
            *lock(gate) = false;
            gate.resumed.notify_all();
        }
    }

    pub fn pause_all(&self) {
        (0..self.gates.len()).for_each(|slot| self.pause(slot));
    }

    pub fn resume_all(&self) {
        (0..self.gates.len()).for_each(|slot| self.resume(slot));
    }

    #[must_use]
    pub fn is_paused(&self, slot: usize) -> bool {
        self.gates.get(slot).is_some_and(|gate| *lock(gate))
    }

    /// Blocks while `slot` is paused. Cancellation releases the worker.
    pub fn checkpoint(&self, slot: usize, cancel: &dyn CancelToken) {
        let Some(gate) = self.gates.get(slot) else {
            return;
        };

        let mut paused = lock(gate);
        while *paused && !cancel.is_cancelled() {
            paused = gate
                .resumed
                .wait_timeout(paused, PAUSE_RECHECK_INTERVAL)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }
}

fn lock(gate: &Gate) -> MutexGuard<'_, bool> {
    gate.paused.lock().unwrap_or_else(PoisonError::into_inner)
}
