use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Counting semaphore that marks the end of a pass.
///
/// The orchestrator drains one unit per worker before launching them and
/// each worker gives its unit back when it stops; the pass is over once the
/// barrier is full again.
#[derive(Debug)]
pub struct PassBarrier {
    capacity: usize,
    available: Mutex<usize>,
    refilled: Condvar,
}

impl PassBarrier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            available: Mutex::new(capacity),
            refilled: Condvar::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn available(&self) -> usize {
        *self.lock()
    }

    /// Takes `units` out of the barrier, waiting for them if necessary.
    pub fn drain(&self, units: usize) {
        let units = units.min(self.capacity);
        let mut available = self.lock();

        while *available < units {
            available = self
                .refilled
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }

        *available -= units;
    }

    pub fn release(&self) {
        let mut available = self.lock();
        *available = (*available + 1).min(self.capacity);
        drop(available);

        self.refilled.notify_all();
    }

    /// Blocks until every drained unit has been released.
    pub fn wait_full(&self) {
        let mut available = self.lock();

        while *available < self.capacity {
            available = self
                .refilled
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one barrier unit when dropped, including during unwinding.
#[derive(Debug)]
pub struct CompletionSignal {
    barrier: Arc<PassBarrier>,
}

impl CompletionSignal {
    #[must_use]
    pub fn new(barrier: Arc<PassBarrier>) -> Self {
        Self { barrier }
    }
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        self.barrier.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_new_barrier_is_full() {
        let barrier = PassBarrier::new(3);

        assert_eq!(barrier.available(), 3);
        barrier.wait_full();
    }

    #[test]
    fn test_drain_and_release() {
        let barrier = PassBarrier::new(2);
        barrier.drain(2);
        assert_eq!(barrier.available(), 0);

        barrier.release();
        barrier.release();
        barrier.release();
        assert_eq!(barrier.available(), 2);
    }

    #[test]
    fn test_wait_full_blocks_until_all_signals_drop() {
        let barrier = Arc::new(PassBarrier::new(4));
        barrier.drain(4);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let signal = CompletionSignal::new(Arc::clone(&barrier));
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10 * i));
                    drop(signal);
                })
            })
            .collect();

        barrier.wait_full();
        assert_eq!(barrier.available(), 4);

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_signal_released_on_panic() {
        let barrier = Arc::new(PassBarrier::new(1));
        barrier.drain(1);

        let signal = CompletionSignal::new(Arc::clone(&barrier));
        let result = thread::spawn(move || {
            let _signal = signal;
            panic!("worker failure");
        })
        .join();

        assert!(result.is_err());
        barrier.wait_full();
    }
}
