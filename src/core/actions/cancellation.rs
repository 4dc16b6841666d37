use std::sync::atomic::{AtomicBool, Ordering};

pub const CANCEL_CHECK_INTERVAL_PIXELS: usize = 1024;

pub trait CancelToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// Token for kernels and gates driven outside a render run.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

#[cfg(test)]
impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[cfg(test)]
impl<F> CancelToken for F
where
    F: Fn() -> bool + Send + Sync,
{
    #[inline]
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Restart and abort requests for the run in flight.
///
/// A restart means a newer request replaces this run; an abort stops it
/// with nothing to follow. Workers treat both the same way.
#[derive(Debug, Default)]
pub struct RenderControl {
    restart: AtomicBool,
    abort: AtomicBool,
}

impl RenderControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_restart(&self) {
        self.restart.store(true, Ordering::Release);
    }

    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn restart_requested(&self) -> bool {
        self.restart.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    pub fn clear_restart(&self) {
        self.restart.store(false, Ordering::Release);
    }

    pub fn clear_abort(&self) {
        self.abort.store(false, Ordering::Release);
    }
}

impl CancelToken for RenderControl {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.restart.load(Ordering::Relaxed) || self.abort.load(Ordering::Relaxed)
    }
}
