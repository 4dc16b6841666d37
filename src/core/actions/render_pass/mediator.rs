use crate::core::actions::render_pass::handoff::HandoffSlot;
use crate::core::data::segment::Segment;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub const MAX_NUM_WORKER_THREADS: usize = 10;

// Upper bound on how long a waiting requester sleeps between checks.
const REQUEST_POLL_INTERVAL: Duration = Duration::from_millis(5);

#[derive(Debug, Default)]
struct MediatorState {
    waiting: [bool; MAX_NUM_WORKER_THREADS],
    done: [bool; MAX_NUM_WORKER_THREADS],
    ready: HandoffSlot<usize>,
    cached: HandoffSlot<Segment>,
    busy: usize,
    waiting_count: usize,
    allocation_underway: bool,
}

/// Pairs a worker that has run out of rows with a busy worker willing to
/// give up half of what it has left.
///
/// Only one requester holds the ready mailbox and only one donated segment
/// is cached at a time. The busy count only changes under the lock, and a
/// claimed segment counts as busy before the lock is released, so a
/// requester never gives up while a donation is still on its way.
#[derive(Debug)]
pub struct Mediator {
    enabled: AtomicBool,
    state: Mutex<MediatorState>,
    changed: Condvar,
    waiting_hint: AtomicUsize,
}

impl Mediator {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            state: Mutex::new(MediatorState::default()),
            changed: Condvar::new(),
            waiting_hint: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Clears every slot and flag and registers `busy_workers` as busy.
    /// Only valid while no worker of the previous pass is still running.
    pub fn reset(&self, busy_workers: usize) {
        let mut state = self.lock();
        *state = MediatorState {
            busy: busy_workers,
            ..MediatorState::default()
        };
        self.waiting_hint.store(0, Ordering::Release);
    }

    /// Lock-free hint that some worker is waiting for rows.
    #[must_use]
    pub fn threads_are_waiting(&self) -> bool {
        self.waiting_hint.load(Ordering::Acquire) > 0
    }

    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.lock().busy
    }

    #[must_use]
    pub fn is_done(&self, slot: usize) -> bool {
        self.lock().done[slot]
    }

    pub fn mark_done(&self, slot: usize) {
        self.lock().done[slot] = true;
        self.changed.notify_all();
    }

    /// The caller has stopped working on its current segment.
    pub fn segment_finished(&self) {
        let mut state = self.lock();
        debug_assert!(state.busy > 0, "busy count underflow");
        state.busy = state.busy.saturating_sub(1);
        drop(state);

        self.changed.notify_all();
    }

    /// Splits the rows of `segment` from `current_y` onwards and caches the
    /// lower half for the worker holding the ready mailbox.
    ///
    /// Returns false without touching `segment` unless a worker is waiting
    /// and no other donation is in flight.
    pub fn try_split(&self, segment: &mut Segment, current_y: i32) -> bool {
        if !self.threads_are_waiting() || !self.is_enabled() {
            return false;
        }

        let mut state = self.lock();

        if state.allocation_underway || state.waiting_count == 0 || state.cached.is_occupied() {
            return false;
        }

        let donation = segment.split_off_lower_half(current_y);
        debug!(
            "segment shared, rows [{}, {}) donated",
            donation.region().min_y(),
            donation.region().max_y()
        );

        let cached = state.cached.try_put(donation);
        debug_assert!(cached.is_ok(), "donation slot already occupied");
        state.allocation_underway = true;
        drop(state);

        self.changed.notify_all();
        true
    }

    /// Waits for a donated segment. Returns `None` once no busy worker is
    /// left to donate and nothing is cached, and marks `slot` done.
    pub fn request_task(&self, slot: usize) -> Option<Segment> {
        let mut state = self.lock();

        if !self.is_enabled() {
            state.done[slot] = true;
            return None;
        }

        loop {
            let holds_mailbox = state.ready.peek() == Some(&slot);

            if holds_mailbox {
                if let Some(mut segment) = state.cached.take() {
                    state.ready.clear();
                    state.waiting[slot] = false;
                    self.set_waiting_count(&mut state, 0);
                    state.allocation_underway = false;
                    state.busy += 1;
                    drop(state);

                    segment.set_index(slot);
                    self.changed.notify_all();
                    return Some(segment);
                }
            } else {
                let mailbox_free = match state.ready.peek() {
                    None => true,
                    Some(&holder) => state.done[holder],
                };

                if mailbox_free {
                    state.ready.clear();
                    let claimed = state.ready.try_put(slot);
                    debug_assert!(claimed.is_ok());
                    state.waiting[slot] = true;
                    self.set_waiting_count(&mut state, 1);
                    self.changed.notify_all();
                    continue;
                }
            }

            if state.busy == 0 && !state.cached.is_occupied() {
                if holds_mailbox {
                    state.ready.clear();
                    self.set_waiting_count(&mut state, 0);
                }
                state.waiting[slot] = false;
                state.done[slot] = true;
                drop(state);

                self.changed.notify_all();
                return None;
            }

            state = self
                .changed
                .wait_timeout(state, REQUEST_POLL_INTERVAL)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    fn set_waiting_count(&self, state: &mut MediatorState, count: usize) {
        state.waiting_count = count;
        self.waiting_hint.store(count, Ordering::Release);
    }

    fn lock(&self) -> MutexGuard<'_, MediatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::coordinate::CoordValue;
    use crate::core::data::region::Region;
    use std::sync::{Arc, Weak};
    use std::thread;
    use std::time::Instant;

    fn create_segment(min_y: i32, max_y: i32) -> Segment {
        let region = Region::new(
            0.01,
            CoordValue::from_f64(0.0),
            CoordValue::from_f64(0.0),
            -2,
            2,
            min_y,
            max_y,
            100,
        )
        .unwrap();

        Segment::new(region, Weak::new(), 0, None)
    }

    fn wait_until(condition: impl Fn() -> bool, timeout: Duration) -> bool {
        let start = Instant::now();
        while !condition() {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }

    #[test]
    fn test_request_when_disabled_returns_none_and_marks_done() {
        let mediator = Mediator::new(false);
        mediator.reset(1);

        assert!(mediator.request_task(0).is_none());
        assert!(mediator.is_done(0));
    }

    #[test]
    fn test_request_with_no_busy_workers_gives_up() {
        let mediator = Mediator::new(true);
        mediator.reset(1);
        mediator.segment_finished();

        assert!(mediator.request_task(0).is_none());
        assert!(mediator.is_done(0));
        assert!(!mediator.threads_are_waiting());
    }

    #[test]
    fn test_split_without_waiting_worker_is_noop() {
        let mediator = Mediator::new(true);
        mediator.reset(1);
        let mut segment = create_segment(0, 100);

        assert!(!mediator.try_split(&mut segment, 10));
        assert_eq!(segment.region().max_y(), 100);
    }

    #[test]
    fn test_second_split_refused_while_donation_pending() {
        let mediator = Mediator::new(true);
        mediator.reset(2);
        {
            let mut state = mediator.lock();
            state.ready.try_put(1).unwrap();
            state.waiting[1] = true;
            mediator.set_waiting_count(&mut state, 1);
        }

        let mut first = create_segment(0, 100);
        let mut second = create_segment(100, 200);

        assert!(mediator.try_split(&mut first, 0));
        assert!(!mediator.try_split(&mut second, 100));
        assert_eq!(first.region().max_y(), 50);
        assert_eq!(second.region().max_y(), 200);
    }

    #[test]
    fn test_waiting_requester_receives_donation() {
        let mediator = Arc::new(Mediator::new(true));
        mediator.reset(2);

        let requester = {
            let mediator = Arc::clone(&mediator);
            thread::spawn(move || {
                mediator.segment_finished();
                mediator.request_task(1)
            })
        };

        assert!(wait_until(
            || mediator.threads_are_waiting(),
            Duration::from_secs(2)
        ));

        let mut donor = create_segment(0, 100);
        assert!(mediator.try_split(&mut donor, 20));

        let received = requester.join().unwrap().expect("donation delivered");
        assert_eq!(received.region().min_y(), 60);
        assert_eq!(received.region().max_y(), 100);
        assert_eq!(received.index(), Some(1));
        assert_eq!(donor.region().max_y(), 60);
        assert_eq!(mediator.busy_count(), 2);
        assert!(!mediator.threads_are_waiting());
    }

    #[test]
    fn test_waiting_requester_released_when_last_worker_finishes() {
        let mediator = Arc::new(Mediator::new(true));
        mediator.reset(2);

        let requester = {
            let mediator = Arc::clone(&mediator);
            thread::spawn(move || {
                mediator.segment_finished();
                mediator.request_task(0)
            })
        };

        assert!(wait_until(
            || mediator.threads_are_waiting(),
            Duration::from_secs(2)
        ));
        mediator.segment_finished();

        assert!(requester.join().unwrap().is_none());
        assert!(mediator.is_done(0));
        assert_eq!(mediator.busy_count(), 0);
    }

    #[test]
    fn test_reset_clears_pending_state() {
        let mediator = Mediator::new(true);
        mediator.reset(1);
        mediator.mark_done(0);
        mediator.reset(3);

        assert!(!mediator.is_done(0));
        assert_eq!(mediator.busy_count(), 3);
    }
}
