use crate::core::actions::render_pass::ports::worker_sink::WorkerSink;
use crate::core::data::segment::{RecycledBuffer, Segment};
use crate::core::data::thread_state::ThreadState;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type StateListener = Box<dyn Fn(usize, ThreadState) + Send + Sync>;

/// Called with the running count of segments drawn. Donated segments count
/// on their own, so the total can exceed the number of worker chunks.
pub type SegmentListener = Box<dyn Fn(usize) + Send + Sync>;

/// Rows a worker slot delivered during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub slot: usize,
    pub min_y: i32,
    pub max_y: i32,
}

/// Draws finished segments into their image and keeps per-run bookkeeping:
/// the per-slot buffer pool, the iteration sum and the latest state of
/// every slot.
pub struct SegmentCollector {
    pool: Mutex<Vec<Option<RecycledBuffer>>>,
    states: Mutex<Vec<ThreadState>>,
    spans: Mutex<Vec<RowSpan>>,
    iteration_sum: AtomicU64,
    segments_drawn: AtomicUsize,
    state_listener: Option<StateListener>,
    segment_listener: Option<SegmentListener>,
}

impl SegmentCollector {
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            pool: Mutex::new((0..slots).map(|_| None).collect()),
            states: Mutex::new(vec![ThreadState::Starting; slots]),
            spans: Mutex::new(Vec::new()),
            iteration_sum: AtomicU64::new(0),
            segments_drawn: AtomicUsize::new(0),
            state_listener: None,
            segment_listener: None,
        }
    }

    /// Calls `listener` whenever a slot's state changes.
    #[must_use]
    pub fn with_state_listener(mut self, listener: StateListener) -> Self {
        self.state_listener = Some(listener);
        self
    }

    #[must_use]
    pub fn with_segment_listener(mut self, listener: SegmentListener) -> Self {
        self.segment_listener = Some(listener);
        self
    }

    /// Forgets the spans recorded for the previous pass.
    pub fn begin_pass(&self) {
        lock(&self.spans).clear();
    }

    /// Largest buffer `slot` finished with last pass, if any.
    pub fn take_recycled(&self, slot: usize) -> Option<RecycledBuffer> {
        lock(&self.pool).get_mut(slot).and_then(Option::take)
    }

    #[must_use]
    pub fn iteration_sum(&self) -> u64 {
        self.iteration_sum.load(Ordering::Acquire)
    }

    /// Segments drawn this run, donated ones included.
    #[must_use]
    pub fn segments_drawn(&self) -> usize {
        self.segments_drawn.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn spans(&self) -> Vec<RowSpan> {
        lock(&self.spans).clone()
    }

    #[must_use]
    pub fn thread_states(&self) -> Vec<ThreadState> {
        lock(&self.states).clone()
    }
}

impl WorkerSink for SegmentCollector {
    fn publish_state(&self, slot: usize, state: ThreadState) {
        let changed = {
            let mut states = lock(&self.states);
            match states.get_mut(slot) {
                Some(current) if *current != state => {
                    *current = state;
                    true
                }
                _ => false,
            }
        };

        if changed && let Some(listener) = &self.state_listener {
            listener(slot, state);
        }
    }

    fn segment_done(&self, slot: usize, segment: &mut Segment) {
        let Some(buffer) = segment.take_raw_data() else {
            return;
        };

        self.iteration_sum
            .fetch_add(segment.iteration_sum(), Ordering::AcqRel);

        debug!(
            "drawing data for segment, slot {}, rows [{}, {})",
            slot,
            buffer.region.min_y(),
            buffer.region.max_y()
        );

        match segment.image().upgrade() {
            Some(image) => {
                if let Err(err) = image.draw_region(&buffer.region, &buffer.raw_data) {
                    warn!("segment from slot {} not drawn: {}", slot, err);
                }
            }
            None => warn!("segment from slot {} outlived its image", slot),
        }

        lock(&self.spans).push(RowSpan {
            slot,
            min_y: buffer.region.min_y(),
            max_y: buffer.region.max_y(),
        });
        let drawn = self.segments_drawn.fetch_add(1, Ordering::AcqRel) + 1;

        if let Some(entry) = lock(&self.pool).get_mut(slot) {
            let pooled_len = entry.as_ref().map_or(0, |pooled| pooled.raw_data.len());
            if buffer.raw_data.len() >= pooled_len {
                *entry = Some(buffer);
            }
        }

        if let Some(listener) = &self.segment_listener {
            listener(drawn);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
