use crate::core::actions::cancellation::{CancelToken, RenderControl};
use crate::core::actions::render_pass::barrier::{CompletionSignal, PassBarrier};
use crate::core::actions::render_pass::mediator::Mediator;
use crate::core::actions::render_pass::pause::PauseGates;
use crate::core::actions::render_pass::ports::row_kernel::RowKernel;
use crate::core::actions::render_pass::ports::worker_sink::WorkerSink;
use crate::core::data::segment::Segment;
use crate::core::data::thread_state::ThreadState;
use log::debug;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A strip with this many rows or fewer left is finished without splitting.
pub const MIN_REALLOCATION_SIZE_IN_PIXELS: i32 = 4;

/// Rows between two passes through the pause gate.
pub const PAUSE_INTERVAL_ROWS: u32 = 5;

/// Everything the workers of one pass share.
#[derive(Clone)]
pub struct PassResources {
    pub mediator: Arc<Mediator>,
    pub control: Arc<RenderControl>,
    pub pause: Arc<PauseGates>,
    pub barrier: Arc<PassBarrier>,
    pub sink: Arc<dyn WorkerSink>,
}

/// Computes one segment row by row on its own thread, then asks the
/// mediator for more until none is left.
pub struct Worker<K: RowKernel> {
    slot: usize,
    kernel: K,
    segment: Segment,
    resources: PassResources,
    state: Option<ThreadState>,
    holds_segment: bool,
}

impl<K: RowKernel + 'static> Worker<K> {
    /// Starts computing `segment` straight away. The barrier unit drained
    /// for this worker is given back when the thread ends, or right away
    /// if the thread cannot be created.
    pub fn spawn(
        slot: usize,
        kernel: K,
        segment: Segment,
        resources: PassResources,
    ) -> io::Result<JoinHandle<()>> {
        let signal = CompletionSignal::new(Arc::clone(&resources.barrier));
        let worker = Self {
            slot,
            kernel,
            segment,
            resources,
            state: None,
            holds_segment: true,
        };

        thread::Builder::new()
            .name(format!("render-worker-{slot}"))
            .spawn(move || {
                let _signal = signal;
                worker.run();
            })
    }
}

impl<K: RowKernel> Worker<K> {
    fn run(mut self) {
        debug!("worker {} running", self.slot);
        self.publish(ThreadState::Starting);

        loop {
            self.publish(ThreadState::Busy);
            let completed = self.compute_segment();
            self.finish_segment();

            if !completed {
                self.publish(ThreadState::Idle);
                self.resources.mediator.mark_done(self.slot);
                return;
            }

            self.publish(ThreadState::Waiting);

            match self.resources.mediator.request_task(self.slot) {
                Some(segment) => {
                    debug!(
                        "worker {} task received, rows [{}, {})",
                        self.slot,
                        segment.region().min_y(),
                        segment.region().max_y()
                    );
                    self.segment = segment;
                    self.holds_segment = true;
                    self.publish(ThreadState::Restarted);
                }
                None => {
                    self.publish(ThreadState::Idle);
                    return;
                }
            }
        }
    }

    /// Returns false when the run was cancelled before the last row.
    fn compute_segment(&mut self) -> bool {
        let control = Arc::clone(&self.resources.control);
        let mut y = self.segment.region().min_y();
        let mut rows_done: u32 = 0;

        // The bound is re-read every row since a split moves it.
        while y < self.segment.region().max_y() {
            if control.is_cancelled() {
                return false;
            }

            if rows_done % PAUSE_INTERVAL_ROWS == 0 {
                self.resources.pause.checkpoint(self.slot, control.as_ref());
            }

            if self.segment.region().max_y() - y <= MIN_REALLOCATION_SIZE_IN_PIXELS {
                self.publish(ThreadState::Finishing);
            } else if self.resources.mediator.try_split(&mut self.segment, y) {
                self.publish(ThreadState::Shared);
            }

            self.kernel
                .compute_row(&mut self.segment, y, control.as_ref());

            y += 1;
            rows_done += 1;
        }

        !control.is_cancelled()
    }

    fn finish_segment(&mut self) {
        debug!(
            "worker {} computation done, rows [{}, {})",
            self.slot,
            self.segment.region().min_y(),
            self.segment.region().max_y()
        );

        self.resources
            .sink
            .segment_done(self.slot, &mut self.segment);
        self.holds_segment = false;
        self.resources.mediator.segment_finished();
    }

    fn publish(&mut self, state: ThreadState) {
        if self.state != Some(state) {
            self.state = Some(state);
            self.resources.sink.publish_state(self.slot, state);
        }
    }
}

impl<K: RowKernel> Drop for Worker<K> {
    // Only does anything when the worker unwinds in the middle of a segment.
    fn drop(&mut self) {
        if self.holds_segment {
            self.holds_segment = false;
            self.resources.mediator.segment_finished();
        }
        self.resources.mediator.mark_done(self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::render_pass::collector::SegmentCollector;
    use crate::core::data::coordinate::CoordValue;
    use crate::core::data::region::Region;
    use crate::core::data::render_image::RenderImage;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingKernel {
        rows: Arc<AtomicUsize>,
    }

    impl RowKernel for CountingKernel {
        fn compute_row(&self, segment: &mut Segment, y: i32, _cancel: &dyn CancelToken) {
            let index = segment.region().pixel_index(segment.region().min_x(), y);
            segment.set_pixel(index, 0xFF00_00FF);
            segment.add_iterations(1);
            self.rows.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<Vec<(usize, ThreadState)>>,
        done: Mutex<Vec<(i32, i32)>>,
    }

    impl WorkerSink for RecordingSink {
        fn publish_state(&self, slot: usize, state: ThreadState) {
            self.states.lock().unwrap().push((slot, state));
        }

        fn segment_done(&self, _slot: usize, segment: &mut Segment) {
            self.done
                .lock()
                .unwrap()
                .push((segment.region().min_y(), segment.region().max_y()));
        }
    }

    fn create_segment(image: &Arc<RenderImage>, min_y: i32, max_y: i32) -> Segment {
        let region = Region::new(
            0.01,
            CoordValue::from_f64(0.0),
            CoordValue::from_f64(0.0),
            -2,
            2,
            min_y,
            max_y,
            image.height() as i32,
        )
        .unwrap();

        Segment::new(region, Arc::downgrade(image), 0, None)
    }

    fn create_resources(sink: Arc<dyn WorkerSink>, dynamic: bool) -> PassResources {
        PassResources {
            mediator: Arc::new(Mediator::new(dynamic)),
            control: Arc::new(RenderControl::new()),
            pause: Arc::new(PauseGates::new(1)),
            barrier: Arc::new(PassBarrier::new(1)),
            sink,
        }
    }

    #[test]
    fn test_worker_computes_every_row_and_releases_barrier() {
        let image = Arc::new(RenderImage::new(4, 20).unwrap());
        let sink = Arc::new(RecordingSink::default());
        let resources = create_resources(Arc::clone(&sink) as Arc<dyn WorkerSink>, true);
        let rows = Arc::new(AtomicUsize::new(0));

        resources.mediator.reset(1);
        resources.barrier.drain(1);
        let handle = Worker::spawn(
            0,
            CountingKernel {
                rows: Arc::clone(&rows),
            },
            create_segment(&image, -10, 10),
            resources.clone(),
        )
        .unwrap();

        resources.barrier.wait_full();
        handle.join().unwrap();

        assert_eq!(rows.load(Ordering::SeqCst), 20);
        assert_eq!(*sink.done.lock().unwrap(), vec![(-10, 10)]);
        assert_eq!(resources.mediator.busy_count(), 0);
        assert!(resources.mediator.is_done(0));

        let states: Vec<ThreadState> = sink.states.lock().unwrap().iter().map(|s| s.1).collect();
        assert_eq!(states.first(), Some(&ThreadState::Starting));
        assert_eq!(states.last(), Some(&ThreadState::Idle));
        assert!(states.contains(&ThreadState::Finishing));
    }

    #[test]
    fn test_cancelled_worker_stops_early_and_reports_segment() {
        let image = Arc::new(RenderImage::new(4, 20).unwrap());
        let sink = Arc::new(RecordingSink::default());
        let resources = create_resources(Arc::clone(&sink) as Arc<dyn WorkerSink>, true);
        let rows = Arc::new(AtomicUsize::new(0));

        resources.control.request_abort();
        resources.mediator.reset(1);
        resources.barrier.drain(1);
        let handle = Worker::spawn(
            0,
            CountingKernel {
                rows: Arc::clone(&rows),
            },
            create_segment(&image, -10, 10),
            resources.clone(),
        )
        .unwrap();

        resources.barrier.wait_full();
        handle.join().unwrap();

        assert_eq!(rows.load(Ordering::SeqCst), 0);
        assert_eq!(sink.done.lock().unwrap().len(), 1);
        assert_eq!(resources.mediator.busy_count(), 0);
    }

    #[test]
    fn test_worker_draws_through_collector() {
        let image = Arc::new(RenderImage::new(4, 8).unwrap());
        let collector = Arc::new(SegmentCollector::new(1));
        let resources = create_resources(Arc::clone(&collector) as Arc<dyn WorkerSink>, false);

        resources.mediator.reset(1);
        resources.barrier.drain(1);
        let handle = Worker::spawn(
            0,
            CountingKernel {
                rows: Arc::new(AtomicUsize::new(0)),
            },
            create_segment(&image, -4, 4),
            resources.clone(),
        )
        .unwrap();

        resources.barrier.wait_full();
        handle.join().unwrap();

        let snapshot = image.snapshot();
        for y in 0..8 {
            assert_eq!(snapshot.pixel(0, y), Some(0xFF00_00FF));
        }
        assert_eq!(collector.iteration_sum(), 8);
    }
}
