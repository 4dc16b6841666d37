use crate::controllers::renderer::config::{
    RendererConfig, numeric_type_from_code, validate_colour_map_size, validate_numeric_type,
    validate_passes, validate_worker_threads,
};
use crate::controllers::renderer::errors::{ConfigError, RenderRequestError};
use crate::controllers::renderer::events::{FrameData, RenderEvent, RenderFailure, RunReport};
use crate::controllers::renderer::ports::presenter_port::RendererPresenterPort;
use crate::controllers::renderer::renderer_data::{RendererData, RunSettings};
use crate::controllers::renderer::request::RenderRequest;
use crate::core::actions::cancellation::{CancelToken, RenderControl};
use crate::core::actions::render_pass::barrier::PassBarrier;
use crate::core::actions::render_pass::collector::SegmentCollector;
use crate::core::actions::render_pass::mediator::{MAX_NUM_WORKER_THREADS, Mediator};
use crate::core::actions::render_pass::partition::full_image_region;
use crate::core::actions::render_pass::pause::PauseGates;
use crate::core::actions::render_pass::ports::worker_sink::WorkerSink;
use crate::core::actions::render_pass::worker::PassResources;
use crate::core::actions::render_pass::{KernelPlan, prepare_segments, run_numeric_pass};
use crate::core::colour::colour_map::ColourMap;
use crate::core::data::render_image::RenderImage;
use crate::core::data::thread_state::ThreadState;
use crate::core::kernel::compute_task::calc_max_iterations;
use crate::core::numeric::numeric_type::NumericType;
use log::{debug, error, info};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(Default)]
struct RequestSlot {
    pending: Option<(u64, RenderRequest)>,
    running: bool,
}

struct SharedState {
    generation: AtomicU64,
    requests: Mutex<RequestSlot>,
    wake: Condvar,
    shutdown: AtomicBool,
    control: Arc<RenderControl>,
    pause: Arc<PauseGates>,
    data: Mutex<RendererData>,
    thread_states: Mutex<Vec<ThreadState>>,
    last_report: Mutex<Option<RunReport>>,
    report_ready: Condvar,
    presenter_port: Arc<dyn RendererPresenterPort>,
}

/// Runs render requests pass by pass on its own thread.
///
/// Every run renders `passes` passes of growing iteration budget into a
/// fresh image and reports each finished pass. A request submitted while
/// a run is in flight restarts rendering with the new request; an abort
/// stops the run and reports what was finished.
pub struct RenderOrchestrator {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
}

enum RunOutcome {
    Finished(RunReport),
    Superseded,
    Failed(String),
}

impl RenderOrchestrator {
    pub fn new(
        config: RendererConfig,
        presenter_port: Arc<dyn RendererPresenterPort>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let shared = Arc::new(SharedState {
            generation: AtomicU64::new(0),
            requests: Mutex::new(RequestSlot::default()),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            control: Arc::new(RenderControl::new()),
            pause: Arc::new(PauseGates::new(MAX_NUM_WORKER_THREADS)),
            data: Mutex::new(RendererData::from_config(&config)),
            thread_states: Mutex::new(vec![ThreadState::Disabled; MAX_NUM_WORKER_THREADS]),
            last_report: Mutex::new(None),
            report_ready: Condvar::new(),
            presenter_port,
        });

        let worker_shared = Arc::clone(&shared);

        let worker = thread::spawn(move || {
            Self::render_loop(&worker_shared);
        });

        Ok(Self {
            shared,
            worker: Some(worker),
        })
    }

    /// Queues `request`, replacing any request not yet started, and
    /// restarts the run in flight. Returns the request's generation.
    pub fn submit_request(&self, request: RenderRequest) -> Result<u64, RenderRequestError> {
        request.validate()?;

        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(RenderRequestError::ShutDown);
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut slot = lock(&self.shared.requests);
            slot.pending = Some((generation, request));

            if slot.running {
                self.shared.control.request_restart();
            }
        }

        self.shared.wake.notify_one();

        Ok(generation)
    }

    /// Stops the run in flight and drops any request not yet started.
    pub fn abort(&self) {
        let mut slot = lock(&self.shared.requests);
        slot.pending = None;

        if slot.running {
            self.shared.control.request_abort();
        }
    }

    pub fn pause(&self) {
        self.shared.pause.pause_all();
    }

    pub fn resume(&self) {
        self.shared.pause.resume_all();
    }

    pub fn pause_slot(&self, slot: usize) {
        self.shared.pause.pause(slot);
    }

    pub fn resume_slot(&self, slot: usize) {
        self.shared.pause.resume(slot);
    }

    pub fn set_worker_threads(&self, count: usize) -> Result<(), ConfigError> {
        let mut data = lock(&self.shared.data);
        data.pending_worker_threads = validate_worker_threads(count, data.hardware_threads)?;
        Ok(())
    }

    pub fn set_passes(&self, passes: u32) -> Result<(), ConfigError> {
        lock(&self.shared.data).next_passes = validate_passes(passes)?;
        Ok(())
    }

    pub fn set_colour_map_size(&self, size: usize) -> Result<(), ConfigError> {
        lock(&self.shared.data).colour_map_size = validate_colour_map_size(size)?;
        Ok(())
    }

    pub fn set_numeric_type(&self, numeric_type: NumericType) -> Result<(), ConfigError> {
        lock(&self.shared.data).numeric_type = validate_numeric_type(numeric_type)?;
        Ok(())
    }

    pub fn set_numeric_type_code(&self, code: i32) -> Result<(), ConfigError> {
        lock(&self.shared.data).numeric_type = numeric_type_from_code(code)?;
        Ok(())
    }

    pub fn set_dynamic_allocation(&self, enabled: bool) {
        lock(&self.shared.data).dynamic_allocation = enabled;
    }

    #[must_use]
    pub fn renderer_data(&self) -> RendererData {
        lock(&self.shared.data).clone()
    }

    #[must_use]
    pub fn thread_states(&self) -> Vec<ThreadState> {
        lock(&self.shared.thread_states).clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.shared.requests).running
    }

    #[must_use]
    pub fn last_report(&self) -> Option<RunReport> {
        lock(&self.shared.last_report).clone()
    }

    /// Waits for the report of run `generation` or a later one.
    pub fn wait_for_report(&self, generation: u64, timeout: Duration) -> Option<RunReport> {
        let deadline = Instant::now() + timeout;
        let mut report = lock(&self.shared.last_report);

        loop {
            if let Some(done) = report.as_ref()
                && done.generation >= generation
            {
                return Some(done.clone());
            }

            let now = Instant::now();
            if now >= deadline {
                return None;
            }

            report = self
                .shared
                .report_ready
                .wait_timeout(report, deadline - now)
                .map(|(guard, _)| guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner().0);
        }
    }

    pub fn shutdown(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.control.request_abort();
        self.shared.pause.resume_all();
        self.shared.wake.notify_one();

        if let Some(handle) = self.worker.take()
            && handle.join().is_err()
        {
            error!("render thread stopped with a panic");
        }
    }

    fn render_loop(shared: &Arc<SharedState>) {
        loop {
            let (generation, request) = {
                let mut slot = lock(&shared.requests);
                loop {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    if let Some(job) = slot.pending.take() {
                        slot.running = true;
                        shared.control.clear_restart();
                        shared.control.clear_abort();
                        break job;
                    }

                    slot = shared
                        .wake
                        .wait(slot)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            };

            let run = || Self::render_run(shared, generation, &request);
            let outcome = panic::catch_unwind(AssertUnwindSafe(run));
            lock(&shared.requests).running = false;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("render {} panicked: {}", generation, message);
                    shared
                        .presenter_port
                        .present(RenderEvent::Error(RenderFailure {
                            generation,
                            message,
                        }));
                    panic::resume_unwind(payload);
                }
            };

            match outcome {
                RunOutcome::Finished(report) => {
                    *lock(&shared.last_report) = Some(report);
                    shared.report_ready.notify_all();
                }
                RunOutcome::Superseded => {
                    debug!("render {} superseded", generation);
                }
                RunOutcome::Failed(message) => {
                    error!("render {} failed: {}", generation, message);
                    shared
                        .presenter_port
                        .present(RenderEvent::Error(RenderFailure {
                            generation,
                            message,
                        }));
                }
            }
        }
    }

    fn render_run(
        shared: &Arc<SharedState>,
        generation: u64,
        request: &RenderRequest,
    ) -> RunOutcome {
        let settings = lock(&shared.data).begin_run();
        let start = Instant::now();

        info!(
            "render {} starting: {}x{}, {} passes, {} threads, dynamic allocation {}, numeric type {}",
            generation,
            request.width,
            request.height,
            settings.passes,
            settings.worker_threads,
            settings.dynamic_allocation,
            settings.numeric_type
        );

        shared
            .presenter_port
            .present(RenderEvent::RenderStarting { generation });
        shared
            .presenter_port
            .present(RenderEvent::ChunkDone { chunks_done: 0 });
        Self::reset_thread_states(shared, settings.worker_threads);

        let image = match RenderImage::new(request.width, request.height) {
            Ok(image) => Arc::new(image),
            Err(err) => return RunOutcome::Failed(err.to_string()),
        };

        let template = match full_image_region(
            request.scale,
            &request.origin_x,
            &request.origin_y,
            request.width,
            request.height,
        ) {
            Ok(template) => template,
            Err(err) => return RunOutcome::Failed(err.to_string()),
        };

        let colour_map = Arc::new(ColourMap::new(
            settings.colour_map_size,
            settings.passes.saturating_sub(1),
        ));
        let collector = Arc::new(Self::create_collector(shared));
        let resources = PassResources {
            mediator: Arc::new(Mediator::new(settings.dynamic_allocation)),
            control: Arc::clone(&shared.control),
            pause: Arc::clone(&shared.pause),
            barrier: Arc::new(PassBarrier::new(MAX_NUM_WORKER_THREADS)),
            sink: Arc::clone(&collector) as Arc<dyn WorkerSink>,
        };

        let mut passes_done = 0;

        for pass in 0..settings.passes {
            if shared.control.is_cancelled() {
                break;
            }

            collector.begin_pass();

            let segments =
                match prepare_segments(&template, settings.worker_threads, &image, &collector) {
                    Ok(segments) => segments,
                    Err(err) => return RunOutcome::Failed(err.to_string()),
                };

            let plan = KernelPlan {
                template: template.clone(),
                set: request.set.clone(),
                pass,
                colour_map: Arc::clone(&colour_map),
            };

            if let Err(err) = run_numeric_pass(settings.numeric_type, &resources, segments, &plan) {
                return RunOutcome::Failed(err.to_string());
            }

            // A cancelled pass is incomplete and is not shown.
            if shared.control.is_cancelled() {
                break;
            }

            passes_done = pass + 1;
            debug!("render {} pass {} complete", generation, pass);

            shared
                .presenter_port
                .present(RenderEvent::PassCompleted(FrameData {
                    generation,
                    pass,
                    max_iterations: calc_max_iterations(pass),
                    image: image.snapshot(),
                    elapsed: start.elapsed(),
                }));
        }

        if shared.control.restart_requested() {
            return RunOutcome::Superseded;
        }

        let report = Self::finish_run(
            shared,
            generation,
            &settings,
            passes_done,
            &image,
            &collector,
            start,
        );
        shared
            .presenter_port
            .present(RenderEvent::AllDone(report.clone()));

        RunOutcome::Finished(report)
    }

    fn finish_run(
        shared: &SharedState,
        generation: u64,
        settings: &RunSettings,
        passes_done: u32,
        image: &RenderImage,
        collector: &SegmentCollector,
        start: Instant,
    ) -> RunReport {
        let snapshot = image.snapshot();
        let checksum = snapshot.checksum();
        let iteration_sum = collector.iteration_sum();
        let elapsed = start.elapsed();
        let truncated = passes_done < settings.passes;

        lock(&shared.data).iteration_sum = iteration_sum;

        info!(
            "render {} done: threads {}, passes {}/{}, pixels {}, checksum {}, dynamic allocation {}, truncated {}, colour map size {}, numeric type {}, iteration sum {}, elapsed {:?}",
            generation,
            settings.worker_threads,
            passes_done,
            settings.passes,
            snapshot.pixels().len(),
            checksum,
            settings.dynamic_allocation,
            truncated,
            settings.colour_map_size,
            settings.numeric_type.code(),
            iteration_sum,
            elapsed
        );

        RunReport {
            generation,
            checksum,
            iteration_sum,
            passes_done,
            elapsed,
            truncated,
            image: snapshot,
        }
    }

    fn create_collector(shared: &Arc<SharedState>) -> SegmentCollector {
        let state_shared = Arc::clone(shared);
        let chunk_port = Arc::clone(&shared.presenter_port);

        SegmentCollector::new(MAX_NUM_WORKER_THREADS)
            .with_state_listener(Box::new(move |slot, state| {
                Self::set_thread_state(&state_shared, slot, state);
            }))
            .with_segment_listener(Box::new(move |chunks_done| {
                chunk_port.present(RenderEvent::ChunkDone { chunks_done });
            }))
    }

    fn reset_thread_states(shared: &SharedState, active: usize) {
        for slot in 0..MAX_NUM_WORKER_THREADS {
            let state = if slot < active {
                ThreadState::Starting
            } else {
                ThreadState::Disabled
            };
            Self::set_thread_state(shared, slot, state);
        }
    }

    fn set_thread_state(shared: &SharedState, slot: usize, state: ThreadState) {
        let changed = match lock(&shared.thread_states).get_mut(slot) {
            Some(current) if *current != state => {
                *current = state;
                true
            }
            _ => false,
        };

        if changed {
            shared
                .presenter_port
                .present(RenderEvent::ThreadState { slot, state });
        }
    }
}

impl Drop for RenderOrchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
