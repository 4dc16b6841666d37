mod controllers;
mod core;
mod storage;

pub use crate::controllers::renderer::config::{
    DEFAULT_PASSES, MAX_PASSES, PASS_COUNT_MENU, max_worker_threads,
};
pub use crate::controllers::renderer::{
    ConfigError, FrameData, RenderEvent, RenderFailure, RenderOrchestrator, RenderRequest,
    RenderRequestError, RendererConfig, RendererData, RendererPresenterPort, RunReport,
};
pub use crate::core::actions::cancellation::RenderControl;
pub use crate::core::actions::render_pass::barrier::PassBarrier;
pub use crate::core::actions::render_pass::collector::SegmentCollector;
pub use crate::core::actions::render_pass::mediator::{MAX_NUM_WORKER_THREADS, Mediator};
pub use crate::core::actions::render_pass::partition::full_image_region;
pub use crate::core::actions::render_pass::pause::PauseGates;
pub use crate::core::actions::render_pass::ports::worker_sink::WorkerSink;
pub use crate::core::actions::render_pass::worker::PassResources;
pub use crate::core::actions::render_pass::{
    KernelPlan, prepare_segments, run_numeric_pass, run_pass,
};
pub use crate::core::colour::colour_map::{
    ColourMap, DEFAULT_COLOUR_MAP_SIZE, MAX_COLOUR_MAP_SIZE, MIN_COLOUR_MAP_SIZE,
};
pub use crate::core::data::coordinate::{CoordValue, CoordinateParseError};
pub use crate::core::data::render_image::{
    ImageSnapshot, MAX_RENDER_HEIGHT, MAX_RENDER_WIDTH, RenderImage,
};
pub use crate::core::data::render_state::{RenderState, RenderStateError};
pub use crate::core::data::thread_state::ThreadState;
pub use crate::core::kernel::compute_task::{FractalSet, calc_max_iterations};
pub use crate::core::numeric::numeric_type::{NumericType, NumericTypeError};
pub use crate::storage::write_ppm::write_ppm;
