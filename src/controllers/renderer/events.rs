use crate::core::data::render_image::ImageSnapshot;
use crate::core::data::thread_state::ThreadState;
use std::time::Duration;

/// The image as it stands after a completed pass.
#[derive(Debug, Clone)]
pub struct FrameData {
    pub generation: u64,
    pub pass: u32,
    pub max_iterations: u32,
    pub image: ImageSnapshot,
    pub elapsed: Duration,
}

/// Summary of a finished run, aborted or not.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub generation: u64,
    pub checksum: u64,
    pub iteration_sum: u64,
    pub passes_done: u32,
    pub elapsed: Duration,
    /// Set when the run was aborted before its last pass.
    pub truncated: bool,
    pub image: ImageSnapshot,
}

#[derive(Debug, Clone)]
pub struct RenderFailure {
    pub generation: u64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum RenderEvent {
    RenderStarting { generation: u64 },
    ThreadState { slot: usize, state: ThreadState },
    /// Running count of segments drawn this run, donated segments included.
    ChunkDone { chunks_done: usize },
    PassCompleted(FrameData),
    AllDone(RunReport),
    Error(RenderFailure),
}
