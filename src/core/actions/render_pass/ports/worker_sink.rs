use crate::core::data::segment::Segment;
use crate::core::data::thread_state::ThreadState;

/// Receives what workers produce while a pass runs.
pub trait WorkerSink: Send + Sync {
    fn publish_state(&self, slot: usize, state: ThreadState);

    /// Called once per segment a worker stops working on, whether it
    /// finished every row or was cancelled part way.
    fn segment_done(&self, slot: usize, segment: &mut Segment);
}
