use crate::controllers::renderer::events::RenderEvent;
use std::sync::mpsc::Sender;

/// Receives everything the orchestrator reports. Called from the
/// orchestrator thread and from worker threads.
pub trait RendererPresenterPort: Send + Sync {
    fn present(&self, event: RenderEvent);
}

impl RendererPresenterPort for Sender<RenderEvent> {
    fn present(&self, event: RenderEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event);
    }
}
