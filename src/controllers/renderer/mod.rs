//! The render orchestrator and the types it exchanges with its callers.
//!
//! Callers submit [`RenderRequest`]s and adjust settings through
//! [`RenderOrchestrator`]; results arrive as [`RenderEvent`]s on the
//! presenter port handed in at construction.

pub mod config;
pub mod errors;
pub mod events;
mod orchestrator;
pub mod ports;
pub mod renderer_data;
pub mod request;

pub use config::RendererConfig;
pub use errors::{ConfigError, RenderRequestError};
pub use events::{FrameData, RenderEvent, RenderFailure, RunReport};
pub use orchestrator::RenderOrchestrator;
pub use ports::presenter_port::RendererPresenterPort;
pub use renderer_data::RendererData;
pub use request::RenderRequest;
