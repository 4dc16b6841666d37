pub mod coordinate;
pub mod region;
pub mod render_image;
pub mod render_state;
pub mod segment;
pub mod thread_state;
