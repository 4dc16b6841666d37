pub mod cancellation;
pub mod render_pass;
