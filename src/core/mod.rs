pub mod actions;
pub mod colour;
pub mod data;
pub mod kernel;
pub mod numeric;
