//! The escape-time kernel, generic over the numeric type it computes in.

pub mod compute_task;
pub mod parameter_maker;
