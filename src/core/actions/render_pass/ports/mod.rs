pub mod row_kernel;
pub mod worker_sink;
