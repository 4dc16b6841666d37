pub mod big_fixed;
pub mod kernel_number;
pub mod numeric_type;
