//! Log transformations for expression tables

mod log_transform;

pub use log_transform::{log1p_base, log2};
