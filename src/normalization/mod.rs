//! Normalization methods for expression tables

mod cpm;

pub use cpm::{normalize, normalize_total, NormMethod};
