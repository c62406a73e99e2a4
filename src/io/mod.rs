//! Input/Output operations for expression archives and tables

mod archive;
mod options;
mod sample;
mod table;

pub use archive::{extract_archive, extraction_dir, read_raw};
pub use options::{parse_separator, ReadOptions};
pub use sample::{read_sample_file, resolve_sample_key, sample_key};
pub use table::{read_expression_table, write_expression_table};
