//! Error types for rust_geoprep

use thiserror::Error;

/// Main error type for preprocessing operations
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("{method} normalization not available. Please use 'cpm'")]
    UnsupportedNormalization { method: String },

    #[error("Unsupported probe type '{probe_type}'. Only 'ENST', 'ENSG', 'ENSMUST', or 'ENSMUSG' are available")]
    UnsupportedProbeType { probe_type: String },

    #[error("Malformed sample file {file}: expected exactly two columns (ID and value), got {columns}")]
    MalformedSample { file: String, columns: usize },

    #[error("Invalid value in {file} at line {line}: '{value}'")]
    InvalidValue { file: String, line: u64, value: String },

    #[error("No GSM sample key found in file name '{file}'")]
    MissingSampleKey { file: String },

    #[error("Duplicate sample column '{sample}'")]
    DuplicateSample { sample: String },

    #[error("Reference table {file} has no '{column}' column")]
    MissingReferenceColumn { file: String, column: String },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: String, got: String },

    #[error("Empty data: {reason}")]
    EmptyData { reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PrepError>;
