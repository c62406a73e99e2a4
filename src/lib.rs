//! rust_geoprep: preprocessing of GEO expression archives
//!
//! Loads a GEO supplementary archive of per-sample two-column files into a
//! single expression table, normalizes it to counts per million and
//! optionally annotates rows with Ensembl identifiers.
//!
//! # Example
//!
//! ```ignore
//! use rust_geoprep::prelude::*;
//!
//! let raw = read_raw("GSE12345_RAW.tar", &ReadOptions::default())?;
//! let cpm = normalize(&raw, "cpm", false)?;
//! let annotated = add_probe_id(&cpm, "ENSG")?;
//! write_expression_table("GSE12345_cpm.tsv", &annotated)?;
//! ```

pub mod annotation;
pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod normalization;
pub mod transform;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::annotation::{add_probe_id, add_probe_id_from, Organism, ProbeType, ReferenceTable};
    pub use crate::data::{ExpressionTable, RowIndex, RowKey};
    pub use crate::error::{PrepError, Result};
    pub use crate::io::{read_expression_table, read_raw, write_expression_table, ReadOptions};
    pub use crate::normalization::{normalize, normalize_total, NormMethod};
    pub use crate::transform::log2;
}

use std::path::Path;

use prelude::*;

/// Run the typical pipeline: load the archive, normalize, optionally annotate
pub fn preprocess<P: AsRef<Path>>(
    archive: P,
    options: &ReadOptions,
    norm_type: &str,
    log2: bool,
    probe_type: Option<&str>,
) -> Result<ExpressionTable> {
    // Step 1: Validate names up front so a typo fails before extraction
    norm_type.parse::<NormMethod>()?;
    if let Some(probe_type) = probe_type {
        probe_type.parse::<ProbeType>()?;
    }

    // Step 2: Extract and merge
    let raw = read_raw(archive, options)?;

    // Step 3: Normalize
    let normalized = normalize(&raw, norm_type, log2)?;

    // Step 4: Annotate
    match probe_type {
        Some(probe_type) => add_probe_id(&normalized, probe_type),
        None => Ok(normalized),
    }
}
