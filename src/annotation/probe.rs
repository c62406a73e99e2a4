//! Adding a `ProbeID` level to an expression table's row index

use std::path::Path;

use log::info;

use super::reference::{default_reference_dir, ProbeType, ReferenceTable};
use crate::data::ExpressionTable;
use crate::error::Result;

/// Name of the index level added by annotation
pub const PROBE_ID_LEVEL: &str = "ProbeID";

/// Add a `ProbeID` index level using the bundled reference tables
///
/// `probe_type` is case-insensitive and must be one of `ENST`, `ENSG`
/// (human) or `ENSMUST`, `ENSMUSG` (mouse). See [`add_probe_id_from`].
///
/// The bundled tables under `references/` only cover a handful of
/// well-known genes, so on real data most rows get an absent `ProbeID`.
/// Pass full Ensembl mapping tables in the same layout to
/// [`add_probe_id_from`] for genome-wide annotation.
pub fn add_probe_id(expr: &ExpressionTable, probe_type: &str) -> Result<ExpressionTable> {
    add_probe_id_from(expr, probe_type, &default_reference_dir())
}

/// Add a `ProbeID` index level using reference tables in `reference_dir`
///
/// The innermost index level is left-joined against the reference table:
/// every row is kept, rows without a match get an absent `ProbeID`. The new
/// index is `ProbeID` followed by the existing levels in order.
pub fn add_probe_id_from(
    expr: &ExpressionTable,
    probe_type: &str,
    reference_dir: &Path,
) -> Result<ExpressionTable> {
    // Validate before touching the filesystem
    let probe_type: ProbeType = probe_type.parse()?;
    let reference = ReferenceTable::for_probe_type(probe_type, reference_dir)?;

    let probe_ids: Vec<Option<String>> = expr
        .row_index()
        .innermost()
        .into_iter()
        .map(|id| id.and_then(|id| reference.get(id)).map(str::to_string))
        .collect();

    let matched = probe_ids.iter().filter(|p| p.is_some()).count();
    info!(
        "Annotated {} of {} rows with {} IDs",
        matched,
        probe_ids.len(),
        probe_type
    );

    let index = expr.row_index().with_outer_level(PROBE_ID_LEVEL, probe_ids)?;
    expr.clone().with_row_index(index)
}
