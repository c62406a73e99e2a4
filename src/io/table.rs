//! Reading and writing expression tables as TSV
//!
//! Layout: a header of index level names followed by sample IDs, then one
//! line per row. Absent index entries are empty fields.

use std::path::Path;

use ndarray::Array2;

use super::sample::parse_value;
use crate::data::{ExpressionTable, RowIndex, RowKey};
use crate::error::{PrepError, Result};

/// Read an expression table whose first `index_cols` columns form the row index
pub fn read_expression_table<P: AsRef<Path>>(path: P, index_cols: usize) -> Result<ExpressionTable> {
    let path = path.as_ref();
    let file_label = path.display().to_string();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)?;

    let header: Vec<String> = rdr.headers()?.iter().map(|s| s.trim().to_string()).collect();
    if index_cols == 0 || header.len() < index_cols {
        return Err(PrepError::InvalidInput {
            reason: format!(
                "{} has {} columns; cannot use {} as index columns",
                file_label,
                header.len(),
                index_cols
            ),
        });
    }

    let level_names = header[..index_cols].to_vec();
    let sample_ids = header[index_cols..].to_vec();
    let n_samples = sample_ids.len();

    let mut keys: Vec<RowKey> = Vec::new();
    let mut data: Vec<f64> = Vec::new();

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        keys.push(
            record
                .iter()
                .take(index_cols)
                .map(|s| {
                    let s = s.trim();
                    if s.is_empty() {
                        None
                    } else {
                        Some(s.to_string())
                    }
                })
                .collect(),
        );

        for raw in record.iter().skip(index_cols) {
            let value = parse_value(raw).ok_or_else(|| PrepError::InvalidValue {
                file: file_label.clone(),
                line,
                value: raw.to_string(),
            })?;
            data.push(value);
        }
    }

    let values = Array2::from_shape_vec((keys.len(), n_samples), data).map_err(|e| {
        PrepError::DimensionMismatch {
            expected: format!("{} x {} values", keys.len(), n_samples),
            got: e.to_string(),
        }
    })?;

    ExpressionTable::new(values, RowIndex::new(level_names, keys)?, sample_ids)
}

/// Write an expression table as TSV
pub fn write_expression_table<P: AsRef<Path>>(path: P, table: &ExpressionTable) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;

    let index = table.row_index();
    let header: Vec<&str> = index
        .names()
        .iter()
        .chain(table.sample_ids().iter())
        .map(|s| s.as_str())
        .collect();
    wtr.write_record(&header)?;

    let values = table.values();
    for (i, key) in index.keys().iter().enumerate() {
        let mut fields: Vec<String> = key.iter().map(|k| k.clone().unwrap_or_default()).collect();
        fields.extend(values.row(i).iter().map(|v| v.to_string()));
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}
