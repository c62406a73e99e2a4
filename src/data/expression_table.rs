//! Expression table representation for merged per-sample data

use std::collections::{HashMap, HashSet};

use ndarray::{concatenate, Array2, ArrayView1, ArrayView2, Axis};

use super::RowIndex;
use crate::error::{PrepError, Result};

/// Name of the row index level produced by the archive loader
pub const ID_LEVEL: &str = "ID";

/// An expression table: features in rows, samples in columns
///
/// Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTable {
    /// Expression values (features x samples)
    values: Array2<f64>,
    /// Row index (one or more levels)
    row_index: RowIndex,
    /// Sample identifiers, one per column
    sample_ids: Vec<String>,
}

impl ExpressionTable {
    /// Create a new expression table
    pub fn new(values: Array2<f64>, row_index: RowIndex, sample_ids: Vec<String>) -> Result<Self> {
        let (n_rows, n_samples) = values.dim();

        if row_index.len() != n_rows {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} row keys", n_rows),
                got: format!("{} row keys", row_index.len()),
            });
        }

        if sample_ids.len() != n_samples {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} sample IDs", n_samples),
                got: format!("{} sample IDs", sample_ids.len()),
            });
        }

        let mut seen = HashSet::new();
        for id in &sample_ids {
            if !seen.insert(id.as_str()) {
                return Err(PrepError::DuplicateSample { sample: id.clone() });
            }
        }

        Ok(Self {
            values,
            row_index,
            sample_ids,
        })
    }

    /// Create a table with a single `ID` index level
    pub fn from_ids(values: Array2<f64>, ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        Self::new(values, RowIndex::single(ID_LEVEL, ids), sample_ids)
    }

    /// Create a one-column table for a single sample
    pub fn single_sample(ids: Vec<String>, sample_id: &str, values: Vec<f64>) -> Result<Self> {
        let n = values.len();
        let values = Array2::from_shape_vec((n, 1), values).map_err(|e| PrepError::DimensionMismatch {
            expected: format!("{} values", n),
            got: e.to_string(),
        })?;
        Self::from_ids(values, ids, vec![sample_id.to_string()])
    }

    /// Get the number of rows (features)
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Get the number of samples
    pub fn n_samples(&self) -> usize {
        self.values.ncols()
    }

    /// Get the values as a view
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn row_index(&self) -> &RowIndex {
        &self.row_index
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Get sample column index by ID
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|id| id == sample_id)
    }

    /// Get values for a specific sample
    pub fn sample_values(&self, sample_idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(sample_idx)
    }

    /// Row position of a feature ID (innermost index level)
    pub fn row_position(&self, id: &str) -> Option<usize> {
        let level = self.row_index.n_levels() - 1;
        self.row_index
            .keys()
            .iter()
            .position(|k| k[level].as_deref() == Some(id))
    }

    /// Value for a feature ID and sample ID
    pub fn get(&self, id: &str, sample_id: &str) -> Option<f64> {
        let i = self.row_position(id)?;
        let j = self.sample_index(sample_id)?;
        Some(self.values[[i, j]])
    }

    /// Sum of values per sample (library size)
    pub fn library_sizes(&self) -> Vec<f64> {
        self.values
            .axis_iter(Axis(1))
            .map(|col| col.sum())
            .collect()
    }

    /// Apply a function to every value, keeping labels
    pub fn map_values<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            values: self.values.mapv(f),
            row_index: self.row_index.clone(),
            sample_ids: self.sample_ids.clone(),
        }
    }

    /// Same labels, new values of identical shape
    pub fn with_values(&self, values: Array2<f64>) -> Result<Self> {
        if values.dim() != self.values.dim() {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{:?}", self.values.dim()),
                got: format!("{:?}", values.dim()),
            });
        }
        Self::new(values, self.row_index.clone(), self.sample_ids.clone())
    }

    /// Same values and samples, new row index
    pub fn with_row_index(self, row_index: RowIndex) -> Result<Self> {
        Self::new(self.values, row_index, self.sample_ids)
    }

    /// Index-aligned inner join
    ///
    /// Keeps rows whose full key exists in both tables, in this table's row
    /// order, and appends `other`'s sample columns.
    pub fn inner_join(&self, other: &ExpressionTable) -> Result<Self> {
        if self.row_index.n_levels() != other.row_index.n_levels() {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} index levels", self.row_index.n_levels()),
                got: format!("{} index levels", other.row_index.n_levels()),
            });
        }

        let lookup: HashMap<&[Option<String>], usize> = other
            .row_index
            .keys()
            .iter()
            .enumerate()
            .map(|(i, k)| (k.as_slice(), i))
            .collect();

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = self
            .row_index
            .keys()
            .iter()
            .enumerate()
            .filter_map(|(i, k)| lookup.get(k.as_slice()).map(|&j| (i, j)))
            .unzip();

        let left = self.values.select(Axis(0), &left_rows);
        let right = other.values.select(Axis(0), &right_rows);
        let values = concatenate(Axis(1), &[left.view(), right.view()]).map_err(|e| {
            PrepError::DimensionMismatch {
                expected: format!("{} joined rows", left_rows.len()),
                got: e.to_string(),
            }
        })?;

        let mut sample_ids = self.sample_ids.clone();
        sample_ids.extend(other.sample_ids.iter().cloned());

        Self::new(values, self.row_index.select(&left_rows), sample_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_creation() {
        let table = ExpressionTable::from_ids(
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
            ids(&["g1", "g2", "g3"]),
            ids(&["GSM1", "GSM2"]),
        )
        .unwrap();

        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_samples(), 2);
        assert_eq!(table.get("g2", "GSM2"), Some(4.0));
        assert_eq!(table.library_sizes(), vec![9.0, 12.0]);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let result = ExpressionTable::from_ids(
            array![[1.0, 2.0]],
            ids(&["g1", "g2"]),
            ids(&["GSM1", "GSM2"]),
        );
        assert!(matches!(result, Err(PrepError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_duplicate_samples_rejected() {
        let result = ExpressionTable::from_ids(
            array![[1.0, 2.0]],
            ids(&["g1"]),
            ids(&["GSM1", "GSM1"]),
        );
        assert!(matches!(result, Err(PrepError::DuplicateSample { .. })));
    }

    #[test]
    fn test_inner_join_keeps_shared_rows_in_left_order() {
        let left = ExpressionTable::single_sample(ids(&["g3", "g1", "g2"]), "GSM1", vec![3.0, 1.0, 2.0])
            .unwrap();
        let right = ExpressionTable::single_sample(ids(&["g1", "g3", "g4"]), "GSM2", vec![10.0, 30.0, 40.0])
            .unwrap();

        let joined = left.inner_join(&right).unwrap();

        assert_eq!(joined.sample_ids(), &["GSM1".to_string(), "GSM2".to_string()]);
        assert_eq!(joined.row_index().innermost(), vec![Some("g3"), Some("g1")]);
        assert_eq!(joined.values(), array![[3.0, 30.0], [1.0, 10.0]]);
    }

    #[test]
    fn test_inner_join_without_overlap_is_empty() {
        let left = ExpressionTable::single_sample(ids(&["a"]), "GSM1", vec![1.0]).unwrap();
        let right = ExpressionTable::single_sample(ids(&["b"]), "GSM2", vec![2.0]).unwrap();

        let joined = left.inner_join(&right).unwrap();
        assert_eq!(joined.n_rows(), 0);
        assert_eq!(joined.n_samples(), 2);
    }
}
