//! Row index with one or more named levels

use crate::error::{PrepError, Result};

/// One row key: an entry per index level, `None` where the entry is absent
pub type RowKey = Vec<Option<String>>;

/// Row index of an expression table
///
/// Levels are ordered outermost first. A freshly loaded table has a single
/// `ID` level; annotation prepends a `ProbeID` level.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIndex {
    /// Level names, outermost first
    names: Vec<String>,
    /// One key per row
    keys: Vec<RowKey>,
}

impl RowIndex {
    /// Create a row index from level names and per-row keys
    pub fn new(names: Vec<String>, keys: Vec<RowKey>) -> Result<Self> {
        if names.is_empty() {
            return Err(PrepError::InvalidInput {
                reason: "Row index needs at least one level".to_string(),
            });
        }

        if let Some(bad) = keys.iter().find(|k| k.len() != names.len()) {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} index levels", names.len()),
                got: format!("{} index levels", bad.len()),
            });
        }

        Ok(Self { names, keys })
    }

    /// Single-level index where every entry is present
    pub fn single(name: &str, ids: Vec<String>) -> Self {
        Self {
            names: vec![name.to_string()],
            keys: ids.into_iter().map(|id| vec![Some(id)]).collect(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of levels
    pub fn n_levels(&self) -> usize {
        self.names.len()
    }

    /// Level names, outermost first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// All row keys
    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// Values of one level, row by row
    pub fn level(&self, level: usize) -> Vec<Option<&str>> {
        self.keys.iter().map(|k| k[level].as_deref()).collect()
    }

    /// Values of the innermost level (the original feature IDs)
    pub fn innermost(&self) -> Vec<Option<&str>> {
        self.level(self.n_levels() - 1)
    }

    /// Row position of a full key
    pub fn position(&self, key: &[Option<String>]) -> Option<usize> {
        self.keys.iter().position(|k| k.as_slice() == key)
    }

    /// Keep only the given rows, in the given order
    pub fn select(&self, rows: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            keys: rows.iter().map(|&i| self.keys[i].clone()).collect(),
        }
    }

    /// New index with `name` as the outermost level followed by the existing levels
    pub fn with_outer_level(&self, name: &str, values: Vec<Option<String>>) -> Result<Self> {
        if values.len() != self.len() {
            return Err(PrepError::DimensionMismatch {
                expected: format!("{} index values", self.len()),
                got: format!("{} index values", values.len()),
            });
        }

        let mut names = Vec::with_capacity(self.n_levels() + 1);
        names.push(name.to_string());
        names.extend(self.names.iter().cloned());

        let keys = values
            .into_iter()
            .zip(self.keys.iter())
            .map(|(outer, key)| {
                let mut new_key = Vec::with_capacity(key.len() + 1);
                new_key.push(outer);
                new_key.extend(key.iter().cloned());
                new_key
            })
            .collect();

        Ok(Self { names, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_level() {
        let index = RowIndex::single("ID", vec!["g1".to_string(), "g2".to_string()]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.n_levels(), 1);
        assert_eq!(index.innermost(), vec![Some("g1"), Some("g2")]);
        assert_eq!(index.position(&[Some("g2".to_string())]), Some(1));
    }

    #[test]
    fn test_outer_level_prepended() {
        let index = RowIndex::single("ID", vec!["g1".to_string(), "g2".to_string()]);
        let nested = index
            .with_outer_level("ProbeID", vec![Some("ENSG1".to_string()), None])
            .unwrap();

        assert_eq!(nested.names(), &["ProbeID".to_string(), "ID".to_string()]);
        assert_eq!(nested.level(0), vec![Some("ENSG1"), None]);
        assert_eq!(nested.innermost(), vec![Some("g1"), Some("g2")]);
    }

    #[test]
    fn test_ragged_keys_rejected() {
        let result = RowIndex::new(
            vec!["ProbeID".to_string(), "ID".to_string()],
            vec![vec![Some("a".to_string())]],
        );
        assert!(matches!(result, Err(PrepError::DimensionMismatch { .. })));
    }
}
