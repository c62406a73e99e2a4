//! Probe types, organisms and the bundled reference lookup tables

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;

use crate::error::{PrepError, Result};

/// Directory holding the bundled reference tables
pub const REFERENCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/references");

/// Bundled reference directory as a path
pub fn default_reference_dir() -> PathBuf {
    PathBuf::from(REFERENCE_DIR)
}

/// Organism with a bundled reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Organism {
    Human,
    Mouse,
}

impl Organism {
    /// File name of the organism's reference table
    pub fn reference_file(&self) -> &'static str {
        match self {
            Organism::Human => "homo_sapiens.csv",
            Organism::Mouse => "mus_musculus.csv",
        }
    }
}

/// Ensembl identifier scheme used for the `ProbeID` level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeType {
    /// Human transcript
    Enst,
    /// Human gene
    Ensg,
    /// Mouse transcript
    Ensmust,
    /// Mouse gene
    Ensmusg,
}

impl ProbeType {
    /// Column name in the reference table
    pub fn column(&self) -> &'static str {
        match self {
            ProbeType::Enst => "ENST",
            ProbeType::Ensg => "ENSG",
            ProbeType::Ensmust => "ENSMUST",
            ProbeType::Ensmusg => "ENSMUSG",
        }
    }

    pub fn organism(&self) -> Organism {
        match self {
            ProbeType::Enst | ProbeType::Ensg => Organism::Human,
            ProbeType::Ensmust | ProbeType::Ensmusg => Organism::Mouse,
        }
    }
}

impl FromStr for ProbeType {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "ENST" => Ok(ProbeType::Enst),
            "ENSG" => Ok(ProbeType::Ensg),
            "ENSMUST" => Ok(ProbeType::Ensmust),
            "ENSMUSG" => Ok(ProbeType::Ensmusg),
            _ => Err(PrepError::UnsupportedProbeType {
                probe_type: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Lookup from source feature ID to one target identifier scheme
///
/// Built from the first column (source IDs) and one named column of a
/// reference CSV. The first row for a source ID wins; empty cells are
/// absent targets.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    column: String,
    lookup: HashMap<String, Option<String>>,
}

impl ReferenceTable {
    /// Load `column` from the reference CSV at `path`
    pub fn load<P: AsRef<Path>>(path: P, column: &str) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

        let col_idx = rdr
            .headers()?
            .iter()
            .skip(1)
            .position(|h| h.trim() == column)
            .map(|i| i + 1)
            .ok_or_else(|| PrepError::MissingReferenceColumn {
                file: path.display().to_string(),
                column: column.to_string(),
            })?;

        let mut lookup = HashMap::new();
        let mut duplicates = 0usize;

        for record in rdr.records() {
            let record = record?;
            let source = record.get(0).unwrap_or_default().trim();
            let target = record
                .get(col_idx)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);

            if lookup.contains_key(source) {
                duplicates += 1;
                continue;
            }
            lookup.insert(source.to_string(), target);
        }

        debug!(
            "Loaded {} {} references from {} ({} duplicate source IDs dropped)",
            lookup.len(),
            column,
            path.display(),
            duplicates
        );

        Ok(Self {
            column: column.to_string(),
            lookup,
        })
    }

    /// Load the bundled table for a probe type from `dir`
    pub fn for_probe_type(probe_type: ProbeType, dir: &Path) -> Result<Self> {
        Self::load(dir.join(probe_type.organism().reference_file()), probe_type.column())
    }

    /// Target ID for a source ID
    pub fn get(&self, source: &str) -> Option<&str> {
        self.lookup.get(source).and_then(|t| t.as_deref())
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}
