//! Parsing options for per-sample files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options controlling how each per-sample file is parsed
///
/// Every field has a default, so a JSON options file only needs the fields
/// it changes, e.g. `{"delimiter": ",", "skip_rows": 2}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Field separator
    #[serde(with = "byte_char")]
    pub delimiter: u8,
    /// First non-skipped line is a header
    pub has_header: bool,
    /// Lines starting with this byte are ignored
    #[serde(with = "opt_byte_char")]
    pub comment: Option<u8>,
    /// Leading lines skipped before parsing
    pub skip_rows: usize,
    /// Fail when a file name carries no GSM accession
    pub strict_sample_keys: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b'\t',
            has_header: true,
            comment: None,
            skip_rows: 0,
            strict_sample_keys: false,
        }
    }
}

impl ReadOptions {
    /// Load options from a JSON file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_comment(mut self, comment: Option<u8>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_strict_sample_keys(mut self, strict: bool) -> Self {
        self.strict_sample_keys = strict;
        self
    }
}

/// Parse a single-character separator; `\t` and `tab` name the tab character
pub fn parse_separator(s: &str) -> std::result::Result<u8, String> {
    match s {
        "\\t" | "tab" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("separator must be a single ASCII character, got '{}'", s)),
    }
}

mod byte_char {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &u8, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&(*b as char).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
        let s = String::deserialize(d)?;
        super::parse_separator(&s).map_err(serde::de::Error::custom)
    }
}

mod opt_byte_char {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(b: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
        match b {
            Some(b) => s.serialize_some(&(*b as char).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|s| super::parse_separator(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
