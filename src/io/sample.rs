//! Parsing of single-sample two-column files

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use flate2::read::MultiGzDecoder;
use log::{debug, warn};
use regex::Regex;

use super::ReadOptions;
use crate::data::ExpressionTable;
use crate::error::{PrepError, Result};

static GSM_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"GSM[0-9]+").ok());

/// Tokens read as missing values
const MISSING_TOKENS: [&str; 18] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan",
];

/// First GSM accession in a file name
pub fn sample_key(file_name: &str) -> Option<&str> {
    GSM_PATTERN
        .as_ref()
        .and_then(|re| re.find(file_name))
        .map(|m| m.as_str())
}

/// Sample key for a file, falling back to the whole file name unless `strict`
pub fn resolve_sample_key(file_name: &str, strict: bool) -> Result<String> {
    match sample_key(file_name) {
        Some(key) => Ok(key.to_string()),
        None if strict => Err(PrepError::MissingSampleKey {
            file: file_name.to_string(),
        }),
        None => {
            warn!(
                "No GSM accession in file name '{}'; using the file name as sample key",
                file_name
            );
            Ok(file_name.to_string())
        }
    }
}

/// Open a text file, decompressing `.gz` files on the fly
fn open_text_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let is_gz = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("gz"));

    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub(crate) fn parse_value(token: &str) -> Option<f64> {
    let token = token.trim();
    if MISSING_TOKENS.contains(&token) {
        return Some(f64::NAN);
    }
    token.parse::<f64>().ok()
}

/// Read one per-sample file into a single-column table
///
/// The file must have exactly two columns: feature ID and value. The ID
/// column becomes the `ID` index level and the value column is named
/// `sample_id`. Repeated IDs keep their first value.
pub fn read_sample_file(path: &Path, sample_id: &str, options: &ReadOptions) -> Result<ExpressionTable> {
    let file_label = path.display().to_string();
    let mut reader = open_text_reader(path)?;

    for _ in 0..options.skip_rows {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_header)
        .comment(options.comment)
        .from_reader(reader);

    if options.has_header {
        let n_columns = rdr.headers()?.len();
        if n_columns != 2 {
            return Err(PrepError::MalformedSample {
                file: file_label,
                columns: n_columns,
            });
        }
    }

    let mut ids = Vec::new();
    let mut values = Vec::new();
    let mut seen = HashSet::new();

    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        // Rows after the first must match its width, so only the first can trip this
        if record.len() != 2 {
            return Err(PrepError::MalformedSample {
                file: file_label,
                columns: record.len(),
            });
        }

        let id = record[0].trim().to_string();
        let raw = &record[1];
        let value = parse_value(raw).ok_or_else(|| PrepError::InvalidValue {
            file: file_label.clone(),
            line,
            value: raw.to_string(),
        })?;

        if !seen.insert(id.clone()) {
            warn!("Duplicate ID '{}' in {} (line {}); keeping the first value", id, file_label, line);
            continue;
        }

        ids.push(id);
        values.push(value);
    }

    if ids.is_empty() && !options.has_header {
        return Err(PrepError::MalformedSample {
            file: file_label,
            columns: 0,
        });
    }

    debug!("Read {} features for sample {} from {}", ids.len(), sample_id, file_label);

    ExpressionTable::single_sample(ids, sample_id, values)
}
