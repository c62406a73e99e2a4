//! Library-size normalization
//!
//! Provides CPM (Counts Per Million) scaling followed by a base-2 `log1p`.

use std::str::FromStr;

use ndarray::Axis;

use crate::data::ExpressionTable;
use crate::error::{PrepError, Result};
use crate::transform::{self, log1p_base};

/// Normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormMethod {
    /// Counts per million
    #[default]
    Cpm,
}

impl NormMethod {
    /// Total every sample is rescaled to
    pub fn target_sum(&self) -> f64 {
        match self {
            NormMethod::Cpm => 1e6,
        }
    }
}

impl FromStr for NormMethod {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cpm" => Ok(NormMethod::Cpm),
            _ => Err(PrepError::UnsupportedNormalization {
                method: s.to_string(),
            }),
        }
    }
}

/// Rescale every sample (column) so its values sum to `target_sum`
///
/// Samples with a total of zero are left as they are.
pub fn normalize_total(expr: &ExpressionTable, target_sum: f64) -> Result<ExpressionTable> {
    let library_sizes = expr.library_sizes();

    let mut values = expr.values().to_owned();
    for (mut col, &lib_size) in values.axis_iter_mut(Axis(1)).zip(library_sizes.iter()) {
        if lib_size != 0.0 {
            let scale = target_sum / lib_size;
            col.mapv_inplace(|x| x * scale);
        }
    }

    expr.with_values(values)
}

/// Normalize an expression table
///
/// `norm_type` is matched case-insensitively; only `cpm` is available. CPM
/// values are log-transformed with `log1p` base 2. With `log2` set, an extra
/// `log2(x + 1)` is applied on top of that, so the two transforms compound.
pub fn normalize(expr: &ExpressionTable, norm_type: &str, log2: bool) -> Result<ExpressionTable> {
    let method: NormMethod = norm_type.parse()?;

    log::debug!(
        "Normalizing {} features x {} samples to a total of {}",
        expr.n_rows(),
        expr.n_samples(),
        method.target_sum()
    );

    let scaled = normalize_total(expr, method.target_sum())?;
    let mut result = log1p_base(&scaled, 2.0);

    if log2 {
        result = transform::log2(&result);
    }

    Ok(result)
}
