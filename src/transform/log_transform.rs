//! Elementwise log transforms

use crate::data::ExpressionTable;

/// Elementwise `log2(x + 1)`
///
/// No validation: NaN and negative values below -1 propagate as NaN.
pub fn log2(expr: &ExpressionTable) -> ExpressionTable {
    expr.map_values(|x| (x + 1.0).log2())
}

/// Elementwise `ln(1 + x) / ln(base)`
///
/// `log1p_base(expr, 2.0)` equals [`log2`] up to rounding, but keeps precision
/// for values near zero.
pub fn log1p_base(expr: &ExpressionTable, base: f64) -> ExpressionTable {
    let ln_base = base.ln();
    expr.map_values(|x| x.ln_1p() / ln_base)
}
