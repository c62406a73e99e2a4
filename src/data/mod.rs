//! Data structures for expression tables

mod expression_table;
mod row_index;

pub use expression_table::{ExpressionTable, ID_LEVEL};
pub use row_index::{RowIndex, RowKey};
