//! Category row filter.

use polars::prelude::*;

/// Keep only rows whose `column` equals `value` exactly (case-sensitive).
///
/// Rows with a null category never match. Zero matches is not an error; the empty
/// frame flows through the remaining stages. Relative row order is preserved.
pub fn filter_category(lf: LazyFrame, column: &str, value: &str) -> LazyFrame {
    lf.filter(col(column).eq(lit(value)))
}
