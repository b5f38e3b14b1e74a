//! Column-wise assembly of the encoded groups.
//!
//! Groups are joined side by side on row identity: every encoded column must have
//! exactly one value per filtered input row, and the output has one row per filtered
//! row. Stacking groups as extra rows is never valid here.

use crate::error::{EncodeError, Result};
use polars::prelude::*;

/// Encoded columns of one group, in configuration order.
#[derive(Debug, Clone)]
pub struct EncodedGroup {
    pub name: &'static str,
    pub columns: Vec<Series>,
}

impl EncodedGroup {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            columns: Vec::new(),
        }
    }

    pub fn push(&mut self, column: Series) {
        self.columns.push(column);
    }
}

/// Join the row-index column and all groups into one frame.
///
/// Every column is rechunked so the frame has a single chunk per column; the CSV
/// writer requires aligned chunks.
pub fn assemble(index: Series, groups: Vec<EncodedGroup>) -> Result<DataFrame> {
    let expected = index.len();
    let mut columns: Vec<Column> = vec![index.rechunk().into()];

    for group in groups {
        for series in group.columns {
            if series.len() != expected {
                return Err(EncodeError::Misaligned {
                    group: group.name.to_owned(),
                    expected,
                    found: series.len(),
                });
            }
            columns.push(series.rechunk().into());
        }
    }

    Ok(DataFrame::new(columns)?)
}
