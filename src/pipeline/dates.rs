//! Date normalization: `MM/DD/YYYY` text to epoch seconds.

use crate::config::TIMESTAMP_PREFIX;
use crate::error::{EncodeError, Result};
use chrono::NaiveDate;
use polars::prelude::*;

pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Seconds since the epoch for midnight UTC of a `MM/DD/YYYY` date.
pub fn parse_us_date(text: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// Replace `column` with `timestamp_<column>` holding epoch seconds.
///
/// Nulls stay null. Any other cell that is not a `MM/DD/YYYY` date fails the whole
/// step; there is no per-row skip.
pub fn normalize_dates(df: DataFrame, column: &str) -> Result<DataFrame> {
    let series = df
        .column(column)
        .map_err(|_| EncodeError::MissingColumn(column.to_owned()))?
        .as_materialized_series();
    let dates = series.str()?;

    let mut stamps = Vec::with_capacity(dates.len());
    for (row, value) in dates.into_iter().enumerate() {
        let stamp = match value {
            None => None,
            Some(text) => Some(parse_us_date(text).ok_or_else(|| EncodeError::MalformedDate {
                column: column.to_owned(),
                row,
                value: text.to_owned(),
            })?),
        };
        stamps.push(stamp);
    }

    let stamp = Series::new(format!("{TIMESTAMP_PREFIX}{column}").into(), stamps);
    let mut df = df.drop(column)?;
    df.with_column(stamp)?;
    tracing::debug!("Normalized date column '{column}'");
    Ok(df)
}
