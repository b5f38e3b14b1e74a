//! Identity-hex encoding for GUID-like identifiers.

use super::cell::Cell;
use crate::error::{EncodeError, Result};
use num_bigint::BigInt;
use polars::prelude::*;

/// Read `text` as base 16 once every `-` is removed.
///
/// Surrounding whitespace, a leading `+`, a `0x`/`0X` prefix and single `_`
/// separators between digits are accepted, the same literal forms a base-16 integer
/// parse usually takes.
fn parse_hex_text(text: &str) -> Option<BigInt> {
    let stripped: String = text.chars().filter(|c| *c != '-').collect();
    let body = stripped.trim();
    let body = body.strip_prefix('+').unwrap_or(body);
    let body = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(rest) => rest.strip_prefix('_').unwrap_or(rest),
        None => body,
    };

    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return None;
    }
    let digits: String = body.chars().filter(|c| *c != '_').collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    BigInt::parse_bytes(digits.as_bytes(), 16)
}

/// Decode a dash-delimited hexadecimal cell into an integer.
///
/// Nulls and floats encode to 0. Integer cells (the derived timestamp) keep their
/// value. Text goes through `parse_hex_text`; `None` means it is not hexadecimal.
pub fn hex_encode(cell: &Cell<'_>) -> Option<BigInt> {
    match cell {
        Cell::Null | Cell::Float(_) => Some(BigInt::default()),
        Cell::Bool(b) => Some(BigInt::from(u8::from(*b))),
        Cell::Int(i) => Some(BigInt::from(*i)),
        Cell::UInt(u) => Some(BigInt::from(*u)),
        Cell::Text(text) => parse_hex_text(text),
    }
}

/// Encode a whole column. Values are written as decimal strings since they may
/// exceed 64 bits.
pub fn encode_hex_column(series: &Series) -> Result<Series> {
    let series = series.rechunk();
    let mut encoded = Vec::with_capacity(series.len());

    for (row, value) in series.iter().enumerate() {
        let cell = Cell::from(value);
        let number = hex_encode(&cell).ok_or_else(|| EncodeError::MalformedHex {
            column: series.name().to_string(),
            row,
            value: cell.canonical().unwrap_or_default().into_owned(),
        })?;
        encoded.push(number.to_string());
    }

    Ok(Series::new(series.name().clone(), encoded))
}
