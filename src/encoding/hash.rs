//! Categorical digests.
//!
//! Cells are digested with xxHash64 (seed 0) over their canonical UTF-8 form, so
//! encoded datasets are identical across runs, processes and platforms.

use super::cell::Cell;
use polars::prelude::*;
use xxhash_rust::xxh64::xxh64;

pub const HASH_SEED: u64 = 0;

/// Digest a single cell. Null encodes to 0.
pub fn hash_encode(cell: &Cell<'_>) -> u64 {
    cell.canonical()
        .map_or(0, |canonical| xxh64(canonical.as_bytes(), HASH_SEED))
}

pub fn encode_hash_column(series: &Series) -> Series {
    let series = series.rechunk();
    let encoded: Vec<u64> = series
        .iter()
        .map(|value| hash_encode(&Cell::from(value)))
        .collect();
    Series::new(series.name().clone(), encoded)
}
