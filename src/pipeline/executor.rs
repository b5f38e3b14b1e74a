//! Pipeline execution engine.
//!
//! Runs the stages in order (filter, performance columns, date normalization, group
//! encoding, assembly) and writes the result. Any failure aborts the run before the
//! output file is touched.

use super::assemble::{EncodedGroup, assemble};
use super::dates::normalize_dates;
use super::filter::filter_category;
use super::io::{count_rows, scan_input, write_csv};
use super::performance::{CONSUMED_QTY, VCPUS, add_performance_columns};
use crate::config::EncodingConfig;
use crate::encoding::{TextEmbedder, encode_embed_column, encode_hash_column, encode_hex_column};
use crate::error::{EncodeError, Result, ResultExt as _};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Name of the leading row-identity column.
pub const ROW_INDEX: &str = "index";

/// Report generated after a pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Rows in the input file
    pub rows_read: usize,

    /// Rows matching the category filter (and written)
    pub rows_kept: usize,

    /// Output columns, including the row index
    pub columns_written: usize,

    /// Input columns that belong to no group
    pub dropped_columns: Vec<String>,

    pub output_path: PathBuf,

    pub duration: Duration,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Encoded {} of {} rows into {} columns ({} dropped) -> {} in {:.2}s",
            self.rows_kept,
            self.rows_read,
            self.columns_written,
            self.dropped_columns.len(),
            self.output_path.display(),
            self.duration.as_secs_f64()
        )
    }

    /// Emit the report as one structured `info` event.
    pub fn log(&self) {
        tracing::info!(
            rows_read = self.rows_read,
            rows_kept = self.rows_kept,
            columns_written = self.columns_written,
            dropped = self.dropped_columns.len(),
            output = %self.output_path.display(),
            elapsed_ms = self.duration.as_millis() as u64,
            "Run finished"
        );
    }
}

/// A fully encoded frame plus the columns that did not make it in.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    pub frame: DataFrame,
    pub dropped_columns: Vec<String>,
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| EncodeError::MissingColumn(name.to_owned()))
}

/// Columns of `df` that no group claims (the row index excepted).
pub fn unassigned_columns(df: &DataFrame, config: &EncodingConfig) -> Vec<String> {
    let groups = config.resolved_groups();
    df.get_column_names_str()
        .into_iter()
        .filter(|name| *name != ROW_INDEX && !groups.contains(name))
        .map(str::to_owned)
        .collect()
}

/// Check that every source column the configuration relies on exists.
pub fn check_columns(schema: &Schema, config: &EncodingConfig) -> Result<()> {
    let mut derived: HashSet<String> = HashSet::from([config.timestamp_column()]);
    if config.performance_columns {
        derived.extend([CONSUMED_QTY.to_owned(), VCPUS.to_owned()]);
    }

    let required = [config.category_column.as_str(), config.date_column.as_str()]
        .into_iter()
        .chain(config.groups.iter().map(|(_, name)| name))
        .filter(|name| !derived.contains(*name));

    for name in required {
        if !schema.contains(name) {
            return Err(EncodeError::MissingColumn(name.to_owned()));
        }
    }
    Ok(())
}

/// Encode an already-filtered frame into the all-numeric output layout.
///
/// Output columns are the row index followed by the hex, hash, embed and numeric
/// groups in configuration order. A frame without a row-index column gets one.
pub fn encode_frame(
    df: DataFrame,
    config: &EncodingConfig,
    embedder: &dyn TextEmbedder,
) -> Result<EncodedFrame> {
    let df = if df.get_column_names_str().contains(&ROW_INDEX) {
        df
    } else {
        df.with_row_index(ROW_INDEX.into(), None)?
    };

    let row_ids: Vec<usize> = column(&df, ROW_INDEX)?
        .cast(&DataType::UInt64)?
        .u64()?
        .into_iter()
        .enumerate()
        .map(|(pos, id)| id.map_or(pos, |id| id as usize))
        .collect();
    let input_row = |pos: usize| row_ids.get(pos).copied().unwrap_or(pos);

    let df = if config.performance_columns {
        add_performance_columns(df)?
    } else {
        df
    };
    let df = normalize_dates(df, &config.date_column).map_err(|e| e.map_row(input_row))?;

    let dropped_columns = unassigned_columns(&df, config);
    for name in &dropped_columns {
        tracing::warn!("Column '{name}' is not in any group and will be dropped");
    }

    let groups = config.resolved_groups();
    let mut hex = EncodedGroup::new("hex");
    for name in &groups.hex {
        let encoded = encode_hex_column(column(&df, name)?).map_err(|e| e.map_row(input_row))?;
        hex.push(encoded);
    }

    let mut hash = EncodedGroup::new("hash");
    for name in &groups.hash {
        hash.push(encode_hash_column(column(&df, name)?));
    }

    let mut embed = EncodedGroup::new("embed");
    for name in &groups.embed {
        tracing::debug!("Embedding column '{name}'");
        for series in encode_embed_column(embedder, column(&df, name)?, config.embedding.output)? {
            embed.push(series);
        }
    }

    let mut numeric = EncodedGroup::new("numeric");
    for name in &groups.numeric {
        let series = column(&df, name)?
            .strict_cast(&DataType::Float64)
            .with_context(|| format!("Numeric column '{name}' holds non-numeric values"))?;
        numeric.push(series);
    }

    let index = column(&df, ROW_INDEX)?.clone();
    let frame = assemble(index, vec![hex, hash, embed, numeric])?;

    Ok(EncodedFrame {
        frame,
        dropped_columns,
    })
}

/// Run the whole pipeline: read `input`, keep rows whose category equals `category`,
/// encode, and write the output file.
///
/// `output_override` takes precedence over `config.output_path`.
pub fn run_pipeline(
    config: &EncodingConfig,
    input: &Path,
    category: &str,
    embedder: &dyn TextEmbedder,
    output_override: Option<&Path>,
) -> Result<RunReport> {
    let start = Instant::now();
    config.validate()?;

    let mut lf = scan_input(input, &config.text_columns())?;
    let schema = lf.collect_schema()?;
    check_columns(&schema, config)?;

    let lf = lf.with_row_index(ROW_INDEX, None);
    let rows_read = count_rows(&lf)?;

    let filtered = filter_category(lf, &config.category_column, category)
        .collect()
        .context("Failed to filter rows")?;
    tracing::info!(
        "{} of {rows_read} rows match {} = {category:?}",
        filtered.height(),
        config.category_column
    );

    let EncodedFrame {
        mut frame,
        dropped_columns,
    } = encode_frame(filtered, config, embedder)?;

    let output_path = output_override.map_or_else(|| config.output_path.clone(), Path::to_path_buf);
    write_csv(&mut frame, &output_path)?;

    let report = RunReport {
        rows_read,
        rows_kept: frame.height(),
        columns_written: frame.width(),
        dropped_columns,
        output_path,
        duration: start.elapsed(),
    };
    report.log();
    Ok(report)
}
