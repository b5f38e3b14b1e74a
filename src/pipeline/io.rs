//! Reading billing exports and writing encoded tables.

use crate::error::{EncodeError, Result, ResultExt as _};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rows sampled for CSV schema inference.
pub const INFER_SCHEMA_ROWS: usize = 10_000;

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Scan an input file lazily, reading `text_columns` as raw strings.
///
/// Only columns present in the file are forced to `String`; absent ones surface later
/// as [`EncodeError::MissingColumn`].
pub fn scan_input(path: &Path, text_columns: &[&str]) -> Result<LazyFrame> {
    if !path.exists() {
        return Err(EncodeError::InvalidPath(format!(
            "input file not found: {}",
            path.display()
        )));
    }

    match extension(path).as_str() {
        "csv" => {
            let mut inferred = LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
                .finish()
                .context("Failed to scan CSV")?;
            let schema = inferred.collect_schema()?;

            let mut overwrite = Schema::with_capacity(text_columns.len());
            for name in text_columns.iter().filter(|n| schema.contains(n)) {
                overwrite.with_column((*name).into(), DataType::String);
            }

            LazyCsvReader::new(path)
                .with_has_header(true)
                .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
                .with_dtype_overwrite(Some(Arc::new(overwrite)))
                .finish()
                .context("Failed to scan CSV")
        }
        "parquet" => {
            let lf = LazyFrame::scan_parquet(path, Default::default())
                .context("Failed to scan Parquet")?;
            cast_to_text(lf, text_columns)
        }
        "json" => {
            let df = JsonReader::new(std::fs::File::open(path)?)
                .finish()
                .context("Failed to read JSON")?;
            cast_to_text(df.lazy(), text_columns)
        }
        ext => Err(EncodeError::InvalidPath(format!(
            "unsupported file extension: '{ext}'"
        ))),
    }
}

fn cast_to_text(mut lf: LazyFrame, text_columns: &[&str]) -> Result<LazyFrame> {
    let schema = lf.collect_schema()?;
    let casts: Vec<Expr> = text_columns
        .iter()
        .filter(|n| schema.contains(n))
        .map(|n| col(*n).cast(DataType::String))
        .collect();
    Ok(lf.with_columns(casts))
}

/// Count rows in a `LazyFrame`.
pub fn count_rows(lf: &LazyFrame) -> Result<usize> {
    let count_df = lf
        .clone()
        .select([len()])
        .collect()
        .context("Failed to count rows")?;

    let count = count_df.column("len")?.as_materialized_series();
    if let Ok(ca) = count.u32() {
        Ok(ca.get(0).unwrap_or(0) as usize)
    } else if let Ok(ca) = count.u64() {
        Ok(ca.get(0).unwrap_or(0) as usize)
    } else {
        Ok(0)
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `df` as comma-separated text with a header row.
///
/// The frame is written next to `path` and renamed into place, so `path` is either
/// replaced wholesale or left untouched.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let staging = staging_path(path);
    let written = std::fs::File::create(&staging)
        .map_err(EncodeError::from)
        .and_then(|file| {
            CsvWriter::new(file)
                .include_header(true)
                .with_separator(b',')
                .finish(df)
                .map_err(EncodeError::from)
        });

    if let Err(e) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }

    std::fs::rename(&staging, path)
        .with_context(|| format!("Failed to move output into place: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_hex_column;
    use crate::pipeline::normalize_dates;

    #[test]
    fn test_scan_keeps_text_columns_raw() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bill.csv");
        std::fs::write(&path, "ProductOrderId,Cost\n0012,1.5\n0034,2.5\n")?;

        let df = scan_input(&path, &["ProductOrderId", "NotInFile"])?.collect()?;
        let ids: Vec<_> = df.column("ProductOrderId")?.str()?.into_iter().flatten().collect();
        assert_eq!(ids, ["0012", "0034"]);
        assert_eq!(df.column("Cost")?.dtype(), &DataType::Float64);
        Ok(())
    }

    #[test]
    fn test_scan_parquet_casts_text_columns() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bill.parquet");
        let mut df = df!(
            "_Date" => &["03/01/2023", "03/02/2023"],
            "SubscriptionId" => &[12_i64, 255],
            "Cost" => &[1.5, 2.5]
        )?;
        ParquetWriter::new(std::fs::File::create(&path)?).finish(&mut df)?;

        let df = scan_input(&path, &["_Date", "SubscriptionId"])?.collect()?;
        assert_eq!(df.column("SubscriptionId")?.dtype(), &DataType::String);
        assert_eq!(df.column("Cost")?.dtype(), &DataType::Float64);

        // Integer identifiers are read back as their decimal text, then as base 16.
        let ids = encode_hex_column(df.column("SubscriptionId")?.as_materialized_series())?;
        let ids: Vec<_> = ids.str()?.into_iter().flatten().collect();
        assert_eq!(ids, ["18", "597"]);

        let dated = normalize_dates(df, "_Date")?;
        let stamps: Vec<_> = dated.column("timestamp__Date")?.i64()?.into_iter().flatten().collect();
        assert_eq!(stamps, [1_677_628_800, 1_677_715_200]);
        Ok(())
    }

    #[test]
    fn test_scan_json_casts_text_columns() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bill.json");
        std::fs::write(
            &path,
            r#"[{"MeterCategory": "Virtual Machines", "ServiceInfo2": 7, "Quantity": 2.0},
                {"MeterCategory": "Storage", "ServiceInfo2": 8, "Quantity": 3.0}]"#,
        )?;

        let df = scan_input(&path, &["MeterCategory", "ServiceInfo2"])?.collect()?;
        let info: Vec<_> = df.column("ServiceInfo2")?.str()?.into_iter().flatten().collect();
        assert_eq!(info, ["7", "8"]);
        assert_eq!(df.column("Quantity")?.dtype(), &DataType::Float64);
        Ok(())
    }

    #[test]
    fn test_scan_rejects_unknown_extension() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bill.xlsx");
        std::fs::write(&path, "")?;
        assert!(scan_input(&path, &[]).is_err());
        assert!(scan_input(&dir.path().join("missing.csv"), &[]).is_err());
        Ok(())
    }

    #[test]
    fn test_count_rows() -> anyhow::Result<()> {
        let df = df!("a" => &[1, 2, 3])?;
        assert_eq!(count_rows(&df.lazy())?, 3);
        Ok(())
    }

    #[test]
    fn test_write_csv_replaces_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out").join("encoded.csv");
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, "stale")?;

        let mut df = df!("index" => &[0_u32, 1], "Cost" => &[1.5, 2.0])?;
        write_csv(&mut df, &path)?;

        let written = std::fs::read_to_string(&path)?;
        assert_eq!(written, "index,Cost\n0,1.5\n1,2.0\n");
        assert!(!staging_path(&path).exists());
        Ok(())
    }
}
