//! Integration tests for the full encoding pipeline
//!
//! These tests run `run_pipeline` on the fixture export in `testdata/` and inspect
//! the CSV written to a temporary directory.

use billcode::config::EncodingConfig;
use billcode::encoding::{HashedEmbedder, WordVectors};
use billcode::error::EncodeError;
use billcode::pipeline::run_pipeline;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SAMPLE: &str = "testdata/billing_sample.csv";
const VECTORS: &str = "testdata/word_vectors.txt";

/// Parse a written output file into a header and rows of `column -> raw text`.
fn read_output(path: &Path) -> (Vec<String>, Vec<HashMap<String, String>>) {
    let content = std::fs::read_to_string(path).expect("output file should exist");
    let mut lines = content.lines();
    let header: Vec<String> = lines
        .next()
        .expect("header row")
        .split(',')
        .map(str::to_owned)
        .collect();
    let rows = lines
        .map(|line| {
            header
                .iter()
                .cloned()
                .zip(line.split(',').map(str::to_owned))
                .collect()
        })
        .collect();
    (header, rows)
}

fn output_in(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("data").join("encoded.csv")
}

#[test]
fn test_end_to_end_virtual_machines() {
    let dir = tempfile::tempdir().unwrap();
    let output = output_in(&dir);
    let config = EncodingConfig::default();
    let embedder = WordVectors::load(Path::new(VECTORS)).unwrap();

    let report = run_pipeline(
        &config,
        Path::new(SAMPLE),
        "Virtual Machines",
        &embedder,
        Some(output.as_path()),
    )
    .expect("pipeline should succeed");

    assert_eq!(report.rows_read, 3);
    assert_eq!(report.rows_kept, 1);
    assert_eq!(report.dropped_columns, ["Tags"]);

    let (header, rows) = read_output(&output);
    assert_eq!(header.len(), 1 + config.groups.len());
    assert_eq!(header[0], "index");
    assert_eq!(rows.len(), 1, "one row per filtered input row");

    let row = &rows[0];
    assert_eq!(row["index"], "1");
    assert_eq!(row["timestamp__Date"], "1677628800");
    assert_eq!(row["SubscriptionId"], "43707");
    assert_eq!(
        row["ProductOrderId"],
        "20095106327972375235668719608427373040"
    );
    assert_eq!(row["MeterRegion"], "9167919874437448498");
    assert_eq!(row["SubscriptionEnv"], "13482915549598117490");
    assert_eq!(row["ServiceInfo2"], "0", "null categorical hashes to 0");

    let product: f64 = row["Product"].parse().unwrap();
    assert!((product - 1.0).abs() < 1e-9, "mean of averaged vectors");
    let plan: f64 = row["PlanName"].parse().unwrap();
    assert_eq!(plan, 0.0, "null text embeds to 0");

    let quantity: f64 = row["Quantity"].parse().unwrap();
    let cost: f64 = row["Cost"].parse().unwrap();
    assert_eq!(quantity, 24.0);
    assert_eq!(cost, 12.5);
}

#[test]
fn test_empty_filter_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let output = output_in(&dir);
    let config = EncodingConfig::default();

    let report = run_pipeline(
        &config,
        Path::new(SAMPLE),
        "virtual machines",
        &HashedEmbedder::new(8),
        Some(output.as_path()),
    )
    .expect("zero matches is not an error");

    assert_eq!(report.rows_kept, 0);
    let (header, rows) = read_output(&output);
    assert_eq!(header.len(), 1 + config.groups.len());
    assert!(rows.is_empty());
}

#[test]
fn test_malformed_date_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bill.csv");
    let sample = std::fs::read_to_string(SAMPLE).unwrap();
    std::fs::write(&input, sample.replace("03/01/2023", "2023-03-01")).unwrap();
    let output = output_in(&dir);

    let err = run_pipeline(
        &EncodingConfig::default(),
        &input,
        "Virtual Machines",
        &HashedEmbedder::new(8),
        Some(output.as_path()),
    )
    .unwrap_err();

    assert!(
        matches!(err, EncodeError::MalformedDate { row: 1, .. }),
        "unexpected error: {err}"
    );
    assert!(!output.exists());
}

#[test]
fn test_existing_output_survives_failed_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bill.csv");
    let sample = std::fs::read_to_string(SAMPLE).unwrap();
    std::fs::write(&input, sample.replace("AA-BB", "ZZ-BB")).unwrap();
    let output = output_in(&dir);
    std::fs::create_dir_all(output.parent().unwrap()).unwrap();
    std::fs::write(&output, "previous run").unwrap();

    let err = run_pipeline(
        &EncodingConfig::default(),
        &input,
        "Virtual Machines",
        &HashedEmbedder::new(8),
        Some(output.as_path()),
    )
    .unwrap_err();

    assert!(matches!(err, EncodeError::MalformedHex { .. }));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run");
}

#[test]
fn test_performance_columns() {
    let dir = tempfile::tempdir().unwrap();
    let output = output_in(&dir);
    let mut config = EncodingConfig::default();
    config.performance_columns = true;
    config.groups.numeric.extend(["ConsumedQty".to_owned(), "VCPUs".to_owned()]);

    run_pipeline(
        &config,
        Path::new(SAMPLE),
        "Virtual Machines",
        &HashedEmbedder::new(8),
        Some(output.as_path()),
    )
    .unwrap();

    let (header, rows) = read_output(&output);
    assert_eq!(header.len(), 1 + config.groups.len());
    assert_eq!(rows[0]["ConsumedQty"].parse::<f64>().unwrap(), 24.0);
    assert_eq!(rows[0]["VCPUs"].parse::<f64>().unwrap(), 2.0);
}

#[test]
fn test_performance_flag_alone_adds_numeric_columns() {
    let dir = tempfile::tempdir().unwrap();
    let output = output_in(&dir);
    let config = EncodingConfig {
        performance_columns: true,
        ..Default::default()
    };

    let report = run_pipeline(
        &config,
        Path::new(SAMPLE),
        "Virtual Machines",
        &HashedEmbedder::new(8),
        Some(output.as_path()),
    )
    .unwrap();

    assert_eq!(report.dropped_columns, ["Tags"]);
    let (header, rows) = read_output(&output);
    assert_eq!(header.len(), 1 + config.groups.len() + 2);
    assert_eq!(header[header.len() - 2..], ["ConsumedQty", "VCPUs"]);
    assert_eq!(rows[0]["ConsumedQty"].parse::<f64>().unwrap(), 24.0);
    assert_eq!(rows[0]["VCPUs"].parse::<f64>().unwrap(), 2.0);
}

#[test]
fn test_missing_column_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EncodingConfig::default();
    config.groups.hash.push("Region".to_owned());

    let err = run_pipeline(
        &config,
        Path::new(SAMPLE),
        "Virtual Machines",
        &HashedEmbedder::new(8),
        Some(output_in(&dir).as_path()),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Column not found: Region");
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    let config = EncodingConfig::default();

    for output in [&first, &second] {
        run_pipeline(
            &config,
            Path::new(SAMPLE),
            "Virtual Machines",
            &HashedEmbedder::new(config.embedding.dimension),
            Some(output.as_path()),
        )
        .unwrap();
    }

    assert_eq!(
        std::fs::read_to_string(first).unwrap(),
        std::fs::read_to_string(second).unwrap()
    );
}
