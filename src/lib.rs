//! # billcode - Billing Export Feature Encoder
//!
//! billcode turns a tabular cloud billing export into an all-numeric table that can
//! feed downstream models. Rows are filtered by category, the date column becomes an
//! epoch timestamp, and every other configured column is encoded by the strategy of
//! its group.
//!
//! ## Quick Start
//!
//! ```no_run
//! use billcode::config::EncodingConfig;
//! use billcode::encoding::HashedEmbedder;
//! use billcode::pipeline::run_pipeline;
//! use std::path::Path;
//!
//! # fn example() -> billcode::error::Result<()> {
//! let config = EncodingConfig::default();
//! let embedder = HashedEmbedder::new(config.embedding.dimension);
//! let report = run_pipeline(&config, Path::new("bill.csv"), "Virtual Machines", &embedder, None)?;
//! println!("{} rows encoded", report.rows_kept);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`config`]: Column groups and run settings (JSON)
//! - [`encoding`]: Per-cell hex, hash and embedding encoders
//! - [`pipeline`]: Filtering, date normalization, assembly and I/O
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: Console and rolling-file logging
//!
//! ## Column Groups
//!
//! | Group     | Encoding                                                   |
//! |-----------|------------------------------------------------------------|
//! | `hex`     | dashes stripped, read as base 16 (arbitrary precision)     |
//! | `hash`    | xxHash64 of the canonical text, stable across runs         |
//! | `embed`   | mean of the text's embedding vector (or the full vector)   |
//! | `numeric` | copied through as Float64                                  |
//!
//! Columns outside every group are dropped from the output with a warning.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod pipeline;
