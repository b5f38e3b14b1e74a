//! The encoding pipeline.
//!
//! A run reads a billing export, keeps the rows of one category, and turns every
//! configured column into a number:
//!
//! ```text
//! scan_input ──> filter_category ──> add_performance_columns (optional)
//!            ──> normalize_dates ──> hex / hash / embed / numeric encoders
//!            ──> assemble (column-wise) ──> write_csv
//! ```
//!
//! Stages run synchronously and preserve row order end to end. Every error is fatal
//! and the output file is only written once all stages have succeeded.
//!
//! # Example
//!
//! ```no_run
//! use billcode::config::EncodingConfig;
//! use billcode::encoding::load_embedder;
//! use billcode::pipeline::run_pipeline;
//! use std::path::Path;
//!
//! let config = EncodingConfig::default();
//! let embedder = load_embedder(&config.embedding)?;
//! let report = run_pipeline(
//!     &config,
//!     Path::new("azure_sample.csv"),
//!     "Virtual Machines",
//!     embedder.as_ref(),
//!     None,
//! )?;
//! println!("{}", report.summary());
//! # Ok::<(), billcode::error::EncodeError>(())
//! ```

pub mod assemble;
pub mod dates;
pub mod executor;
pub mod filter;
pub mod io;
pub mod performance;

pub use assemble::{EncodedGroup, assemble};
pub use dates::{normalize_dates, parse_us_date};
pub use executor::{EncodedFrame, ROW_INDEX, RunReport, encode_frame, run_pipeline};
pub use filter::filter_category;
pub use io::{scan_input, write_csv};
pub use performance::add_performance_columns;
