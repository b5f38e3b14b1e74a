use anyhow::{Context as _, Result};
use billcode::config::{EmbeddingOutput, EncodingConfig};
use billcode::encoding::load_embedder;
use billcode::logging::LogSettings;
use billcode::pipeline::run_pipeline;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "billcode", about = "Encode billing exports into numeric feature tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory for the rolling log files
    #[arg(long, global = true, env = "BILLCODE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log per-column progress
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            dir: self.log_dir.clone(),
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter a billing export by category and encode every column
    Encode {
        /// Input file (CSV, Parquet or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Category value to keep, e.g. "Virtual Machines"
        #[arg(short, long, env = "BILLCODE_CATEGORY")]
        category: String,

        /// Output CSV path. Defaults to the configured output path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to a JSON encoding configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Word-vector text file for the embedding columns
        #[arg(long)]
        vectors: Option<PathBuf>,

        /// How embedded text is written: mean or vector
        #[arg(long)]
        embedding_output: Option<EmbeddingOutput>,

        /// Derive ConsumedQty and VCPUs from AdditionalInfo
        #[arg(long)]
        performance_columns: bool,
    },
    /// Print or save the default encoding configuration
    Config {
        /// Write the configuration here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Encode {
            input,
            category,
            output,
            config,
            vectors,
            embedding_output,
            performance_columns,
        } => {
            let mut config = load_config(config.as_ref())?;
            if vectors.is_some() {
                config.embedding.vectors_path = vectors;
            }
            if let Some(mode) = embedding_output {
                config.embedding.output = mode;
            }
            config.performance_columns |= performance_columns;
            handle_encode(&config, &input, &category, output)
        }
        Commands::Config { output } => handle_config(output),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EncodingConfig> {
    match path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            EncodingConfig::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(EncodingConfig::default()),
    }
}

fn handle_encode(
    config: &EncodingConfig,
    input: &Path,
    category: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("Encoding {} (category {category:?})...", input.display());

    let embedder = load_embedder(&config.embedding).context("Failed to load embedder")?;
    let report = run_pipeline(config, input, category, embedder.as_ref(), output.as_deref())
        .with_context(|| format!("Failed to encode {}", input.display()))?;

    if !report.dropped_columns.is_empty() {
        println!("Dropped columns: {}", report.dropped_columns.join(", "));
    }
    println!("{}", report.summary());
    Ok(())
}

fn handle_config(output: Option<PathBuf>) -> Result<()> {
    let config = EncodingConfig::default();
    match output {
        Some(path) => {
            config.to_file(&path)?;
            println!("Default configuration written to {}", path.display());
        }
        None => println!("{}", config.to_json()?),
    }
    Ok(())
}
