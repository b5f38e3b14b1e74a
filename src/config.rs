//! Encoding configuration.
//!
//! The column-to-encoder mapping is supplied as data rather than compiled in, so the
//! same binary can encode exports with different schemas. [`EncodingConfig::default`]
//! reproduces the layout of the Azure billing export.

use crate::error::{EncodeError, Result, ResultExt as _};
use crate::pipeline::performance::{ADDITIONAL_INFO, CONSUMED_QTY, VCPUS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Default location of the encoded output file.
pub const DEFAULT_OUTPUT_PATH: &str = "./data/Azure_data_processed.csv";

/// Default dimension of the hashed fallback embedder.
pub const DEFAULT_EMBEDDING_DIM: usize = 96;

/// Prefix given to the column derived from the date column.
pub const TIMESTAMP_PREFIX: &str = "timestamp_";

/// The four disjoint column groups, each sharing one encoding strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnGroups {
    /// Dash-delimited hex identifiers, decoded to integers
    pub hex: Vec<String>,

    /// Categorical columns, digested with xxHash64
    pub hash: Vec<String>,

    /// Free-text columns, reduced through the embedding provider
    pub embed: Vec<String>,

    /// Numeric columns copied through as Float64
    pub numeric: Vec<String>,
}

impl ColumnGroups {
    /// Iterate every `(group name, column)` pair in output order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.hex
            .iter()
            .map(|c| ("hex", c.as_str()))
            .chain(self.hash.iter().map(|c| ("hash", c.as_str())))
            .chain(self.embed.iter().map(|c| ("embed", c.as_str())))
            .chain(self.numeric.iter().map(|c| ("numeric", c.as_str())))
    }

    /// Total number of columns across all groups.
    pub fn len(&self) -> usize {
        self.hex.len() + self.hash.len() + self.embed.len() + self.numeric.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `column` belongs to any group.
    pub fn contains(&self, column: &str) -> bool {
        self.iter().any(|(_, c)| c == column)
    }
}

impl Default for ColumnGroups {
    fn default() -> Self {
        fn owned(cols: &[&str]) -> Vec<String> {
            cols.iter().map(|c| (*c).to_owned()).collect()
        }
        Self {
            hex: owned(&["SubscriptionId", "ProductOrderId", "timestamp__Date"]),
            hash: owned(&[
                "MeterRegion",
                "BillingCurrency",
                "ResourceLocation",
                "ConsumedService",
                "ServiceInfo2",
                "UnitOfMeasure",
                "ProductOrderName",
                "OfferId",
                "IsAzureCreditEligible",
                "PublisherName",
                "ChargeType",
                "Frequency",
                "PublisherType",
                "PricingModel",
                "SubscriptionEnv",
                "ResourceGroupEnv",
            ]),
            embed: owned(&[
                "Product",
                "PartNumber",
                "MeterCategory",
                "MeterSubCategory",
                "MeterName",
                "ResourceId",
                "ResourceName",
                "AdditionalInfo",
                "PlanName",
                "benefitId",
                "benefitName",
            ]),
            numeric: owned(&["Quantity", "Cost"]),
        }
    }
}

/// How an embedded text cell is written to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingOutput {
    /// One Float64 column per text column holding the mean of the vector components
    #[default]
    Mean,

    /// One Float64 column per vector component, named `<column>_<i>`
    Vector,
}

impl std::str::FromStr for EmbeddingOutput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Self::Mean),
            "vector" => Ok(Self::Vector),
            other => Err(format!("unknown embedding output '{other}' (use mean or vector)")),
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Word-vector text file. When absent the hashed embedder is used.
    pub vectors_path: Option<PathBuf>,

    /// Vector dimension of the hashed embedder (ignored for word-vector files)
    pub dimension: usize,

    pub output: EmbeddingOutput,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            vectors_path: None,
            dimension: DEFAULT_EMBEDDING_DIM,
            output: EmbeddingOutput::Mean,
        }
    }
}

/// Complete configuration for one encoding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Column compared against the category filter value
    pub category_column: String,

    /// `MM/DD/YYYY` column replaced by `timestamp_<name>`
    pub date_column: String,

    pub groups: ColumnGroups,

    pub embedding: EmbeddingConfig,

    /// Derive `ConsumedQty` and `VCPUs` from the `AdditionalInfo` JSON
    pub performance_columns: bool,

    pub output_path: PathBuf,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            category_column: "MeterCategory".to_owned(),
            date_column: "_Date".to_owned(),
            groups: ColumnGroups::default(),
            embedding: EmbeddingConfig::default(),
            performance_columns: false,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl EncodingConfig {
    /// Load a configuration from a JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Name of the column the date normalizer produces.
    pub fn timestamp_column(&self) -> String {
        format!("{TIMESTAMP_PREFIX}{}", self.date_column)
    }

    /// The groups a run actually encodes.
    ///
    /// With `performance_columns` set, `ConsumedQty` and `VCPUs` join the numeric
    /// group unless some group already lists them.
    pub fn resolved_groups(&self) -> ColumnGroups {
        let mut groups = self.groups.clone();
        if self.performance_columns {
            for derived in [CONSUMED_QTY, VCPUS] {
                if !groups.contains(derived) {
                    groups.numeric.push(derived.to_owned());
                }
            }
        }
        groups
    }

    /// Columns that must reach the pipeline as raw text rather than inferred types.
    pub fn text_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.category_column.as_str(), self.date_column.as_str()];
        columns.extend(self.groups.hex.iter().map(String::as_str));
        columns.extend(self.groups.hash.iter().map(String::as_str));
        columns.extend(self.groups.embed.iter().map(String::as_str));
        if self.performance_columns {
            columns.push(ADDITIONAL_INFO);
        }
        let mut seen = HashSet::new();
        columns.retain(|c| seen.insert(*c));
        columns
    }

    /// Check that every column appears in exactly one group.
    pub fn validate(&self) -> Result<()> {
        if self.category_column.is_empty() {
            return Err(EncodeError::Config("category_column is empty".to_owned()));
        }
        if self.date_column.is_empty() {
            return Err(EncodeError::Config("date_column is empty".to_owned()));
        }
        if self.embedding.vectors_path.is_none() && self.embedding.dimension == 0 {
            return Err(EncodeError::Config(
                "embedding.dimension must be greater than zero".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for (group, column) in self.groups.iter() {
            if !seen.insert(column) {
                return Err(EncodeError::Config(format!(
                    "column '{column}' is assigned more than once (last seen in group '{group}')"
                )));
            }
        }
        Ok(())
    }
}
