//! Text embedding encoders.
//!
//! Free-text columns are reduced through a [`TextEmbedder`], which maps a text to a
//! fixed-dimension vector. The provider is built once per run by [`load_embedder`]
//! and shared read-only across every cell; nothing here reloads it.
//!
//! Two providers ship with the crate:
//!
//! - [`WordVectors`]: static word vectors read from a GloVe/word2vec text file. The
//!   text vector is the average over all tokens, with out-of-vocabulary tokens
//!   contributing zeros.
//! - [`HashedEmbedder`]: used when no vectors file is configured. Every token gets a
//!   pseudo-random vector seeded from its xxHash64 digest, so results are stable
//!   across runs without any model files.
//!
//! By default a cell is written as the mean of its vector components, which keeps one
//! output column per text column but discards almost all of the embedding.
//! [`EmbeddingOutput::Vector`] writes every component instead.

use super::cell::Cell;
use crate::config::{EmbeddingConfig, EmbeddingOutput};
use crate::error::{EncodeError, Result, ResultExt as _};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tokenizers::normalizers::Lowercase;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{
    Normalizer as _, OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer as _,
};
use xxhash_rust::xxh64::xxh64;

/// A source of fixed-dimension text vectors.
pub trait TextEmbedder: Send + Sync {
    /// Length of every vector returned by [`TextEmbedder::embed`].
    fn dimension(&self) -> usize;

    /// Embed a text. Fails if the text yields no tokens.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Split text into lower-cased word tokens and punctuation runs.
///
/// Uses the `tokenizers` lowercase normalizer followed by its whitespace
/// pre-tokenizer (`\w+|[^\w\s]+`), which matches how GloVe-style vocabularies are
/// keyed.
pub fn tokenize(text: &str) -> Result<Vec<String>> {
    let mut pretokenized = PreTokenizedString::from(text);
    pretokenized
        .normalize(|normalized| Lowercase.normalize(normalized))
        .map_err(|e| EncodeError::Embedding(format!("failed to normalize text: {e}")))?;
    Whitespace::default()
        .pre_tokenize(&mut pretokenized)
        .map_err(|e| EncodeError::Embedding(format!("failed to tokenize text: {e}")))?;

    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Char)
        .into_iter()
        .map(|(token, _, _)| token.to_owned())
        .collect())
}

fn no_tokens(text: &str) -> EncodeError {
    EncodeError::Embedding(format!("text produced no tokens: {text:?}"))
}

/// Average token vectors; tokens without a vector count as zeros.
fn average<'v>(
    dimension: usize,
    tokens: &[String],
    mut lookup: impl FnMut(&str) -> Option<&'v [f32]>,
) -> Vec<f32> {
    let mut sum = vec![0.0_f32; dimension];
    for token in tokens {
        if let Some(vector) = lookup(token) {
            for (acc, v) in sum.iter_mut().zip(vector) {
                *acc += v;
            }
        }
    }
    let count = tokens.len() as f32;
    sum.iter_mut().for_each(|v| *v /= count);
    sum
}

/// Static word vectors loaded from a text file.
#[derive(Debug, Clone)]
pub struct WordVectors {
    dimension: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl WordVectors {
    /// Load a GloVe/word2vec text file (`word v1 v2 ...` per line).
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open word vectors: {}", path.display()))?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            "Loaded {} word vectors (dim {}) from {}",
            vectors.len(),
            vectors.dimension,
            path.display()
        );
        Ok(vectors)
    }

    /// Parse vectors from any buffered reader. A leading `count dim` header line is
    /// skipped.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut dimension = 0;
        let mut vectors = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let Some(word) = fields.next() else {
                continue;
            };
            let values = fields
                .map(str::parse::<f32>)
                .collect::<std::result::Result<Vec<_>, _>>();

            let values = match values {
                Ok(values) if line_no == 0 && values.len() == 1 && word.parse::<u64>().is_ok() => {
                    continue;
                }
                Ok(values) if !values.is_empty() => values,
                _ => {
                    return Err(EncodeError::Embedding(format!(
                        "invalid vector on line {}",
                        line_no + 1
                    )));
                }
            };

            if dimension == 0 {
                dimension = values.len();
            } else if values.len() != dimension {
                return Err(EncodeError::Embedding(format!(
                    "line {} has {} components, expected {dimension}",
                    line_no + 1,
                    values.len()
                )));
            }
            vectors.insert(word.to_lowercase(), values);
        }

        if vectors.is_empty() {
            return Err(EncodeError::Embedding("word vector file is empty".to_owned()));
        }

        Ok(Self { dimension, vectors })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl TextEmbedder for WordVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(no_tokens(text));
        }
        Ok(average(self.dimension, &tokens, |token| {
            self.vectors.get(token).map(Vec::as_slice)
        }))
    }
}

/// Model-free embedder deriving token vectors from xxHash64 digests.
#[derive(Debug, Clone, Copy)]
pub struct HashedEmbedder {
    dimension: usize,
}

impl HashedEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Deterministic vector in [-1, 1] for one token (splitmix64 stream).
    fn token_vector(&self, token: &str) -> Vec<f32> {
        let mut state = xxh64(token.as_bytes(), 0);
        (0..self.dimension)
            .map(|_| {
                state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
                let mut z = state;
                z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
                z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
                z ^= z >> 31;
                ((z >> 11) as f64 / (1_u64 << 53) as f64 * 2.0 - 1.0) as f32
            })
            .collect()
    }
}

impl TextEmbedder for HashedEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = tokenize(text)?;
        if tokens.is_empty() {
            return Err(no_tokens(text));
        }
        let token_vectors: Vec<Vec<f32>> =
            tokens.iter().map(|t| self.token_vector(t)).collect();
        let mut vectors = token_vectors.iter();
        Ok(average(self.dimension, &tokens, |_| {
            vectors.next().map(Vec::as_slice)
        }))
    }
}

/// Build the embedding provider for a run.
pub fn load_embedder(config: &EmbeddingConfig) -> Result<Box<dyn TextEmbedder>> {
    match &config.vectors_path {
        Some(path) => Ok(Box::new(WordVectors::load(path)?)),
        None => {
            tracing::info!(
                "No word vectors configured, using hashed embedder (dim {})",
                config.dimension
            );
            Ok(Box::new(HashedEmbedder::new(config.dimension)))
        }
    }
}

/// Arithmetic mean of the vector components.
pub fn vector_mean(vector: &[f32]) -> f64 {
    if vector.is_empty() {
        return 0.0;
    }
    vector.iter().map(|v| f64::from(*v)).sum::<f64>() / vector.len() as f64
}

/// Embed one cell and collapse it to a scalar. Null encodes to 0.
pub fn embed_encode(embedder: &dyn TextEmbedder, cell: &Cell<'_>) -> Result<f64> {
    match cell.canonical() {
        None => Ok(0.0),
        Some(text) => Ok(vector_mean(&embedder.embed(&text)?)),
    }
}

/// Encode a text column, producing one column (mean) or `dimension` columns (vector).
pub fn encode_embed_column(
    embedder: &dyn TextEmbedder,
    series: &Series,
    output: EmbeddingOutput,
) -> Result<Vec<Series>> {
    let series = series.rechunk();
    let name = series.name().clone();

    let with_row = |row: usize, err: EncodeError| match err {
        EncodeError::Embedding(msg) => {
            EncodeError::Embedding(format!("column '{name}' row {row}: {msg}"))
        }
        other => other,
    };

    match output {
        EmbeddingOutput::Mean => {
            let mut means = Vec::with_capacity(series.len());
            for (row, value) in series.iter().enumerate() {
                let mean = embed_encode(embedder, &Cell::from(value)).map_err(|e| with_row(row, e))?;
                means.push(mean);
            }
            Ok(vec![Series::new(name.clone(), means)])
        }
        EmbeddingOutput::Vector => {
            let dimension = embedder.dimension();
            let mut components = vec![Vec::with_capacity(series.len()); dimension];
            for (row, value) in series.iter().enumerate() {
                let vector = match Cell::from(value).canonical() {
                    None => vec![0.0; dimension],
                    Some(text) => embedder.embed(&text).map_err(|e| with_row(row, e))?,
                };
                for (component, v) in components.iter_mut().zip(vector) {
                    component.push(f64::from(v));
                }
            }
            Ok(components
                .into_iter()
                .enumerate()
                .map(|(i, values)| Series::new(format!("{name}_{i}").into(), values))
                .collect())
        }
    }
}
