//! Run settings and the shared pipeline configuration

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Sequencing platform of the input reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Pacbio,
    Nano,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Pacbio => "pacbio",
            Platform::Nano => "nano",
        }
    }
}

/// Preprocessing level of the input reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadType {
    Raw,
    Corrected,
    /// Consensus assembly of pre-assembled contig sets
    Subasm,
}

/// Operator-supplied settings for a whole run, fixed at startup
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Input read files (FASTA/FASTQ)
    pub reads: Vec<PathBuf>,

    /// Root directory for all stage outputs and the checkpoint file
    pub out_dir: PathBuf,

    /// Estimated genome size in bytes
    pub genome_size: u64,

    /// Degree of parallelism handed to the stage tools (opaque to the
    /// orchestrator)
    pub threads: usize,

    /// Number of polishing iterations (0 skips polishing)
    pub num_iters: usize,

    /// Minimum overlap between reads; derived from the genome size when
    /// not set
    pub min_overlap: Option<u32>,

    pub platform: Platform,
    pub read_type: ReadType,
}

/// A single scalar configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Str(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Str(v)
    }
}

/// Shared pipeline configuration.
///
/// Produced by the configure stage, threaded explicitly through every
/// stage's `run` call, and snapshotted into the checkpoint before each
/// stage begins. Restored wholesale from the checkpoint on resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(ConfigValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ConfigValue::Float(v)) => Some(*v),
            Some(ConfigValue::Int(v)) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ConfigValue::Str(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Parse a genome size with an optional metric suffix (e.g. "5m", "2.6g")
pub fn parse_genome_size(text: &str) -> Result<u64> {
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        bail!("genome size is empty");
    }

    let (digits, multiplier): (&str, Option<u64>) = match text.as_bytes()[text.len() - 1] {
        b'k' => (&text[..text.len() - 1], Some(1_000)),
        b'm' => (&text[..text.len() - 1], Some(1_000_000)),
        b'g' => (&text[..text.len() - 1], Some(1_000_000_000)),
        _ => (text.as_str(), None),
    };

    match multiplier {
        // fractional values only make sense together with a suffix
        None => {
            let value: u64 = digits
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid genome size: {}", text))?;
            if value == 0 {
                bail!("genome size must be positive: {}", text);
            }
            Ok(value)
        }
        Some(multiplier) => {
            let value: f64 = digits
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid genome size: {}", text))?;
            if value <= 0.0 {
                bail!("genome size must be positive: {}", text);
            }
            Ok((value * multiplier as f64).round() as u64)
        }
    }
}
