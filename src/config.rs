use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::oracle::RetryPolicy;

/// Shortest hidden word the scanner will consider
pub const DEFAULT_MIN_LENGTH: usize = 2;

/// Default per-call timeout for the completion command
pub const DEFAULT_VISUAL_TIMEOUT_MS: u64 = 30_000;

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmenterConfig {
    min_length: usize,
}

impl SegmenterConfig {
    /// A minimum length of zero is treated as one
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH)
    }
}

/// Retry settings as written in the config file, in milliseconds
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub multiplier_ms: u64,
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            multiplier_ms: policy.multiplier.as_millis() as u64,
            min_wait_ms: policy.min_wait.as_millis() as u64,
            max_wait_ms: policy.max_wait.as_millis() as u64,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: config.max_attempts,
            multiplier: Duration::from_millis(config.multiplier_ms),
            min_wait: Duration::from_millis(config.min_wait_ms),
            max_wait: Duration::from_millis(config.max_wait_ms),
        }
    }
}

/// JSON configuration file; every field is optional
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub min_length: Option<usize>,
    pub retry: RetryConfig,
    /// Lexicon JSON for word validity and relatedness
    pub lexicon: Option<PathBuf>,
    /// Newline-delimited list of drawable words
    pub visual_words: Option<PathBuf>,
    /// Program and arguments that answer the visual prompt on stdout
    pub visual_command: Option<Vec<String>>,
    pub visual_timeout_ms: Option<u64>,
}

impl Config {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config JSON")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json_str(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn segmenter(&self) -> SegmenterConfig {
        SegmenterConfig::new(self.min_length.unwrap_or(DEFAULT_MIN_LENGTH))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    pub fn visual_timeout(&self) -> Duration {
        Duration::from_millis(self.visual_timeout_ms.unwrap_or(DEFAULT_VISUAL_TIMEOUT_MS))
    }
}
