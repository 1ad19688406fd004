//! Server configuration for the entity store and unordered disk I/O.
//!
//! Loaded from a JSON file (`SphynxConfig::from_json_file`); every field
//! has a default so partial files are accepted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SphynxError};

/// Default completion marker written by the upstream distributed writer.
pub const DEFAULT_COMPLETION_MARKER: &str = "_SUCCESS";

/// Default bound on per-file encode/decode workers.
pub const DEFAULT_CODEC_WORKERS: usize = 4;

/// Row count below which a shard is encoded/decoded on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64 * 1024;

// ── Policies ───────────────────────────────────────────────────────

/// Order in which the data shards of a directory are concatenated.
///
/// Vertex set ordered indices are assigned by position in the concatenated
/// row sequence, so this choice is observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardOrdering {
    /// Sort data shards by file name (deterministic).
    #[default]
    Lexicographic,
    /// Keep whatever order the directory listing yields.
    Listing,
}

/// What to do when a vertex set shard repeats an external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later rows overwrite earlier ones in the inverse mapping (logged).
    #[default]
    LastWriteWins,
    /// Fail with `DuplicateExternalId`.
    Reject,
}

// ── Codec ──────────────────────────────────────────────────────────

/// Per-file fan-out for row encode/decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Maximum worker threads used for one shard file.
    pub workers: usize,
    /// Shards with fewer rows are processed on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_CODEC_WORKERS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl CodecConfig {
    /// Single-threaded codec (useful in tests and tools).
    pub fn sequential() -> Self {
        Self {
            workers: 1,
            parallel_threshold: usize::MAX,
        }
    }

    pub(crate) fn use_parallel(&self, rows: usize) -> bool {
        self.workers > 1 && rows >= self.parallel_threshold
    }
}

// ── SphynxConfig ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphynxConfig {
    /// Root of the unordered disk; each guid owns `<unordered_data_dir>/<guid>/`.
    pub unordered_data_dir: PathBuf,
    /// Reserved marker file name, skipped when reading shards.
    pub completion_marker: String,
    /// Refuse to read a shard directory that lacks the marker.
    pub require_completion_marker: bool,
    pub shard_ordering: ShardOrdering,
    pub duplicate_ids: DuplicatePolicy,
    pub codec: CodecConfig,
}

impl Default for SphynxConfig {
    fn default() -> Self {
        Self {
            unordered_data_dir: PathBuf::from("data/unordered"),
            completion_marker: DEFAULT_COMPLETION_MARKER.to_string(),
            require_completion_marker: false,
            shard_ordering: ShardOrdering::default(),
            duplicate_ids: DuplicatePolicy::default(),
            codec: CodecConfig::default(),
        }
    }
}

impl SphynxConfig {
    /// Config whose unordered disk lives at `<dir>/unordered`.
    pub fn with_root(dir: &Path) -> Self {
        Self {
            unordered_data_dir: dir.join("unordered"),
            ..Self::default()
        }
    }

    /// Read and validate config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.codec.workers == 0 {
            return Err(SphynxError::Config("codec.workers must be at least 1".into()));
        }
        let marker = self.completion_marker.as_str();
        let has_separator = marker.contains(|c: char| c == '/' || c == '\\');
        if marker.is_empty() || marker == "." || marker == ".." || has_separator {
            return Err(SphynxError::Config(format!(
                "completion_marker must be a plain file name, got {:?}",
                marker
            )));
        }
        Ok(())
    }
}
