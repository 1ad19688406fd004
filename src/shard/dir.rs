//! Shard directory listing.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ShardOrdering;
use crate::error::Result;

/// Data shards of one directory, in read order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardListing {
    pub dir: PathBuf,
    pub data_files: Vec<PathBuf>,
    /// Whether the completion marker is present.
    pub has_marker: bool,
}

/// List the regular files of `dir` except `marker`. Sub-directories are
/// ignored.
pub fn list_shard_dir(dir: &Path, marker: &str, ordering: ShardOrdering) -> Result<ShardListing> {
    let mut data_files = Vec::new();
    let mut has_marker = false;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name() == marker {
            has_marker = true;
            continue;
        }
        data_files.push(entry.path());
    }

    if ordering == ShardOrdering::Lexicographic {
        data_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    }

    Ok(ShardListing {
        dir: dir.to_path_buf(),
        data_files,
        has_marker,
    })
}
