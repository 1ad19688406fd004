//! Columnar shard files for the unordered disk.
//!
//! Immutable Parquet files holding the rows of one entity, keyed by
//! external id. A shard directory holds one or more data shards plus a
//! completion marker.

pub mod types;
pub mod rows;
pub mod writer;
pub mod reader;
pub mod dir;

pub use types::*;
pub use rows::{
    Cell, DoubleAttributeRow, DoubleTuple2AttributeRow, EdgeRow, ShardRow, StringAttributeRow,
    VertexRow,
};
pub use writer::ShardWriter;
pub use reader::ShardFile;
pub use dir::{list_shard_dir, ShardListing};

use crate::config::CodecConfig;
use crate::error::{Result, SphynxError};

/// Thread pool bounded by `codec.workers`, for one file's encode/decode.
pub(crate) fn build_pool(codec: &CodecConfig) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(codec.workers)
        .build()
        .map_err(|e| SphynxError::Io(std::io::Error::other(format!("rayon pool: {e}"))))
}
