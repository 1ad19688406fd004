//! Sphynx entity store and unordered disk I/O.
//!
//! Graph entities (vertex sets, edge bundles, attributes, scalars) live in
//! an ordered index space `0..n` inside an in-memory [`EntityStore`]. The
//! unordered disk keeps them as columnar shard files keyed by sparse
//! external ids, the form exchanged with distributed batch jobs.
//! [`UnorderedDisk`] converts between the two.

pub mod config;
pub mod entity;
pub mod error;
pub mod shard;
pub mod store;
pub mod unordered;

pub use config::{CodecConfig, DuplicatePolicy, ShardOrdering, SphynxConfig};
pub use entity::{
    DoubleAttribute, DoubleTuple2Attribute, EdgeBundle, Entity, EntityField, EntityKind,
    FieldRef, Guid, Scalar, StringAttribute, VertexSet,
};
pub use error::{Result, SphynxError};
pub use store::EntityStore;
pub use unordered::{
    ReadFromUnorderedDiskReply, ReadFromUnorderedDiskRequest, ShardDirSummary, UnorderedDisk,
    WriteToUnorderedDiskReply, WriteToUnorderedDiskRequest,
};
