//! Unordered disk: bridge between ordered entities and externally keyed
//! shard directories.
//!
//! Every guid owns `<unordered_data_dir>/<guid>/`, holding data shards and
//! a completion marker. `externalize` writes that directory from a resident
//! entity; `internalize` rebuilds an entity from it against resident vertex
//! sets and installs the result.

mod externalize;
mod internalize;

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::SphynxConfig;
use crate::entity::{EntityKind, Guid, VertexSet};
use crate::error::Result;
use crate::store::EntityStore;

// ── Request / Reply Types ──────────────────────────────────────────

/// Externalize `guid`. Vertex set guids are needed for edge bundles
/// (both) and attributes (`vsguid1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteToUnorderedDiskRequest {
    pub guid: Guid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsguid1: Option<Guid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsguid2: Option<Guid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteToUnorderedDiskReply {}

/// Internalize the shard directory of `guid` as an entity of `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFromUnorderedDiskRequest {
    pub guid: Guid,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsguid1: Option<Guid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsguid2: Option<Guid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFromUnorderedDiskReply {}

/// Outcome of one externalize/internalize call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardDirSummary {
    pub guid: Guid,
    pub kind: EntityKind,
    /// Rows written or read.
    pub rows: usize,
    /// Data shard files written or read.
    pub shards: usize,
    pub path: PathBuf,
}

// ── UnorderedDisk ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct UnorderedDisk {
    store: Arc<EntityStore>,
    config: SphynxConfig,
}

impl UnorderedDisk {
    pub fn new(store: Arc<EntityStore>, config: SphynxConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    pub fn config(&self) -> &SphynxConfig {
        &self.config
    }

    /// Shard directory owned by `guid`.
    pub fn shard_dir(&self, guid: &Guid) -> Result<PathBuf> {
        guid.validate_path_component()?;
        Ok(self.config.unordered_data_dir.join(guid.as_str()))
    }

    pub fn write_to_unordered_disk(
        &self,
        req: &WriteToUnorderedDiskRequest,
    ) -> Result<WriteToUnorderedDiskReply> {
        self.externalize(&req.guid, non_empty(&req.vsguid1), non_empty(&req.vsguid2))?;
        Ok(WriteToUnorderedDiskReply {})
    }

    pub fn read_from_unordered_disk(
        &self,
        req: &ReadFromUnorderedDiskRequest,
    ) -> Result<ReadFromUnorderedDiskReply> {
        let kind: EntityKind = req.entity_type.parse()?;
        self.internalize(
            &req.guid,
            kind,
            non_empty(&req.vsguid1),
            non_empty(&req.vsguid2),
        )?;
        Ok(ReadFromUnorderedDiskReply {})
    }

    /// Write the resident entity `guid` to its shard directory.
    pub fn externalize(
        &self,
        guid: &Guid,
        vsguid1: Option<&Guid>,
        vsguid2: Option<&Guid>,
    ) -> Result<ShardDirSummary> {
        externalize::externalize(self, guid, vsguid1, vsguid2)
    }

    /// Build an entity of `kind` from the shard directory of `guid` and
    /// install it under `guid`.
    pub fn internalize(
        &self,
        guid: &Guid,
        kind: EntityKind,
        vsguid1: Option<&Guid>,
        vsguid2: Option<&Guid>,
    ) -> Result<ShardDirSummary> {
        internalize::internalize(self, guid, kind, vsguid1, vsguid2)
    }

    /// Resolve a vertex set dependency. An unset guid resolves like an
    /// absent one.
    fn dependency(&self, guid: Option<&Guid>) -> Result<(Guid, Arc<VertexSet>)> {
        let guid = guid.cloned().unwrap_or_else(|| Guid::new(""));
        let vs = self.store.get_vertex_set(&guid)?;
        Ok((guid, vs))
    }
}

/// Wire messages carry unset guids as empty strings.
fn non_empty(guid: &Option<Guid>) -> Option<&Guid> {
    guid.as_ref().filter(|g| !g.is_empty())
}
