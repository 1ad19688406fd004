//! Error types for the entity store and unordered disk I/O

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{EntityKind, Guid};

pub type Result<T> = std::result::Result<T, SphynxError>;

#[derive(Error, Debug)]
pub enum SphynxError {
    #[error("guid {0} not found")]
    EntityNotFound(Guid),

    #[error("dependency guid {0} not found")]
    DependencyNotFound(Guid),

    #[error("dependency guid {guid} is a {found}, expected {expected}")]
    DependencyTypeMismatch {
        guid: Guid,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("unsupported entity type for unordered disk: {0}")]
    UnsupportedEntityType(String),

    #[error("external id {external_id} has no ordered counterpart in vertex set {guid}")]
    InvalidReference { guid: Guid, external_id: i64 },

    #[error("ordered index {index} has no external id in vertex set {guid}")]
    OrderedIndexOutOfRange { guid: Guid, index: usize },

    #[error("external id {external_id} appears more than once in vertex set {guid}")]
    DuplicateExternalId { guid: Guid, external_id: i64 },

    #[error("Invalid entity: {0}")]
    InvalidEntity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid shard format: {0}")]
    InvalidFormat(String),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("shard directory {0:?} has no completion marker")]
    IncompleteShardDirectory(PathBuf),

    #[error("Invalid guid: {0}")]
    InvalidGuid(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SphynxError {
    /// Get error code for wire protocol
    pub fn code(&self) -> &'static str {
        match self {
            SphynxError::EntityNotFound(_) => "ENTITY_NOT_FOUND",
            SphynxError::DependencyNotFound(_) => "DEPENDENCY_NOT_FOUND",
            SphynxError::DependencyTypeMismatch { .. } => "DEPENDENCY_TYPE_MISMATCH",
            SphynxError::UnsupportedEntityType(_) => "UNSUPPORTED_ENTITY_TYPE",
            SphynxError::InvalidReference { .. }
            | SphynxError::OrderedIndexOutOfRange { .. } => "INVALID_REFERENCE",
            SphynxError::DuplicateExternalId { .. } | SphynxError::InvalidEntity(_) => {
                "INVALID_DATA"
            }
            SphynxError::Io(_)
            | SphynxError::InvalidFormat(_)
            | SphynxError::Parquet(_)
            | SphynxError::IncompleteShardDirectory(_) => "IO_ERROR",
            SphynxError::InvalidGuid(_) => "INVALID_GUID",
            SphynxError::Config(_) | SphynxError::Json(_) => "INVALID_CONFIG",
        }
    }
}
