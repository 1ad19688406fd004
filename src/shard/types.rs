//! Shard schemas and file naming.
//!
//! A shard is a Parquet file holding the rows of one entity kind keyed by
//! external id. Every schema is flat: `REQUIRED INT64` id columns,
//! `REQUIRED DOUBLE` values and a UTF8 `BYTE_ARRAY` for string values.
//! Files from other writers are accepted as long as their leaf columns
//! match one of the schemas by name and physical type, in any order.

use std::sync::Arc;

use parquet::basic::Type as PhysicalType;
use parquet::schema::parser::parse_message_type;
use parquet::schema::types::{SchemaDescriptor, TypePtr};

use crate::entity::EntityKind;
use crate::error::{Result, SphynxError};

// ── Constants ──────────────────────────────────────────────────────

/// File extension of data shards written by this crate.
pub const SHARD_EXTENSION: &str = "parquet";

/// Name of the `index`-th data shard in a shard directory.
pub fn part_file_name(index: usize) -> String {
    format!("part-{:05}.{}", index, SHARD_EXTENSION)
}

// ── Columns ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int64,
    Double,
    Utf8,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "INT64",
            ColumnType::Double => "DOUBLE",
            ColumnType::Utf8 => "UTF8",
        }
    }

    /// Parquet physical type backing the column.
    pub fn physical(&self) -> PhysicalType {
        match self {
            ColumnType::Int64 => PhysicalType::INT64,
            ColumnType::Double => PhysicalType::DOUBLE,
            ColumnType::Utf8 => PhysicalType::BYTE_ARRAY,
        }
    }

    fn declaration(&self, name: &str) -> String {
        match self {
            ColumnType::Utf8 => format!("REQUIRED BYTE_ARRAY {} (UTF8);", name),
            other => format!("REQUIRED {:?} {};", other.physical(), name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

const fn col(name: &'static str, ty: ColumnType) -> Column {
    Column { name, ty }
}

const VERTEX_COLUMNS: &[Column] = &[col("id", ColumnType::Int64)];
const EDGE_COLUMNS: &[Column] = &[
    col("id", ColumnType::Int64),
    col("src", ColumnType::Int64),
    col("dst", ColumnType::Int64),
];
const STRING_ATTRIBUTE_COLUMNS: &[Column] = &[
    col("id", ColumnType::Int64),
    col("value", ColumnType::Utf8),
];
const DOUBLE_ATTRIBUTE_COLUMNS: &[Column] = &[
    col("id", ColumnType::Int64),
    col("value", ColumnType::Double),
];
const DOUBLE_TUPLE2_ATTRIBUTE_COLUMNS: &[Column] = &[
    col("id", ColumnType::Int64),
    col("value1", ColumnType::Double),
    col("value2", ColumnType::Double),
];

// ── Shard Schema ───────────────────────────────────────────────────

/// Row schema of a shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShardSchema {
    Vertex,
    Edge,
    StringAttribute,
    DoubleAttribute,
    DoubleTuple2Attribute,
}

impl ShardSchema {
    pub const ALL: [ShardSchema; 5] = [
        Self::Vertex,
        Self::Edge,
        Self::StringAttribute,
        Self::DoubleAttribute,
        Self::DoubleTuple2Attribute,
    ];

    /// Schema used for an entity kind. Scalars have none.
    pub fn for_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::VertexSet => Some(Self::Vertex),
            EntityKind::EdgeBundle => Some(Self::Edge),
            EntityKind::StringAttribute => Some(Self::StringAttribute),
            EntityKind::DoubleAttribute => Some(Self::DoubleAttribute),
            EntityKind::DoubleTuple2Attribute => Some(Self::DoubleTuple2Attribute),
            EntityKind::Scalar => None,
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            Self::Vertex => EntityKind::VertexSet,
            Self::Edge => EntityKind::EdgeBundle,
            Self::StringAttribute => EntityKind::StringAttribute,
            Self::DoubleAttribute => EntityKind::DoubleAttribute,
            Self::DoubleTuple2Attribute => EntityKind::DoubleTuple2Attribute,
        }
    }

    /// Message name in the Parquet schema.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
            Self::StringAttribute => "string_attribute",
            Self::DoubleAttribute => "double_attribute",
            Self::DoubleTuple2Attribute => "double_tuple2_attribute",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::Vertex => VERTEX_COLUMNS,
            Self::Edge => EDGE_COLUMNS,
            Self::StringAttribute => STRING_ATTRIBUTE_COLUMNS,
            Self::DoubleAttribute => DOUBLE_ATTRIBUTE_COLUMNS,
            Self::DoubleTuple2Attribute => DOUBLE_TUPLE2_ATTRIBUTE_COLUMNS,
        }
    }

    /// Schema in Parquet message syntax, e.g.
    /// `message vertex { REQUIRED INT64 id; }`.
    pub fn message_type(&self) -> String {
        let fields: Vec<String> = self
            .columns()
            .iter()
            .map(|c| c.ty.declaration(c.name))
            .collect();
        format!("message {} {{ {} }}", self.name(), fields.join(" "))
    }

    pub fn parquet_schema(&self) -> Result<TypePtr> {
        Ok(Arc::new(parse_message_type(&self.message_type())?))
    }

    /// Position in the file of each of `columns()`.
    ///
    /// The file must be flat and hold exactly these columns; optional
    /// columns are accepted and fail on the first null when read.
    pub fn resolve(&self, file: &SchemaDescriptor) -> Result<Vec<usize>> {
        let columns = self.columns();
        let flat = file.root_schema().get_fields().len() == file.num_columns();
        if !flat || file.num_columns() != columns.len() {
            return Err(SphynxError::InvalidFormat(format!(
                "expected {} columns of a {} shard, file has {}",
                columns.len(),
                self.name(),
                file.num_columns()
            )));
        }
        columns
            .iter()
            .map(|column| {
                (0..file.num_columns())
                    .find(|&i| {
                        let leaf = file.column(i);
                        leaf.name() == column.name
                            && leaf.physical_type() == column.ty.physical()
                            && leaf.max_rep_level() == 0
                    })
                    .ok_or_else(|| {
                        SphynxError::InvalidFormat(format!(
                            "{} shard needs {} column {:?}",
                            self.name(),
                            column.ty.as_str(),
                            column.name
                        ))
                    })
            })
            .collect()
    }

    /// The schema whose columns a file holds.
    pub fn detect(file: &SchemaDescriptor) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|schema| schema.resolve(file).is_ok())
            .ok_or_else(|| {
                let found: Vec<String> = (0..file.num_columns())
                    .map(|i| {
                        let leaf = file.column(i);
                        format!("{} {}", leaf.physical_type(), leaf.name())
                    })
                    .collect();
                SphynxError::InvalidFormat(format!(
                    "columns [{}] match no shard schema",
                    found.join(", ")
                ))
            })
    }
}

/// Result of writing one shard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardMeta {
    pub schema: ShardSchema,
    pub row_count: u64,
    pub byte_size: u64,
}
