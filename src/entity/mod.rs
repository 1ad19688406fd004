//! Entity model: the fixed set of graph entity variants held by the store.
//!
//! Every variant lives in the ordered index space. `Entity::name()` and
//! `Entity::fields()` expose a uniform introspection view used by the
//! canonical (ordered disk) serializer, which walks the named fields in
//! declaration order.

pub mod attribute;
pub mod edge_bundle;
pub mod vertex_set;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SphynxError};

pub use attribute::{DoubleAttribute, DoubleTuple2Attribute, StringAttribute};
pub use edge_bundle::EdgeBundle;
pub use vertex_set::VertexSet;

// ── Guid ───────────────────────────────────────────────────────────

/// Opaque, caller-assigned entity identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that the guid can name a single directory entry.
    ///
    /// Shard directories are derived as `<root>/<guid>`, so separators,
    /// `.`/`..` and NUL are rejected.
    pub fn validate_path_component(&self) -> Result<()> {
        let s = self.0.as_str();
        if s.is_empty() || s == "." || s == ".." {
            return Err(SphynxError::InvalidGuid(format!("{:?}", s)));
        }
        if s.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return Err(SphynxError::InvalidGuid(format!(
                "{:?} contains a path separator",
                s
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Guid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── Entity Kind ────────────────────────────────────────────────────

/// Type tag of an entity variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Scalar,
    VertexSet,
    EdgeBundle,
    DoubleAttribute,
    StringAttribute,
    DoubleTuple2Attribute,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::EdgeBundle,
        EntityKind::VertexSet,
        EntityKind::Scalar,
        EntityKind::DoubleAttribute,
        EntityKind::StringAttribute,
        EntityKind::DoubleTuple2Attribute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Scalar => "Scalar",
            EntityKind::VertexSet => "VertexSet",
            EntityKind::EdgeBundle => "EdgeBundle",
            EntityKind::DoubleAttribute => "DoubleAttribute",
            EntityKind::StringAttribute => "StringAttribute",
            EntityKind::DoubleTuple2Attribute => "DoubleTuple2Attribute",
        }
    }

    /// One-byte type code written ahead of an entity by the ordered disk format.
    pub fn code(&self) -> u8 {
        match self {
            EntityKind::EdgeBundle => 0,
            EntityKind::VertexSet => 1,
            EntityKind::Scalar => 2,
            EntityKind::DoubleAttribute => 3,
            EntityKind::StringAttribute => 4,
            EntityKind::DoubleTuple2Attribute => 5,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = SphynxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SphynxError::UnsupportedEntityType(s.to_string()))
    }
}

// ── Field Introspection ────────────────────────────────────────────

/// Borrowed view of one entity field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldRef<'a> {
    Json(&'a serde_json::Value),
    Int64s(&'a [i64]),
    Indices(&'a [usize]),
    Doubles(&'a [f64]),
    Strings(&'a [String]),
    Bools(&'a [bool]),
}

/// A named field of an entity, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityField<'a> {
    pub name: &'static str,
    pub data: FieldRef<'a>,
}

impl<'a> EntityField<'a> {
    fn new(name: &'static str, data: FieldRef<'a>) -> Self {
        Self { name, data }
    }
}

// ── Scalar ─────────────────────────────────────────────────────────

/// A single opaque value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub value: serde_json::Value,
}

impl Scalar {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }
}

// ── Entity ─────────────────────────────────────────────────────────

/// A stored entity. Variants are shared immutable handles, so cloning an
/// `Entity` out of the store never copies its arrays.
#[derive(Debug, Clone)]
pub enum Entity {
    Scalar(Arc<Scalar>),
    VertexSet(Arc<VertexSet>),
    EdgeBundle(Arc<EdgeBundle>),
    DoubleAttribute(Arc<DoubleAttribute>),
    StringAttribute(Arc<StringAttribute>),
    DoubleTuple2Attribute(Arc<DoubleTuple2Attribute>),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Scalar(_) => EntityKind::Scalar,
            Entity::VertexSet(_) => EntityKind::VertexSet,
            Entity::EdgeBundle(_) => EntityKind::EdgeBundle,
            Entity::DoubleAttribute(_) => EntityKind::DoubleAttribute,
            Entity::StringAttribute(_) => EntityKind::StringAttribute,
            Entity::DoubleTuple2Attribute(_) => EntityKind::DoubleTuple2Attribute,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Named fields in the order the canonical serializer writes them.
    pub fn fields(&self) -> Vec<EntityField<'_>> {
        match self {
            Entity::Scalar(e) => vec![EntityField::new("Value", FieldRef::Json(&e.value))],
            Entity::VertexSet(e) => {
                vec![EntityField::new("Mapping", FieldRef::Int64s(e.mapping()))]
            }
            Entity::EdgeBundle(e) => vec![
                EntityField::new("Src", FieldRef::Indices(e.src())),
                EntityField::new("Dst", FieldRef::Indices(e.dst())),
                EntityField::new("EdgeMapping", FieldRef::Int64s(e.edge_mapping())),
            ],
            Entity::DoubleAttribute(e) => vec![
                EntityField::new("Values", FieldRef::Doubles(e.values())),
                EntityField::new("Defined", FieldRef::Bools(e.defined())),
            ],
            Entity::StringAttribute(e) => vec![
                EntityField::new("Values", FieldRef::Strings(e.values())),
                EntityField::new("Defined", FieldRef::Bools(e.defined())),
            ],
            Entity::DoubleTuple2Attribute(e) => vec![
                EntityField::new("Values1", FieldRef::Doubles(e.values1())),
                EntityField::new("Values2", FieldRef::Doubles(e.values2())),
                EntityField::new("Defined", FieldRef::Bools(e.defined())),
            ],
        }
    }
}

impl From<Scalar> for Entity {
    fn from(e: Scalar) -> Self {
        Entity::Scalar(Arc::new(e))
    }
}

impl From<VertexSet> for Entity {
    fn from(e: VertexSet) -> Self {
        Entity::VertexSet(Arc::new(e))
    }
}

impl From<EdgeBundle> for Entity {
    fn from(e: EdgeBundle) -> Self {
        Entity::EdgeBundle(Arc::new(e))
    }
}

impl From<DoubleAttribute> for Entity {
    fn from(e: DoubleAttribute) -> Self {
        Entity::DoubleAttribute(Arc::new(e))
    }
}

impl From<StringAttribute> for Entity {
    fn from(e: StringAttribute) -> Self {
        Entity::StringAttribute(Arc::new(e))
    }
}

impl From<DoubleTuple2Attribute> for Entity {
    fn from(e: DoubleTuple2Attribute) -> Self {
        Entity::DoubleTuple2Attribute(Arc::new(e))
    }
}
