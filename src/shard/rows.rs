//! Row types of the five shard schemas.
//!
//! Each row is keyed by an external id. Rows are written column by column,
//! so a row type only has to expose its cells by column position and
//! rebuild itself from a decoded Parquet record.

use parquet::record::{Row, RowAccessor};

use crate::error::{Result, SphynxError};
use crate::shard::types::ShardSchema;

/// One cell of a row, borrowed for encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Int64(i64),
    Double(f64),
    Utf8(&'a str),
}

impl<'a> Cell<'a> {
    pub fn int64(&self) -> Result<i64> {
        match *self {
            Cell::Int64(v) => Ok(v),
            other => Err(mismatch(other, "INT64")),
        }
    }

    pub fn double(&self) -> Result<f64> {
        match *self {
            Cell::Double(v) => Ok(v),
            other => Err(mismatch(other, "DOUBLE")),
        }
    }

    /// Text of a `Utf8` cell.
    pub fn text(&self) -> Result<&'a str> {
        match *self {
            Cell::Utf8(s) => Ok(s),
            other => Err(mismatch(other, "UTF8")),
        }
    }
}

fn mismatch(cell: Cell<'_>, column: &str) -> SphynxError {
    SphynxError::InvalidFormat(format!("{:?} cell in {} column", cell, column))
}

/// A row that can be stored in a shard of schema `SCHEMA`.
pub trait ShardRow: Sized + Send + Sync {
    const SCHEMA: ShardSchema;

    /// Cell at `column`, a position in `SCHEMA.columns()`.
    fn cell(&self, column: usize) -> Cell<'_>;

    /// Rebuild a row from a record. `fields[c]` is the record position of
    /// `SCHEMA.columns()[c]`.
    fn from_record(record: &Row, fields: &[usize]) -> Result<Self>;
}

// ── Record Access ──────────────────────────────────────────────────

fn long(record: &Row, field: usize) -> Result<i64> {
    Ok(record.get_long(field)?)
}

fn double(record: &Row, field: usize) -> Result<f64> {
    Ok(record.get_double(field)?)
}

/// String value; plain `BYTE_ARRAY` columns without a UTF8 annotation are
/// accepted when they hold valid UTF-8.
fn text(record: &Row, field: usize) -> Result<String> {
    match record.get_string(field) {
        Ok(s) => Ok(s.clone()),
        Err(_) => Ok(record.get_bytes(field)?.as_utf8()?.to_owned()),
    }
}

// ── Row Types ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRow {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRow {
    pub id: i64,
    pub src: i64,
    pub dst: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringAttributeRow {
    pub id: i64,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleAttributeRow {
    pub id: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleTuple2AttributeRow {
    pub id: i64,
    pub value1: f64,
    pub value2: f64,
}

impl ShardRow for VertexRow {
    const SCHEMA: ShardSchema = ShardSchema::Vertex;

    fn cell(&self, _column: usize) -> Cell<'_> {
        Cell::Int64(self.id)
    }

    fn from_record(record: &Row, fields: &[usize]) -> Result<Self> {
        Ok(Self {
            id: long(record, fields[0])?,
        })
    }
}

impl ShardRow for EdgeRow {
    const SCHEMA: ShardSchema = ShardSchema::Edge;

    fn cell(&self, column: usize) -> Cell<'_> {
        match column {
            0 => Cell::Int64(self.id),
            1 => Cell::Int64(self.src),
            _ => Cell::Int64(self.dst),
        }
    }

    fn from_record(record: &Row, fields: &[usize]) -> Result<Self> {
        Ok(Self {
            id: long(record, fields[0])?,
            src: long(record, fields[1])?,
            dst: long(record, fields[2])?,
        })
    }
}

impl ShardRow for StringAttributeRow {
    const SCHEMA: ShardSchema = ShardSchema::StringAttribute;

    fn cell(&self, column: usize) -> Cell<'_> {
        match column {
            0 => Cell::Int64(self.id),
            _ => Cell::Utf8(&self.value),
        }
    }

    fn from_record(record: &Row, fields: &[usize]) -> Result<Self> {
        Ok(Self {
            id: long(record, fields[0])?,
            value: text(record, fields[1])?,
        })
    }
}

impl ShardRow for DoubleAttributeRow {
    const SCHEMA: ShardSchema = ShardSchema::DoubleAttribute;

    fn cell(&self, column: usize) -> Cell<'_> {
        match column {
            0 => Cell::Int64(self.id),
            _ => Cell::Double(self.value),
        }
    }

    fn from_record(record: &Row, fields: &[usize]) -> Result<Self> {
        Ok(Self {
            id: long(record, fields[0])?,
            value: double(record, fields[1])?,
        })
    }
}

impl ShardRow for DoubleTuple2AttributeRow {
    const SCHEMA: ShardSchema = ShardSchema::DoubleTuple2Attribute;

    fn cell(&self, column: usize) -> Cell<'_> {
        match column {
            0 => Cell::Int64(self.id),
            1 => Cell::Double(self.value1),
            _ => Cell::Double(self.value2),
        }
    }

    fn from_record(record: &Row, fields: &[usize]) -> Result<Self> {
        Ok(Self {
            id: long(record, fields[0])?,
            value1: double(record, fields[1])?,
            value2: double(record, fields[2])?,
        })
    }
}
