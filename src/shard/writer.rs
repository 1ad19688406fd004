//! Shard writer.
//!
//! `ShardWriter` accumulates rows in memory, then writes them as a single
//! Parquet row group on `finish()`. For large shards the column vectors
//! are gathered in parallel on the codec pool, one task per column; each
//! column keeps row order, so the output is identical to a sequential
//! encode.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use parquet::basic::Compression;
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::{WriterProperties, WriterPropertiesPtr};
use parquet::file::writer::SerializedFileWriter;
use rayon::prelude::*;

use crate::config::CodecConfig;
use crate::error::{Result, SphynxError};
use crate::shard::build_pool;
use crate::shard::rows::ShardRow;
use crate::shard::types::*;

/// Values of one column, ready for a typed column writer.
enum ColumnValues {
    Int64(Vec<i64>),
    Double(Vec<f64>),
    Utf8(Vec<ByteArray>),
}

pub struct ShardWriter<R: ShardRow> {
    rows: Vec<R>,
}

impl<R: ShardRow> Default for ShardWriter<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ShardRow> ShardWriter<R> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, row: R) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the shard to `writer` and return the row count. Consumes self.
    pub fn finish<W: Write + Send>(self, writer: W, codec: &CodecConfig) -> Result<u64> {
        let schema = R::SCHEMA;
        let columns = schema.columns();

        // Step 1: gather column vectors.
        let values: Vec<ColumnValues> = if codec.use_parallel(self.rows.len()) {
            let pool = build_pool(codec)?;
            pool.install(|| {
                (0..columns.len())
                    .into_par_iter()
                    .map(|c| gather(&self.rows, c, columns[c].ty))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            (0..columns.len())
                .map(|c| gather(&self.rows, c, columns[c].ty))
                .collect::<Result<Vec<_>>>()?
        };

        // Step 2: one row group, columns in schema order.
        let mut file_writer =
            SerializedFileWriter::new(writer, schema.parquet_schema()?, writer_properties())?;
        let mut row_group = file_writer.next_row_group()?;
        for (column, values) in columns.iter().zip(&values) {
            let mut column_writer = row_group.next_column()?.ok_or_else(|| {
                SphynxError::InvalidFormat(format!("no writer for column {:?}", column.name))
            })?;
            match values {
                ColumnValues::Int64(v) => {
                    column_writer.typed::<Int64Type>().write_batch(v, None, None)?;
                }
                ColumnValues::Double(v) => {
                    column_writer.typed::<DoubleType>().write_batch(v, None, None)?;
                }
                ColumnValues::Utf8(v) => {
                    column_writer.typed::<ByteArrayType>().write_batch(v, None, None)?;
                }
            }
            column_writer.close()?;
        }
        row_group.close()?;
        file_writer.close()?;

        Ok(self.rows.len() as u64)
    }

    /// Write the shard to a new file at `path` and sync it to disk.
    pub fn write_file(self, path: &Path, codec: &CodecConfig) -> Result<ShardMeta> {
        let file = File::create(path)?;
        let row_count = self.finish(&file, codec)?;
        file.sync_all()?;
        Ok(ShardMeta {
            schema: R::SCHEMA,
            row_count,
            byte_size: file.metadata()?.len(),
        })
    }
}

impl<R: ShardRow> Extend<R> for ShardWriter<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

fn writer_properties() -> WriterPropertiesPtr {
    Arc::new(
        WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .set_created_by(concat!("sphynx ", env!("CARGO_PKG_VERSION")).to_string())
            .build(),
    )
}

fn gather<R: ShardRow>(rows: &[R], column: usize, ty: ColumnType) -> Result<ColumnValues> {
    Ok(match ty {
        ColumnType::Int64 => ColumnValues::Int64(
            rows.iter()
                .map(|r| r.cell(column).int64())
                .collect::<Result<_>>()?,
        ),
        ColumnType::Double => ColumnValues::Double(
            rows.iter()
                .map(|r| r.cell(column).double())
                .collect::<Result<_>>()?,
        ),
        ColumnType::Utf8 => ColumnValues::Utf8(
            rows.iter()
                .map(|r| r.cell(column).text().map(ByteArray::from))
                .collect::<Result<_>>()?,
        ),
    })
}
