//! Shard reader.
//!
//! `ShardFile` reads the Parquet footer up front and works out which shard
//! schema the file holds. `read_rows` decodes every row, spreading row
//! groups across the codec pool for large shards while keeping file order.

use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use rayon::prelude::*;

use crate::config::CodecConfig;
use crate::error::{Result, SphynxError};
use crate::shard::build_pool;
use crate::shard::rows::ShardRow;
use crate::shard::types::*;

/// An opened shard file whose columns match a known schema.
pub struct ShardFile {
    reader: SerializedFileReader<File>,
    schema: ShardSchema,
    fields: Vec<usize>,
    byte_size: u64,
}

impl std::fmt::Debug for ShardFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardFile")
            .field("schema", &self.schema)
            .field("row_count", &self.row_count())
            .field("row_groups", &self.row_groups())
            .field("byte_size", &self.byte_size)
            .finish()
    }
}

impl ShardFile {
    /// Open a shard. Format errors carry the path.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let byte_size = file.metadata()?.len();
        Self::from_file(file, byte_size).map_err(|e| match e {
            SphynxError::InvalidFormat(msg) => {
                SphynxError::InvalidFormat(format!("{}: {}", path.display(), msg))
            }
            SphynxError::Parquet(e) => {
                SphynxError::InvalidFormat(format!("{}: {}", path.display(), e))
            }
            other => other,
        })
    }

    fn from_file(file: File, byte_size: u64) -> Result<Self> {
        let reader = SerializedFileReader::new(file)?;
        let descr = reader.metadata().file_metadata().schema_descr();
        let schema = ShardSchema::detect(descr)?;
        let fields = schema.resolve(descr)?;
        Ok(Self {
            reader,
            schema,
            fields,
            byte_size,
        })
    }

    pub fn schema(&self) -> ShardSchema {
        self.schema
    }

    pub fn row_count(&self) -> usize {
        self.reader.metadata().file_metadata().num_rows().max(0) as usize
    }

    pub fn row_groups(&self) -> usize {
        self.reader.metadata().num_row_groups()
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Writer recorded in the file footer, if any.
    pub fn created_by(&self) -> Option<&str> {
        self.reader.metadata().file_metadata().created_by()
    }

    /// Up to `limit` rows rendered column by column in schema order, for
    /// tooling.
    pub fn format_rows(&self, limit: usize) -> Result<Vec<Vec<String>>> {
        let mut out = Vec::new();
        for group in 0..self.row_groups() {
            let row_group = self.reader.get_row_group(group)?;
            for record in row_group.get_row_iter(None)? {
                if out.len() >= limit {
                    return Ok(out);
                }
                let record = record?;
                let cells: Vec<_> = record.get_column_iter().map(|(_, f)| f).collect();
                out.push(self.fields.iter().map(|&f| cells[f].to_string()).collect());
            }
        }
        Ok(out)
    }

    // ── Row Decoding ───────────────────────────────────────────────

    /// Decode all rows, in file order.
    ///
    /// Fails with `InvalidFormat` if the file holds a different schema
    /// than `R`.
    pub fn read_rows<R: ShardRow>(&self, codec: &CodecConfig) -> Result<Vec<R>> {
        if self.schema != R::SCHEMA {
            return Err(SphynxError::InvalidFormat(format!(
                "expected {} shard, got {}",
                R::SCHEMA.name(),
                self.schema.name()
            )));
        }
        let groups = self.row_groups();
        let decoded: Vec<Vec<R>> = if groups > 1 && codec.use_parallel(self.row_count()) {
            let pool = build_pool(codec)?;
            pool.install(|| {
                (0..groups)
                    .into_par_iter()
                    .map(|g| self.read_row_group(g))
                    .collect::<Result<_>>()
            })?
        } else {
            (0..groups)
                .map(|g| self.read_row_group(g))
                .collect::<Result<_>>()?
        };

        let mut rows = Vec::with_capacity(self.row_count());
        for group in decoded {
            rows.extend(group);
        }
        Ok(rows)
    }

    fn read_row_group<R: ShardRow>(&self, group: usize) -> Result<Vec<R>> {
        let row_group = self.reader.get_row_group(group)?;
        let expected = row_group.metadata().num_rows().max(0) as usize;
        let mut rows = Vec::with_capacity(expected);
        for record in row_group.get_row_iter(None)? {
            rows.push(R::from_record(&record?, &self.fields)?);
        }
        if rows.len() != expected {
            return Err(SphynxError::InvalidFormat(format!(
                "row group {} holds {} rows, footer says {}",
                group,
                rows.len(),
                expected
            )));
        }
        Ok(rows)
    }
}
