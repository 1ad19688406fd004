//! Ordered entity → external-id shard directory.

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::entity::{Entity, EntityKind, Guid, VertexSet};
use crate::error::{Result, SphynxError};
use crate::shard::{
    part_file_name, DoubleAttributeRow, DoubleTuple2AttributeRow, EdgeRow, ShardRow, ShardWriter,
    StringAttributeRow, VertexRow,
};
use crate::unordered::{ShardDirSummary, UnorderedDisk};

pub(super) fn externalize(
    disk: &UnorderedDisk,
    guid: &Guid,
    vsguid1: Option<&Guid>,
    vsguid2: Option<&Guid>,
) -> Result<ShardDirSummary> {
    let dir = disk.shard_dir(guid)?;
    let entity = disk
        .store()
        .get(guid)
        .ok_or_else(|| SphynxError::EntityNotFound(guid.clone()))?;

    // Rows are translated, and every dependency checked, before the
    // filesystem is touched.
    match &entity {
        Entity::Scalar(_) => Err(SphynxError::UnsupportedEntityType(
            EntityKind::Scalar.as_str().to_string(),
        )),
        Entity::VertexSet(vs) => {
            let rows = vs.mapping_to_unordered().iter().map(|&id| VertexRow { id });
            write_shard_dir(disk, guid, &dir, rows.collect())
        }
        Entity::EdgeBundle(eb) => {
            let (g1, vs1) = disk.dependency(vsguid1)?;
            let (g2, vs2) = disk.dependency(vsguid2)?;
            let rows = eb
                .iter()
                .map(|(id, src, dst)| {
                    Ok(EdgeRow {
                        id,
                        src: external_id(&g1, &vs1, src)?,
                        dst: external_id(&g2, &vs2, dst)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            write_shard_dir(disk, guid, &dir, rows)
        }
        Entity::DoubleAttribute(attr) => {
            let (g1, vs1) = disk.dependency(vsguid1)?;
            let rows = defined_rows(attr.defined(), |i| {
                Ok(DoubleAttributeRow {
                    id: external_id(&g1, &vs1, i)?,
                    value: attr.values()[i],
                })
            })?;
            write_shard_dir(disk, guid, &dir, rows)
        }
        Entity::StringAttribute(attr) => {
            let (g1, vs1) = disk.dependency(vsguid1)?;
            let rows = defined_rows(attr.defined(), |i| {
                Ok(StringAttributeRow {
                    id: external_id(&g1, &vs1, i)?,
                    value: attr.values()[i].clone(),
                })
            })?;
            write_shard_dir(disk, guid, &dir, rows)
        }
        Entity::DoubleTuple2Attribute(attr) => {
            let (g1, vs1) = disk.dependency(vsguid1)?;
            let rows = defined_rows(attr.defined(), |i| {
                Ok(DoubleTuple2AttributeRow {
                    id: external_id(&g1, &vs1, i)?,
                    value1: attr.values1()[i],
                    value2: attr.values2()[i],
                })
            })?;
            write_shard_dir(disk, guid, &dir, rows)
        }
    }
}

fn external_id(vs_guid: &Guid, vs: &VertexSet, index: usize) -> Result<i64> {
    vs.external_id(index)
        .ok_or_else(|| SphynxError::OrderedIndexOutOfRange {
            guid: vs_guid.clone(),
            index,
        })
}

/// One row per defined index, in ordered-index order. Undefined slots are
/// not written.
fn defined_rows<R>(defined: &[bool], row: impl Fn(usize) -> Result<R>) -> Result<Vec<R>> {
    defined
        .iter()
        .enumerate()
        .filter(|(_, d)| **d)
        .map(|(i, _)| row(i))
        .collect()
}

/// Write `rows` as `<dir>/part-00000.parquet` plus the completion marker.
///
/// The directory is assembled under a staging name next to `dir` and only
/// renamed into place once every file is synced; an error drops the
/// staging directory. An existing `dir` is replaced.
fn write_shard_dir<R: ShardRow>(
    disk: &UnorderedDisk,
    guid: &Guid,
    dir: &Path,
    rows: Vec<R>,
) -> Result<ShardDirSummary> {
    let config = disk.config();
    let root = &config.unordered_data_dir;
    fs::create_dir_all(root)?;

    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(root)?;

    let row_count = rows.len();
    let mut writer = ShardWriter::with_capacity(row_count);
    writer.extend(rows);
    let shard_path = staging.path().join(part_file_name(0));
    let meta = writer.write_file(&shard_path, &config.codec)?;
    debug!(
        guid = guid.as_str(),
        file = %shard_path.display(),
        rows = meta.row_count,
        bytes = meta.byte_size,
        "shard written"
    );

    File::create(staging.path().join(&config.completion_marker))?.sync_all()?;

    if dir.exists() {
        warn!(
            guid = guid.as_str(),
            path = %dir.display(),
            "replacing existing shard directory"
        );
    }
    swap_into_place(staging.path(), dir)?;
    sync_dir(root);

    let kind = R::SCHEMA.entity_kind();
    info!(
        guid = guid.as_str(),
        kind = kind.as_str(),
        rows = row_count,
        shards = 1,
        "externalized"
    );

    Ok(ShardDirSummary {
        guid: guid.clone(),
        kind,
        rows: row_count,
        shards: 1,
        path: dir.to_path_buf(),
    })
}

/// Rename `staging` to `dir`. A previous `dir` is moved aside first and
/// only deleted once the new one is in place; if that rename fails it is
/// moved back, so `dir` is never left missing.
fn swap_into_place(staging: &Path, dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::rename(staging, dir)?;
        return Ok(());
    }

    let aside = aside_path(staging);
    fs::rename(dir, &aside)?;
    if let Err(e) = fs::rename(staging, dir) {
        if let Err(restore) = fs::rename(&aside, dir) {
            warn!(
                path = %dir.display(),
                aside = %aside.display(),
                error = %restore,
                "could not restore previous shard directory"
            );
        }
        return Err(e.into());
    }
    if let Err(e) = fs::remove_dir_all(&aside) {
        warn!(path = %aside.display(), error = %e, "could not remove replaced shard directory");
    }
    Ok(())
}

/// Sibling of `staging` named `.replaced<staging name>`.
fn aside_path(staging: &Path) -> PathBuf {
    let mut name = OsString::from(".replaced");
    name.push(staging.file_name().unwrap_or_default());
    staging.with_file_name(name)
}

/// Best-effort fsync of a directory so the rename is durable.
fn sync_dir(dir: &Path) {
    let synced = File::open(dir).and_then(|d| d.sync_all());
    if let Err(e) = synced {
        warn!(path = %dir.display(), error = %e, "directory sync failed");
    }
}
