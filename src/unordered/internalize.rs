//! External-id shard directory → freshly ordered entity.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::DuplicatePolicy;
use crate::entity::{
    DoubleAttribute, DoubleTuple2Attribute, EdgeBundle, Entity, EntityKind, Guid,
    StringAttribute, VertexSet,
};
use crate::error::{Result, SphynxError};
use crate::shard::{
    list_shard_dir, DoubleAttributeRow, DoubleTuple2AttributeRow, EdgeRow, ShardFile,
    ShardListing, ShardRow, ShardSchema, StringAttributeRow, VertexRow,
};
use crate::unordered::{ShardDirSummary, UnorderedDisk};

pub(super) fn internalize(
    disk: &UnorderedDisk,
    guid: &Guid,
    kind: EntityKind,
    vsguid1: Option<&Guid>,
    vsguid2: Option<&Guid>,
) -> Result<ShardDirSummary> {
    let dir = disk.shard_dir(guid)?;
    if ShardSchema::for_kind(kind).is_none() {
        return Err(SphynxError::UnsupportedEntityType(kind.as_str().to_string()));
    }

    // Dependencies first; a missing vertex set fails before any read.
    let vs1 = match kind {
        EntityKind::EdgeBundle
        | EntityKind::DoubleAttribute
        | EntityKind::StringAttribute
        | EntityKind::DoubleTuple2Attribute => Some(disk.dependency(vsguid1)?),
        _ => None,
    };
    let vs2 = match kind {
        EntityKind::EdgeBundle => Some(disk.dependency(vsguid2)?),
        _ => None,
    };

    let config = disk.config();
    let listing = list_shard_dir(&dir, &config.completion_marker, config.shard_ordering)?;
    if config.require_completion_marker && !listing.has_marker {
        return Err(SphynxError::IncompleteShardDirectory(dir));
    }

    let (entity, rows): (Entity, usize) = match (kind, vs1, vs2) {
        (EntityKind::VertexSet, _, _) => {
            let rows: Vec<VertexRow> = read_all(disk, guid, &listing)?;
            let n = rows.len();
            let vs = vertex_set(disk, guid, rows)?;
            (vs.into(), n)
        }
        (EntityKind::EdgeBundle, Some((g1, vs1)), Some((g2, vs2))) => {
            let rows: Vec<EdgeRow> = read_all(disk, guid, &listing)?;
            let n = rows.len();
            let mut src = Vec::with_capacity(n);
            let mut dst = Vec::with_capacity(n);
            let mut edge_mapping = Vec::with_capacity(n);
            for row in rows {
                src.push(ordered_index(&g1, &vs1, row.src)?);
                dst.push(ordered_index(&g2, &vs2, row.dst)?);
                edge_mapping.push(row.id);
            }
            (EdgeBundle::new(src, dst, edge_mapping)?.into(), n)
        }
        (EntityKind::DoubleAttribute, Some((g1, vs1)), _) => {
            let rows: Vec<DoubleAttributeRow> = read_all(disk, guid, &listing)?;
            let n = rows.len();
            let (values, defined) = scatter(&g1, &vs1, rows, |r| (r.id, r.value))?;
            (DoubleAttribute::new(values, defined)?.into(), n)
        }
        (EntityKind::StringAttribute, Some((g1, vs1)), _) => {
            let rows: Vec<StringAttributeRow> = read_all(disk, guid, &listing)?;
            let n = rows.len();
            let (values, defined) = scatter(&g1, &vs1, rows, |r| (r.id, r.value))?;
            (StringAttribute::new(values, defined)?.into(), n)
        }
        (EntityKind::DoubleTuple2Attribute, Some((g1, vs1)), _) => {
            let rows: Vec<DoubleTuple2AttributeRow> = read_all(disk, guid, &listing)?;
            let n = rows.len();
            let (values, defined) =
                scatter(&g1, &vs1, rows, |r| (r.id, (r.value1, r.value2)))?;
            let (values1, values2) = values.into_iter().unzip();
            (DoubleTuple2Attribute::new(values1, values2, defined)?.into(), n)
        }
        _ => return Err(SphynxError::UnsupportedEntityType(kind.as_str().to_string())),
    };

    disk.store().install(guid.clone(), entity);

    let shards = listing.data_files.len();
    info!(
        guid = guid.as_str(),
        kind = kind.as_str(),
        rows,
        shards,
        "internalized"
    );

    Ok(ShardDirSummary {
        guid: guid.clone(),
        kind,
        rows,
        shards,
        path: listing.dir,
    })
}

/// Concatenate the rows of every data shard, in listing order.
fn read_all<R: ShardRow>(disk: &UnorderedDisk, guid: &Guid, listing: &ShardListing) -> Result<Vec<R>> {
    let codec = &disk.config().codec;
    let mut out = Vec::new();
    for path in &listing.data_files {
        let shard = ShardFile::open(path)?;
        let rows = shard.read_rows::<R>(codec).map_err(|e| match e {
            SphynxError::InvalidFormat(msg) => {
                SphynxError::InvalidFormat(format!("{}: {}", path.display(), msg))
            }
            SphynxError::Parquet(e) => {
                SphynxError::InvalidFormat(format!("{}: {}", path.display(), e))
            }
            other => other,
        })?;
        debug!(
            guid = guid.as_str(),
            file = %path.display(),
            rows = rows.len(),
            row_groups = shard.row_groups(),
            "shard read"
        );
        out.extend(rows);
    }
    Ok(out)
}

fn vertex_set(disk: &UnorderedDisk, guid: &Guid, rows: Vec<VertexRow>) -> Result<VertexSet> {
    let vs = VertexSet::from_external_ids(rows.into_iter().map(|r| r.id).collect());
    if let Some(external_id) = vs.first_duplicate() {
        match disk.config().duplicate_ids {
            DuplicatePolicy::Reject => {
                return Err(SphynxError::DuplicateExternalId {
                    guid: guid.clone(),
                    external_id,
                });
            }
            DuplicatePolicy::LastWriteWins => warn!(
                guid = guid.as_str(),
                external_id,
                rows = vs.len(),
                distinct = vs.mapping_to_ordered().len(),
                "duplicate external ids in vertex set, later rows win"
            ),
        }
    }
    Ok(vs)
}

fn ordered_index(vs_guid: &Guid, vs: &VertexSet, external_id: i64) -> Result<usize> {
    vs.ordered_index(external_id)
        .ok_or_else(|| SphynxError::InvalidReference {
            guid: vs_guid.clone(),
            external_id,
        })
}

/// Spread sparse rows over the ordered space of `vs`. Slots no row names
/// keep `T::default()` and `defined == false`.
fn scatter<R, T: Clone + Default>(
    vs_guid: &Guid,
    vs: &Arc<VertexSet>,
    rows: Vec<R>,
    split: impl Fn(R) -> (i64, T),
) -> Result<(Vec<T>, Vec<bool>)> {
    let n = vs.len();
    let mut values = vec![T::default(); n];
    let mut defined = vec![false; n];
    for row in rows {
        let (id, value) = split(row);
        let idx = ordered_index(vs_guid, vs, id)?;
        values[idx] = value;
        defined[idx] = true;
    }
    Ok((values, defined))
}
