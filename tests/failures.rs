//! Integration test: failure semantics of the unordered disk.
//!
//! Validates that:
//! - Scalars are rejected in both directions
//! - Dependency failures happen before any filesystem access
//! - A failing internalize installs nothing
//! - External ids with no ordered counterpart are errors, never index 0
//! - Corrupt or incomplete shard directories are reported as IO errors

use std::sync::Arc;

use serde_json::json;
use sphynx::shard::{
    DoubleTuple2AttributeRow, EdgeRow, ShardRow, ShardWriter, StringAttributeRow, VertexRow,
};
use sphynx::{
    CodecConfig, DoubleAttribute, DuplicatePolicy, EdgeBundle, EntityKind, EntityStore, Guid,
    Scalar, SphynxConfig, SphynxError, UnorderedDisk, VertexSet,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn setup_with(configure: impl FnOnce(&mut SphynxConfig)) -> (TempDir, UnorderedDisk) {
    let dir = TempDir::new().unwrap();
    let mut config = SphynxConfig::with_root(dir.path());
    configure(&mut config);
    let disk = UnorderedDisk::new(Arc::new(EntityStore::new()), config).unwrap();
    (dir, disk)
}

fn setup() -> (TempDir, UnorderedDisk) {
    setup_with(|_| {})
}

fn g(s: &str) -> Guid {
    Guid::from(s)
}

/// Write a shard directory by hand, the way an upstream batch job would.
fn write_dir<R: ShardRow>(disk: &UnorderedDisk, guid: &str, rows: Vec<R>, marker: bool) {
    let dir = disk.shard_dir(&g(guid)).unwrap();
    std::fs::create_dir_all(&dir).unwrap();
    let mut writer = ShardWriter::new();
    writer.extend(rows);
    writer
        .write_file(&dir.join("part-00000.parquet"), &CodecConfig::sequential())
        .unwrap();
    if marker {
        std::fs::write(dir.join("_SUCCESS"), b"").unwrap();
    }
}

fn write_edge_dir(disk: &UnorderedDisk, guid: &str, rows: &[EdgeRow], marker: bool) {
    write_dir(disk, guid, rows.to_vec(), marker);
}

fn write_vertex_dir(disk: &UnorderedDisk, guid: &str, ids: &[i64]) {
    write_dir(disk, guid, ids.iter().map(|&id| VertexRow { id }).collect(), true);
}

// ---------------------------------------------------------------------------
// Tests: Unsupported Variants
// ---------------------------------------------------------------------------

#[test]
fn scalar_externalize_is_unsupported() {
    let (_dir, disk) = setup();
    disk.store().install(g("s"), Scalar::new(json!({"count": 3})));

    let err = disk.externalize(&g("s"), None, None).unwrap_err();
    assert!(matches!(err, SphynxError::UnsupportedEntityType(_)), "{:?}", err);
    assert!(!disk.config().unordered_data_dir.exists());
}

#[test]
fn scalar_internalize_is_unsupported() {
    let (_dir, disk) = setup();
    let err = disk
        .internalize(&g("s"), EntityKind::Scalar, None, None)
        .unwrap_err();
    assert_eq!(err.code(), "UNSUPPORTED_ENTITY_TYPE");
    assert!(!disk.store().contains(&g("s")));
}

#[test]
fn externalize_unknown_guid() {
    let (_dir, disk) = setup();
    let err = disk.externalize(&g("nope"), None, None).unwrap_err();
    assert!(matches!(err, SphynxError::EntityNotFound(ref guid) if guid.as_str() == "nope"));
}

// ---------------------------------------------------------------------------
// Tests: Dependencies
// ---------------------------------------------------------------------------

#[test]
fn externalize_missing_dependency_touches_nothing() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("eb"), EdgeBundle::new(vec![0], vec![0], vec![1]).unwrap());

    let err = disk
        .externalize(&g("eb"), Some(&g("gone")), Some(&g("gone")))
        .unwrap_err();
    assert!(matches!(err, SphynxError::DependencyNotFound(_)), "{:?}", err);
    assert!(!disk.config().unordered_data_dir.exists());
}

#[test]
fn externalize_unset_dependency_is_not_found() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("attr"), DoubleAttribute::new(vec![1.0], vec![true]).unwrap());
    let err = disk.externalize(&g("attr"), None, None).unwrap_err();
    assert_eq!(err.code(), "DEPENDENCY_NOT_FOUND");
}

#[test]
fn dependency_of_wrong_kind() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![1]));
    disk.store()
        .install(g("attr"), DoubleAttribute::new(vec![1.0], vec![true]).unwrap());

    let err = disk
        .externalize(&g("attr"), Some(&g("attr")), None)
        .unwrap_err();
    match err {
        SphynxError::DependencyTypeMismatch { expected, found, .. } => {
            assert_eq!(expected, EntityKind::VertexSet);
            assert_eq!(found, EntityKind::DoubleAttribute);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn internalize_dependency_of_wrong_kind_installs_nothing() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("weights"), DoubleAttribute::new(vec![1.0, 2.0], vec![true, true]).unwrap());
    write_dir(
        &disk,
        "label",
        vec![StringAttributeRow { id: 1, value: "x".into() }],
        true,
    );

    let err = disk
        .internalize(&g("label"), EntityKind::StringAttribute, Some(&g("weights")), None)
        .unwrap_err();
    assert!(
        matches!(
            err,
            SphynxError::DependencyTypeMismatch {
                expected: EntityKind::VertexSet,
                found: EntityKind::DoubleAttribute,
                ..
            }
        ),
        "{:?}",
        err
    );
    assert_eq!(err.code(), "DEPENDENCY_TYPE_MISMATCH");
    assert!(!disk.store().contains(&g("label")));
}

#[test]
fn internalize_missing_dependency_installs_nothing() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("people"), VertexSet::from_external_ids(vec![1, 2]));
    write_edge_dir(&disk, "eb", &[EdgeRow { id: 9, src: 1, dst: 2 }], true);

    let err = disk
        .internalize(&g("eb"), EntityKind::EdgeBundle, Some(&g("people")), Some(&g("absent")))
        .unwrap_err();
    assert!(matches!(err, SphynxError::DependencyNotFound(ref guid) if guid.as_str() == "absent"));
    assert!(!disk.store().contains(&g("eb")));
}

#[test]
fn externalize_index_beyond_vertex_set() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![1, 2]));
    disk.store()
        .install(g("eb"), EdgeBundle::new(vec![0], vec![5], vec![1]).unwrap());

    let err = disk
        .externalize(&g("eb"), Some(&g("vs")), Some(&g("vs")))
        .unwrap_err();
    assert!(matches!(err, SphynxError::OrderedIndexOutOfRange { index: 5, .. }), "{:?}", err);
    assert!(!disk.config().unordered_data_dir.join("eb").exists());
}

// ---------------------------------------------------------------------------
// Tests: Translation
// ---------------------------------------------------------------------------

#[test]
fn unknown_external_id_is_invalid_reference() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![10, 20]));
    write_edge_dir(
        &disk,
        "eb",
        &[
            EdgeRow { id: 1, src: 10, dst: 20 },
            EdgeRow { id: 2, src: 10, dst: 999 },
        ],
        true,
    );

    let err = disk
        .internalize(&g("eb"), EntityKind::EdgeBundle, Some(&g("vs")), Some(&g("vs")))
        .unwrap_err();
    assert!(
        matches!(err, SphynxError::InvalidReference { external_id: 999, .. }),
        "{:?}",
        err
    );
    assert_eq!(err.code(), "INVALID_REFERENCE");
    assert!(!disk.store().contains(&g("eb")));
}

#[test]
fn unknown_external_id_in_attribute_is_invalid_reference() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![10, 20]));
    write_dir(
        &disk,
        "name",
        vec![
            StringAttributeRow { id: 20, value: "Eve".into() },
            StringAttributeRow { id: 404, value: "ghost".into() },
        ],
        true,
    );
    write_dir(
        &disk,
        "pos",
        vec![DoubleTuple2AttributeRow { id: 7, value1: 1.0, value2: 2.0 }],
        true,
    );

    let err = disk
        .internalize(&g("name"), EntityKind::StringAttribute, Some(&g("vs")), None)
        .unwrap_err();
    assert!(
        matches!(err, SphynxError::InvalidReference { external_id: 404, ref guid } if guid.as_str() == "vs"),
        "{:?}",
        err
    );
    assert!(!disk.store().contains(&g("name")));

    let err = disk
        .internalize(&g("pos"), EntityKind::DoubleTuple2Attribute, Some(&g("vs")), None)
        .unwrap_err();
    assert!(matches!(err, SphynxError::InvalidReference { external_id: 7, .. }), "{:?}", err);
    assert_eq!(err.code(), "INVALID_REFERENCE");
    assert!(!disk.store().contains(&g("pos")));
}

#[test]
fn declared_type_must_match_shard_schema() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![10, 20]));
    write_edge_dir(&disk, "eb", &[EdgeRow { id: 1, src: 10, dst: 20 }], true);

    let err = disk
        .internalize(&g("eb"), EntityKind::DoubleAttribute, Some(&g("vs")), None)
        .unwrap_err();
    assert!(matches!(err, SphynxError::InvalidFormat(_)), "{:?}", err);
    assert_eq!(err.code(), "IO_ERROR");
    assert!(err.to_string().contains("part-00000.parquet"), "{}", err);
}

// ---------------------------------------------------------------------------
// Tests: Directory State
// ---------------------------------------------------------------------------

#[test]
fn missing_directory_is_io_error() {
    let (_dir, disk) = setup();
    let err = disk
        .internalize(&g("never_written"), EntityKind::VertexSet, None, None)
        .unwrap_err();
    assert!(matches!(err, SphynxError::Io(_)), "{:?}", err);
}

#[test]
fn truncated_shard_is_rejected() {
    let (_dir, disk) = setup();
    write_vertex_dir(&disk, "vs", &[1, 2, 3, 4, 5]);
    let shard = disk.shard_dir(&g("vs")).unwrap().join("part-00000.parquet");
    let bytes = std::fs::read(&shard).unwrap();
    std::fs::write(&shard, &bytes[..bytes.len() - 5]).unwrap();

    let err = disk
        .internalize(&g("vs"), EntityKind::VertexSet, None, None)
        .unwrap_err();
    assert_eq!(err.code(), "IO_ERROR");
    assert!(!disk.store().contains(&g("vs")));
}

#[test]
fn marker_required_when_configured() {
    let (_dir, disk) = setup_with(|c| c.require_completion_marker = true);
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![1, 2]));
    write_edge_dir(&disk, "eb", &[EdgeRow { id: 1, src: 1, dst: 2 }], false);

    let err = disk
        .internalize(&g("eb"), EntityKind::EdgeBundle, Some(&g("vs")), Some(&g("vs")))
        .unwrap_err();
    assert!(matches!(err, SphynxError::IncompleteShardDirectory(_)), "{:?}", err);

    std::fs::write(disk.shard_dir(&g("eb")).unwrap().join("_SUCCESS"), b"").unwrap();
    disk.internalize(&g("eb"), EntityKind::EdgeBundle, Some(&g("vs")), Some(&g("vs")))
        .unwrap();
}

#[test]
fn marker_optional_by_default() {
    let (_dir, disk) = setup();
    disk.store()
        .install(g("vs"), VertexSet::from_external_ids(vec![1, 2]));
    write_edge_dir(&disk, "eb", &[EdgeRow { id: 1, src: 2, dst: 1 }], false);

    let summary = disk
        .internalize(&g("eb"), EntityKind::EdgeBundle, Some(&g("vs")), Some(&g("vs")))
        .unwrap();
    assert_eq!(summary.rows, 1);
}

// ---------------------------------------------------------------------------
// Tests: Duplicate External Ids
// ---------------------------------------------------------------------------

#[test]
fn duplicate_ids_last_write_wins_by_default() {
    let (_dir, disk) = setup();
    write_vertex_dir(&disk, "vs", &[5, 6, 5]);

    disk.internalize(&g("vs"), EntityKind::VertexSet, None, None)
        .unwrap();
    let vs = disk.store().get_vertex_set(&g("vs")).unwrap();
    assert_eq!(vs.len(), 3);
    assert_eq!(vs.ordered_index(5), Some(2));
}

#[test]
fn duplicate_ids_rejected_when_configured() {
    let (_dir, disk) = setup_with(|c| c.duplicate_ids = DuplicatePolicy::Reject);
    write_vertex_dir(&disk, "vs", &[5, 6, 5]);

    let err = disk
        .internalize(&g("vs"), EntityKind::VertexSet, None, None)
        .unwrap_err();
    assert!(
        matches!(err, SphynxError::DuplicateExternalId { external_id: 5, .. }),
        "{:?}",
        err
    );
    assert!(!disk.store().contains(&g("vs")));
}

#[test]
fn path_like_guid_rejected_before_io() {
    let (_dir, disk) = setup();
    let err = disk
        .internalize(&g(".."), EntityKind::VertexSet, None, None)
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_GUID");
}
