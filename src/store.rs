//! EntityStore - thread-safe GUID → entity registry
//!
//! One `RwLock` guards the whole map. Critical sections are limited to a
//! single map read or write: entities are built before `install` is called
//! and handed out as `Arc` handles, so no I/O or construction work ever
//! runs while the lock is held, and an observer sees either no entry or a
//! fully formed entity.
//!
//! Installing under an existing GUID replaces the previous entity
//! (last write wins, no merge).

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::entity::{Entity, EntityKind, Guid, VertexSet};
use crate::error::{Result, SphynxError};

#[derive(Debug, Default)]
pub struct EntityStore {
    entities: RwLock<HashMap<Guid, Entity>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section is one map operation, so a panic elsewhere
    // cannot leave the map half-updated.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Guid, Entity>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Guid, Entity>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get an entity by guid.
    pub fn get(&self, guid: &Guid) -> Option<Entity> {
        self.read().get(guid).cloned()
    }

    /// Install an entity, returning the one it replaced (if any).
    pub fn install(&self, guid: Guid, entity: impl Into<Entity>) -> Option<Entity> {
        let entity = entity.into();
        self.write().insert(guid, entity)
    }

    /// Get a resident vertex set that another entity depends on.
    ///
    /// Fails with `DependencyNotFound` if the guid is absent and
    /// `DependencyTypeMismatch` if it names a different variant.
    pub fn get_vertex_set(&self, guid: &Guid) -> Result<Arc<VertexSet>> {
        match self.get(guid) {
            Some(Entity::VertexSet(vs)) => Ok(vs),
            Some(other) => Err(SphynxError::DependencyTypeMismatch {
                guid: guid.clone(),
                expected: EntityKind::VertexSet,
                found: other.kind(),
            }),
            None => Err(SphynxError::DependencyNotFound(guid.clone())),
        }
    }

    /// Check if a guid is resident
    pub fn contains(&self, guid: &Guid) -> bool {
        self.read().contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All resident guids with their kinds, sorted by guid.
    pub fn list(&self) -> Vec<(Guid, EntityKind)> {
        let mut out: Vec<(Guid, EntityKind)> = self
            .read()
            .iter()
            .map(|(guid, entity)| (guid.clone(), entity.kind()))
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DoubleAttribute, Scalar};

    #[test]
    fn test_install_and_get() {
        let store = EntityStore::new();
        assert!(store.is_empty());
        assert!(store.get(&Guid::from("vs")).is_none());

        store.install(Guid::from("vs"), VertexSet::from_external_ids(vec![1, 2]));
        let entity = store.get(&Guid::from("vs")).unwrap();
        assert_eq!(entity.kind(), EntityKind::VertexSet);
        assert!(store.contains(&Guid::from("vs")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_install_overwrites() {
        let store = EntityStore::new();
        let guid = Guid::from("g");
        assert!(store.install(guid.clone(), Scalar::new(serde_json::json!(1))).is_none());
        let prev = store.install(guid.clone(), VertexSet::from_external_ids(vec![5]));
        assert_eq!(prev.unwrap().kind(), EntityKind::Scalar);
        assert_eq!(store.get(&guid).unwrap().kind(), EntityKind::VertexSet);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_vertex_set_errors() {
        let store = EntityStore::new();
        store.install(
            Guid::from("attr"),
            DoubleAttribute::new(vec![1.0], vec![true]).unwrap(),
        );

        let err = store.get_vertex_set(&Guid::from("missing")).unwrap_err();
        assert!(matches!(err, SphynxError::DependencyNotFound(ref g) if g.as_str() == "missing"));

        let err = store.get_vertex_set(&Guid::from("attr")).unwrap_err();
        assert!(matches!(
            err,
            SphynxError::DependencyTypeMismatch {
                found: EntityKind::DoubleAttribute,
                ..
            }
        ));
    }

    #[test]
    fn test_list_sorted() {
        let store = EntityStore::new();
        store.install(Guid::from("b"), VertexSet::from_external_ids(vec![]));
        store.install(Guid::from("a"), Scalar::new(serde_json::Value::Null));
        let listed = store.list();
        assert_eq!(
            listed,
            vec![
                (Guid::from("a"), EntityKind::Scalar),
                (Guid::from("b"), EntityKind::VertexSet),
            ]
        );
    }
}
