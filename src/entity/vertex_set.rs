//! Vertex sets in the ordered index space `0..n`.

use std::collections::HashMap;

/// A set of `n` vertices addressed by ordered index.
///
/// `mapping_to_unordered[i]` is the external id of ordered vertex `i`;
/// `mapping_to_ordered` is its inverse, built eagerly so that edge and
/// attribute translation can resolve external ids in O(1).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexSet {
    mapping: Vec<i64>,
    mapping_to_unordered: Vec<i64>,
    mapping_to_ordered: HashMap<i64, usize>,
}

impl VertexSet {
    /// Build a vertex set whose ordered index is the position in `ids`.
    ///
    /// If an external id repeats, the later position wins in
    /// `mapping_to_ordered`; use [`VertexSet::first_duplicate`] to detect it.
    /// The canonical `mapping` is the external ids themselves.
    pub fn from_external_ids(ids: Vec<i64>) -> Self {
        let mut mapping_to_ordered = HashMap::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            mapping_to_ordered.insert(id, i);
        }
        Self {
            mapping: ids.clone(),
            mapping_to_unordered: ids,
            mapping_to_ordered,
        }
    }

    /// Ordered cardinality.
    pub fn len(&self) -> usize {
        self.mapping_to_unordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping_to_unordered.is_empty()
    }

    /// Ordered index → canonical id.
    pub fn mapping(&self) -> &[i64] {
        &self.mapping
    }

    /// Ordered index → external id.
    pub fn mapping_to_unordered(&self) -> &[i64] {
        &self.mapping_to_unordered
    }

    /// External id → ordered index.
    pub fn mapping_to_ordered(&self) -> &HashMap<i64, usize> {
        &self.mapping_to_ordered
    }

    /// External id of ordered vertex `index`.
    #[inline]
    pub fn external_id(&self, index: usize) -> Option<i64> {
        self.mapping_to_unordered.get(index).copied()
    }

    /// Ordered index of `external_id`.
    #[inline]
    pub fn ordered_index(&self, external_id: i64) -> Option<usize> {
        self.mapping_to_ordered.get(&external_id).copied()
    }

    /// Whether the inverse map covers every ordered index exactly once.
    pub fn has_unique_external_ids(&self) -> bool {
        self.mapping_to_ordered.len() == self.mapping_to_unordered.len()
    }

    /// First external id (in ordered position) that occurs more than once.
    pub fn first_duplicate(&self) -> Option<i64> {
        if self.has_unique_external_ids() {
            return None;
        }
        self.mapping_to_unordered
            .iter()
            .enumerate()
            .find(|&(i, id)| self.mapping_to_ordered.get(id) != Some(&i))
            .map(|(_, &id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_example_ids() {
        let vs = VertexSet::from_external_ids(vec![10, 20, 30]);
        assert_eq!(vs.len(), 3);
        assert_eq!(vs.mapping_to_unordered(), &[10, 20, 30]);
        assert_eq!(vs.ordered_index(10), Some(0));
        assert_eq!(vs.ordered_index(20), Some(1));
        assert_eq!(vs.ordered_index(30), Some(2));
        assert_eq!(vs.ordered_index(40), None);
        assert_eq!(vs.external_id(2), Some(30));
        assert_eq!(vs.external_id(3), None);
        assert!(vs.first_duplicate().is_none());
    }

    #[test]
    fn test_empty() {
        let vs = VertexSet::from_external_ids(Vec::new());
        assert!(vs.is_empty());
        assert!(vs.has_unique_external_ids());
    }

    #[test]
    fn test_duplicate_later_position_wins() {
        let vs = VertexSet::from_external_ids(vec![7, 8, 7]);
        assert_eq!(vs.len(), 3);
        assert_eq!(vs.ordered_index(7), Some(2));
        assert!(!vs.has_unique_external_ids());
        assert_eq!(vs.first_duplicate(), Some(7));
    }

    proptest! {
        #[test]
        fn prop_inverse_mapping(ids in proptest::collection::hash_set(any::<i64>(), 0..200)) {
            let ids: Vec<i64> = ids.into_iter().collect();
            let vs = VertexSet::from_external_ids(ids.clone());
            prop_assert_eq!(vs.len(), ids.len());
            prop_assert_eq!(vs.mapping_to_ordered().len(), ids.len());
            for (i, id) in ids.iter().enumerate() {
                prop_assert_eq!(vs.ordered_index(*id), Some(i));
                prop_assert_eq!(vs.external_id(i), Some(*id));
            }
        }
    }
}
