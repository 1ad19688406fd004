//! Edge bundles between two ordered vertex sets.

use crate::error::{Result, SphynxError};

/// Edges in ordered index space.
///
/// Edge `i` runs from ordered vertex `src[i]` of the source vertex set to
/// ordered vertex `dst[i]` of the destination vertex set, and carries the
/// external edge id `edge_mapping[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeBundle {
    src: Vec<usize>,
    dst: Vec<usize>,
    edge_mapping: Vec<i64>,
}

impl EdgeBundle {
    pub fn new(src: Vec<usize>, dst: Vec<usize>, edge_mapping: Vec<i64>) -> Result<Self> {
        if src.len() != dst.len() || src.len() != edge_mapping.len() {
            return Err(SphynxError::InvalidEntity(format!(
                "edge bundle columns differ in length: src={}, dst={}, edge_mapping={}",
                src.len(),
                dst.len(),
                edge_mapping.len()
            )));
        }
        Ok(Self {
            src,
            dst,
            edge_mapping,
        })
    }

    pub fn len(&self) -> usize {
        self.src.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    pub fn src(&self) -> &[usize] {
        &self.src
    }

    pub fn dst(&self) -> &[usize] {
        &self.dst
    }

    pub fn edge_mapping(&self) -> &[i64] {
        &self.edge_mapping
    }

    /// Iterate `(edge_id, src, dst)` in ordered edge order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, usize, usize)> + '_ {
        self.edge_mapping
            .iter()
            .zip(self.src.iter().zip(self.dst.iter()))
            .map(|(&id, (&s, &d))| (id, s, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_lengths() {
        assert!(EdgeBundle::new(vec![0], vec![1], vec![5]).is_ok());
        let err = EdgeBundle::new(vec![0, 1], vec![1], vec![5, 6]).unwrap_err();
        assert!(matches!(err, SphynxError::InvalidEntity(_)));
    }

    #[test]
    fn test_iter_yields_triples() {
        let eb = EdgeBundle::new(vec![0, 2], vec![1, 0], vec![100, 200]).unwrap();
        let triples: Vec<_> = eb.iter().collect();
        assert_eq!(triples, vec![(100, 0, 1), (200, 2, 0)]);
        assert_eq!(eb.len(), 2);
    }
}
