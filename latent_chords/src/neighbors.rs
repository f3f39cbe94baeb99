// Brute-force k-nearest-neighbor search over the chord dictionary.
//
// Every chord's distance to the query vector is computed into a separate
// list of `Neighbor` records (the chords themselves are borrowed, never
// copied or annotated), stably sorted ascending, and truncated to `k`.
// Because the sort is stable, equal distances keep dictionary order.
//
// Self-exclusion is by identifier: the query names the chord it was taken
// from (if any) and that chord is skipped. A query vector that is not in
// the dictionary (e.g. an interpolated point) therefore keeps its true
// nearest neighbor, and a different chord that happens to share the query
// vector is still reported at distance 0.

use crate::chord::{Chord, ChordId};
use crate::dictionary::ChordDictionary;
use crate::error::Result;
use crate::vector::Metric;
use tracing::trace;

/// Parameters of a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborQuery {
    /// Maximum number of neighbors to return. Zero yields an empty list.
    pub k: usize,
    pub metric: Metric,
    /// Chord to leave out of the results, normally the one the query vector
    /// belongs to.
    pub exclude: Option<ChordId>,
}

impl NeighborQuery {
    pub fn new(k: usize) -> Self {
        NeighborQuery {
            k,
            metric: Metric::Euclidean,
            exclude: None,
        }
    }

    pub fn excluding(mut self, id: &ChordId) -> Self {
        self.exclude = Some(id.clone());
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }
}

/// A dictionary chord paired with its distance to the query vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub chord: &'a Chord,
    pub distance: f64,
}

/// Up to `query.k` chords nearest to `target`, nearest first.
///
/// Returns fewer than `k` when the dictionary (minus the excluded chord) is
/// smaller. Fails with `DimensionMismatch` if `target` does not match the
/// dictionary's dimensionality.
pub fn k_nearest<'a>(
    target: &[f64],
    dictionary: &'a ChordDictionary,
    query: &NeighborQuery,
) -> Result<Vec<Neighbor<'a>>> {
    if query.k == 0 {
        return Ok(Vec::new());
    }

    let mut neighbors = Vec::with_capacity(dictionary.len());
    for chord in dictionary {
        if query.exclude.as_ref() == Some(&chord.id) {
            continue;
        }
        neighbors.push(Neighbor {
            chord,
            distance: query.metric.distance(&chord.z, target)?,
        });
    }

    // `sort_by` is stable: ties stay in dictionary order.
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    neighbors.truncate(query.k);

    trace!(
        k = query.k,
        found = neighbors.len(),
        scanned = dictionary.len(),
        "k-nearest query"
    );
    Ok(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LatentError;

    fn line_dictionary() -> ChordDictionary {
        ChordDictionary::new(vec![
            Chord::new("b", vec![0.0, 0.0]),
            Chord::new("far", vec![5.0, 0.0]),
            Chord::new("near", vec![1.0, 0.0]),
            Chord::new("mid", vec![0.0, 3.0]),
        ])
        .unwrap()
    }

    fn ids<'a>(neighbors: &[Neighbor<'a>]) -> Vec<&'a str> {
        neighbors.iter().map(|n| n.chord.id.as_str()).collect()
    }

    #[test]
    fn test_self_excluded_and_sorted() {
        let dict = line_dictionary();
        let b = ChordId::new("b");
        let result = k_nearest(&[0.0, 0.0], &dict, &NeighborQuery::new(10).excluding(&b)).unwrap();
        assert_eq!(ids(&result), vec!["near", "mid", "far"]);
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn test_truncates_to_k() {
        let dict = line_dictionary();
        let b = ChordId::new("b");
        let result = k_nearest(&[0.0, 0.0], &dict, &NeighborQuery::new(2).excluding(&b)).unwrap();
        assert_eq!(ids(&result), vec!["near", "mid"]);
        assert_eq!(result[1].distance, 3.0);
    }

    #[test]
    fn test_k_zero_is_empty() {
        let dict = line_dictionary();
        assert!(k_nearest(&[0.0, 0.0], &dict, &NeighborQuery::new(0)).unwrap().is_empty());
    }

    #[test]
    fn test_external_query_keeps_true_nearest() {
        // A query vector that is not a dictionary entry keeps its nearest
        // chord; nothing is dropped by sort position.
        let dict = line_dictionary();
        let result = k_nearest(&[0.9, 0.0], &dict, &NeighborQuery::new(1)).unwrap();
        assert_eq!(ids(&result), vec!["near"]);
    }

    #[test]
    fn test_ties_follow_dictionary_order() {
        let dict = ChordDictionary::new(vec![
            Chord::new("origin", vec![0.0, 0.0]),
            Chord::new("east", vec![1.0, 0.0]),
            Chord::new("north", vec![0.0, 1.0]),
            Chord::new("west", vec![-1.0, 0.0]),
        ])
        .unwrap();
        let origin = ChordId::new("origin");
        let result =
            k_nearest(&[0.0, 0.0], &dict, &NeighborQuery::new(3).excluding(&origin)).unwrap();
        assert_eq!(ids(&result), vec!["east", "north", "west"]);
    }

    #[test]
    fn test_duplicate_vector_under_other_id_is_kept() {
        let dict = ChordDictionary::new(vec![
            Chord::new("b", vec![2.0]),
            Chord::new("b_twin", vec![2.0]),
            Chord::new("c", vec![3.0]),
        ])
        .unwrap();
        let b = ChordId::new("b");
        let result = k_nearest(&[2.0], &dict, &NeighborQuery::new(1).excluding(&b)).unwrap();
        assert_eq!(ids(&result), vec!["b_twin"]);
        assert_eq!(result[0].distance, 0.0);
    }

    #[test]
    fn test_dimension_mismatch_propagates() {
        let dict = line_dictionary();
        let result = k_nearest(&[0.0, 0.0, 0.0], &dict, &NeighborQuery::new(1));
        assert!(matches!(result, Err(LatentError::DimensionMismatch { .. })));
    }
}
