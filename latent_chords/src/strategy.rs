// Substitution strategies.
//
// Each strategy looks at a context window (A, B, C) of three consecutive
// chords and proposes a replacement for B, together with the geometry the
// visualization layer needs to show how the choice was made:
//
// - Linear: interpolate halfway between A and C in latent space and take
//   the dictionary chord closest to that midpoint. Geometry: the midpoint.
// - Knn: take the chord nearest to B itself. Geometry: B's k nearest
//   neighbors (the farthest one sets the drawn search radius).
// - Angular: among B's k nearest neighbors, take the one whose displacement
//   from A points most nearly along A->B. Geometry: every screened
//   candidate with its displacement and angle, plus the A->B reference.
//
// All three fall back to a defined chord instead of failing when there is
// nothing to choose from: Linear keeps C on an empty dictionary, Knn and
// Angular keep B when the candidate pool is empty (including k = 0).
//
// `Strategy` is a closed enum; the collaborator-facing string names are
// mapped onto it by `Strategy::from_name`, which is the only place an
// unrecognized name can appear.

use crate::chord::Chord;
use crate::dictionary::ChordDictionary;
use crate::error::Result;
use crate::neighbors::{Neighbor, NeighborQuery, k_nearest};
use crate::params::StrategyParams;
use crate::vector::{Metric, UNDEFINED_ANGLE, add, angle_between, scale, subtract};
use serde::{Deserialize, Serialize};

/// Interpolation factor between A and C for the linear strategy.
pub const LINEAR_T: f64 = 0.5;

/// A substitution strategy together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Strategy {
    Linear,
    Knn {
        k: usize,
        #[serde(default)]
        metric: Metric,
    },
    Angular {
        k: usize,
        #[serde(default)]
        metric: Metric,
    },
}

impl Strategy {
    /// Map a collaborator-facing strategy name (`linear`, `knn`, `angular`,
    /// case-insensitive) to a strategy. `None` for anything else.
    pub fn from_name(name: &str, params: &StrategyParams) -> Option<Strategy> {
        match name.trim().to_lowercase().as_str() {
            "linear" => Some(Strategy::Linear),
            "knn" => Some(Strategy::Knn {
                k: params.k,
                metric: params.metric,
            }),
            "angular" => Some(Strategy::Angular {
                k: params.k,
                metric: params.metric,
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Linear => "linear",
            Strategy::Knn { .. } => "knn",
            Strategy::Angular { .. } => "angular",
        }
    }

    /// Run this strategy on a context window.
    pub fn apply<'a>(
        &self,
        context: &ContextWindow<'a>,
        dictionary: &'a ChordDictionary,
    ) -> Result<StrategyOutcome<'a>> {
        match *self {
            Strategy::Linear => linear(context, dictionary),
            Strategy::Knn { k, metric } => {
                knn(context, dictionary, &NeighborQuery::new(k).with_metric(metric))
            }
            Strategy::Angular { k, metric } => {
                angular(context, dictionary, &NeighborQuery::new(k).with_metric(metric))
            }
        }
    }
}

/// Three consecutive chords of a phrase; `b` is the one being replaced.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindow<'a> {
    pub a: &'a Chord,
    pub b: &'a Chord,
    pub c: &'a Chord,
}

/// A chord paired with its distance to some query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChord {
    pub chord: Chord,
    pub distance: f64,
}

impl From<Neighbor<'_>> for ScoredChord {
    fn from(n: Neighbor<'_>) -> Self {
        ScoredChord {
            chord: n.chord.clone(),
            distance: n.distance,
        }
    }
}

/// A candidate screened by the angular strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngularCandidate {
    pub chord: Chord,
    /// Distance from B.
    pub distance: f64,
    /// `N.z - A.z`.
    pub displacement: Vec<f64>,
    /// Angle in radians between `displacement` and the A->B reference, or
    /// `UNDEFINED_ANGLE` if either vector is zero (serialized as `null`).
    pub angle: f64,
}

/// Strategy-specific geometry handed to the visualization layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    /// Linear: the interpolated latent point.
    Midpoint { point: Vec<f64> },
    /// Knn: B's nearest neighbors, nearest first.
    Neighbors { neighbors: Vec<ScoredChord> },
    /// Angular: the A->B reference direction and every screened candidate,
    /// in neighbor order.
    Angular {
        reference: Vec<f64>,
        candidates: Vec<AngularCandidate>,
    },
}

impl Geometry {
    /// Distance to the farthest neighbor considered, if any.
    pub fn search_radius(&self) -> Option<f64> {
        match self {
            Geometry::Midpoint { .. } => None,
            Geometry::Neighbors { neighbors } => neighbors.last().map(|n| n.distance),
            Geometry::Angular { candidates, .. } => candidates.last().map(|c| c.distance),
        }
    }
}

/// What a strategy proposes for B.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutcome<'a> {
    pub substituted: &'a Chord,
    pub geometry: Geometry,
}

/// Replace B with the chord nearest to the A-C midpoint.
pub fn linear<'a>(
    context: &ContextWindow<'a>,
    dictionary: &'a ChordDictionary,
) -> Result<StrategyOutcome<'a>> {
    let midpoint = add(
        &scale(&context.a.z, 1.0 - LINEAR_T),
        &scale(&context.c.z, LINEAR_T),
    )?;

    let mut best: Option<(&'a Chord, f64)> = None;
    for chord in dictionary {
        let distance = Metric::Euclidean.distance(&chord.z, &midpoint)?;
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((chord, distance));
        }
    }

    let substituted = best.map_or(context.c, |(chord, _)| chord);
    Ok(StrategyOutcome {
        substituted,
        geometry: Geometry::Midpoint { point: midpoint },
    })
}

/// Replace B with its nearest neighbor.
///
/// B itself is always excluded from the neighbor pool; any exclusion set on
/// `query` is overridden.
pub fn knn<'a>(
    context: &ContextWindow<'a>,
    dictionary: &'a ChordDictionary,
    query: &NeighborQuery,
) -> Result<StrategyOutcome<'a>> {
    let query = query.clone().excluding(&context.b.id);
    let neighbors = k_nearest(&context.b.z, dictionary, &query)?;

    let substituted = neighbors.first().map_or(context.b, |n| n.chord);
    Ok(StrategyOutcome {
        substituted,
        geometry: Geometry::Neighbors {
            neighbors: neighbors.into_iter().map(ScoredChord::from).collect(),
        },
    })
}

/// Replace B with the neighbor of B best aligned with the A->B direction.
///
/// The first candidate with the strictly smallest angle wins. Candidates
/// with an undefined angle are never chosen; if no candidate has a defined
/// angle, B is kept.
pub fn angular<'a>(
    context: &ContextWindow<'a>,
    dictionary: &'a ChordDictionary,
    query: &NeighborQuery,
) -> Result<StrategyOutcome<'a>> {
    let query = query.clone().excluding(&context.b.id);
    let neighbors = k_nearest(&context.b.z, dictionary, &query)?;
    let reference = subtract(&context.b.z, &context.a.z)?;

    let mut candidates = Vec::with_capacity(neighbors.len());
    let mut best: Option<(&'a Chord, f64)> = None;
    for neighbor in &neighbors {
        let displacement = subtract(&neighbor.chord.z, &context.a.z)?;
        let angle = angle_between(&reference, &displacement)?;
        if angle < best.map_or(UNDEFINED_ANGLE, |(_, a)| a) {
            best = Some((neighbor.chord, angle));
        }
        candidates.push(AngularCandidate {
            chord: neighbor.chord.clone(),
            distance: neighbor.distance,
            displacement,
            angle,
        });
    }

    let substituted = best.map_or(context.b, |(chord, _)| chord);
    Ok(StrategyOutcome {
        substituted,
        geometry: Geometry::Angular {
            reference,
            candidates,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord::ChordId;
    use std::f64::consts::FRAC_PI_2;

    fn dict(rows: &[(&str, &[f64])]) -> ChordDictionary {
        ChordDictionary::new(rows.iter().map(|(id, z)| Chord::new(*id, z.to_vec())).collect())
            .unwrap()
    }

    fn window<'a>(dict: &'a ChordDictionary, a: &str, b: &str, c: &str) -> ContextWindow<'a> {
        ContextWindow {
            a: dict.get(&ChordId::new(a)).unwrap(),
            b: dict.get(&ChordId::new(b)).unwrap(),
            c: dict.get(&ChordId::new(c)).unwrap(),
        }
    }

    #[test]
    fn test_linear_picks_exact_midpoint() {
        let d = dict(&[
            ("a", &[0.0, 0.0]),
            ("b", &[0.0, 3.0]),
            ("c", &[2.0, 0.0]),
            ("m", &[1.0, 0.0]),
        ]);
        let outcome = linear(&window(&d, "a", "b", "c"), &d).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("m"));
        assert_eq!(outcome.geometry, Geometry::Midpoint { point: vec![1.0, 0.0] });
        assert_eq!(outcome.geometry.search_radius(), None);
    }

    #[test]
    fn test_linear_tie_goes_to_first_in_dictionary() {
        let d = dict(&[
            ("a", &[0.0, 0.0]),
            ("up", &[1.0, 0.5]),
            ("down", &[1.0, -0.5]),
            ("c", &[2.0, 0.0]),
        ]);
        let outcome = linear(&window(&d, "a", "up", "c"), &d).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("up"));
    }

    #[test]
    fn test_linear_empty_dictionary_keeps_c() {
        let d = dict(&[("a", &[0.0]), ("b", &[1.0]), ("c", &[4.0])]);
        let empty = ChordDictionary::default();
        let outcome = linear(&window(&d, "a", "b", "c"), &empty).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("c"));
        assert_eq!(outcome.geometry, Geometry::Midpoint { point: vec![2.0] });
    }

    #[test]
    fn test_knn_picks_nearest_to_b() {
        let d = dict(&[("b", &[0.0, 0.0]), ("x", &[1.0, 0.0]), ("y", &[5.0, 0.0])]);
        let ctx = window(&d, "y", "b", "y");
        let outcome = knn(&ctx, &d, &NeighborQuery::new(1)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("x"));
        assert_eq!(outcome.geometry.search_radius(), Some(1.0));
    }

    #[test]
    fn test_knn_neighbor_list_and_radius() {
        let d = dict(&[("b", &[0.0, 0.0]), ("x", &[1.0, 0.0]), ("y", &[5.0, 0.0])]);
        let ctx = window(&d, "x", "b", "y");
        let outcome = knn(&ctx, &d, &NeighborQuery::new(5)).unwrap();
        match &outcome.geometry {
            Geometry::Neighbors { neighbors } => {
                let ids: Vec<&str> = neighbors.iter().map(|n| n.chord.id.as_str()).collect();
                assert_eq!(ids, vec!["x", "y"]);
            }
            other => panic!("expected neighbor geometry, got {other:?}"),
        }
        assert_eq!(outcome.geometry.search_radius(), Some(5.0));
    }

    #[test]
    fn test_knn_k_zero_keeps_b() {
        let d = dict(&[("b", &[0.0]), ("x", &[1.0])]);
        let ctx = window(&d, "x", "b", "x");
        let outcome = knn(&ctx, &d, &NeighborQuery::new(0)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("b"));
        assert_eq!(outcome.geometry, Geometry::Neighbors { neighbors: vec![] });
        assert_eq!(outcome.geometry.search_radius(), None);
    }

    #[test]
    fn test_angular_prefers_aligned_candidate() {
        let d = dict(&[
            ("a", &[0.0, 0.0]),
            ("b", &[1.0, 0.0]),
            ("x", &[2.0, 0.0]),
            ("y", &[0.0, 2.0]),
        ]);
        // Pool of two: x (distance 1) and a (distance 1); a's displacement
        // from itself is zero, so its angle is undefined.
        let ctx = window(&d, "a", "b", "y");
        let outcome = angular(&ctx, &d, &NeighborQuery::new(2)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("x"));
    }

    #[test]
    fn test_angular_candidate_angles() {
        let d = dict(&[
            ("a", &[0.0, 0.0]),
            ("b", &[1.0, 0.0]),
            ("x", &[2.0, 0.0]),
            ("y", &[0.0, 2.0]),
        ]);
        let ctx = window(&d, "a", "b", "x");
        let outcome = angular(&ctx, &d, &NeighborQuery::new(3)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("x"));
        match &outcome.geometry {
            Geometry::Angular {
                reference,
                candidates,
            } => {
                assert_eq!(reference, &vec![1.0, 0.0]);
                let x = candidates.iter().find(|c| c.chord.id.as_str() == "x").unwrap();
                let y = candidates.iter().find(|c| c.chord.id.as_str() == "y").unwrap();
                let a = candidates.iter().find(|c| c.chord.id.as_str() == "a").unwrap();
                assert!(x.angle.abs() < 1e-9);
                assert!((y.angle - FRAC_PI_2).abs() < 1e-9);
                assert_eq!(a.angle, UNDEFINED_ANGLE);
                assert_eq!(y.displacement, vec![0.0, 2.0]);
            }
            other => panic!("expected angular geometry, got {other:?}"),
        }
    }

    #[test]
    fn test_angular_first_strict_minimum_wins() {
        let d = dict(&[
            ("a", &[0.0, 0.0]),
            ("b", &[1.0, 0.0]),
            ("near", &[1.5, 0.0]),
            ("far", &[3.0, 0.0]),
        ]);
        let ctx = window(&d, "a", "b", "far");
        let outcome = angular(&ctx, &d, &NeighborQuery::new(3)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("near"));
    }

    #[test]
    fn test_angular_empty_pool_keeps_b() {
        let d = dict(&[("a", &[0.0]), ("b", &[1.0])]);
        let ctx = window(&d, "a", "b", "a");
        let outcome = angular(&ctx, &d, &NeighborQuery::new(0)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("b"));
        assert_eq!(
            outcome.geometry,
            Geometry::Angular {
                reference: vec![1.0],
                candidates: vec![],
            }
        );
    }

    #[test]
    fn test_angular_zero_reference_keeps_b() {
        // A == B gives no direction to align with.
        let d = dict(&[("b", &[1.0, 1.0]), ("x", &[2.0, 1.0])]);
        let ctx = window(&d, "b", "b", "x");
        let outcome = angular(&ctx, &d, &NeighborQuery::new(4)).unwrap();
        assert_eq!(outcome.substituted.id, ChordId::new("b"));
    }

    #[test]
    fn test_from_name() {
        let params = StrategyParams::with_k(3);
        assert_eq!(Strategy::from_name("linear", &params), Some(Strategy::Linear));
        assert_eq!(
            Strategy::from_name("KNN", &params),
            Some(Strategy::Knn {
                k: 3,
                metric: Metric::Euclidean
            })
        );
        assert_eq!(
            Strategy::from_name("angular", &params).map(|s| s.name()),
            Some("angular")
        );
        assert_eq!(Strategy::from_name("spline", &params), None);
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: Strategy = serde_json::from_str(r#"{"strategy": "knn", "k": 4}"#).unwrap();
        assert_eq!(
            strategy,
            Strategy::Knn {
                k: 4,
                metric: Metric::Euclidean
            }
        );
        let strategy: Strategy = serde_json::from_str(r#"{"strategy": "linear"}"#).unwrap();
        assert_eq!(strategy, Strategy::Linear);
    }

    #[test]
    fn test_apply_dispatches() {
        let d = dict(&[("a", &[0.0]), ("b", &[1.0]), ("c", &[2.0]), ("x", &[1.2])]);
        let ctx = window(&d, "a", "b", "c");
        let linear = Strategy::Linear.apply(&ctx, &d).unwrap();
        assert_eq!(linear.substituted.id, ChordId::new("b"));
        let knn = Strategy::Knn {
            k: 1,
            metric: Metric::Euclidean,
        }
        .apply(&ctx, &d)
        .unwrap();
        assert_eq!(knn.substituted.id, ChordId::new("x"));
    }
}
