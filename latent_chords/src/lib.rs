// Latent Chord Substitution Engine
//
// Proposes a replacement for the middle chord B of a three-chord context
// (A, B, C) by querying a fixed dictionary of chords embedded in a learned
// latent space. Three geometric strategies are available: linear
// interpolation between A and C, nearest neighbor of B, and the neighbor of
// B best aligned with the A->B direction. Each returns the geometry it used
// so a visualization layer can show the decision.
//
// Architecture:
// - vector.rs: Vector algebra over latent vectors (distance, angle, ...) and
//   the `Metric` selector
// - chord.rs: `ChordId` and the `Chord` record (latent vector, 2D projection,
//   opaque pitch payload)
// - dictionary.rs: Validated, ordered, read-only `ChordDictionary` + JSON load
// - index.rs: `ChordIndex`, the session's active dictionary and id lookup
// - neighbors.rs: Brute-force k-nearest-neighbor search with exclusion by id
// - strategy.rs: `Strategy` enum and the linear / k-NN / angular algorithms
// - substitutor.rs: `PhraseSubstitutor`, the validity gate and entry point
// - params.rs: Per-request strategy parameters (`k`, metric)
// - error.rs: `LatentError` and the crate `Result` alias
//
// Everything is synchronous and deterministic: the same dictionary, phrase
// and parameters always produce the same substitution. Rendering, notation,
// audio and the 2D projection are external collaborators.

pub mod chord;
pub mod dictionary;
pub mod error;
pub mod index;
pub mod neighbors;
pub mod params;
pub mod strategy;
pub mod substitutor;
pub mod vector;

pub use chord::{Chord, ChordId};
pub use dictionary::ChordDictionary;
pub use error::{LatentError, Result};
pub use index::ChordIndex;
pub use params::StrategyParams;
pub use strategy::{Geometry, Strategy};
pub use substitutor::{
    DeclineReason, PhraseSubstitution, PhraseSubstitutor, Substitution, SubstitutionDetails,
};
pub use vector::Metric;
