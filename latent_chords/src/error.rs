// Error taxonomy for the latent chord engine.
//
// Only data and programmer errors live here: mismatched vector lengths, an
// unsupported distance metric, and malformed dictionaries rejected at load
// time. A substitution request that cannot proceed (boundary index, several
// targets, unknown chord, unknown strategy) is *not* an error; it comes back
// as `SubstitutionDetails::Declined` from `substitutor.rs`.

use crate::chord::ChordId;
use thiserror::Error;

/// Errors raised by vector math, neighbor search, and dictionary loading.
#[derive(Error, Debug)]
pub enum LatentError {
    /// Two vector operands have different lengths.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A distance metric other than Euclidean was requested.
    #[error("unsupported metric: {0:?} (only \"euclidean\" is available)")]
    UnsupportedMetric(String),

    /// A dictionary row has an empty latent vector.
    #[error("chord {id} has an empty latent vector")]
    EmptyVector { id: ChordId },

    /// A dictionary row's latent vector disagrees with the dictionary dimension.
    #[error("chord {id} has a {got}-dimensional latent vector, dictionary is {expected}-dimensional")]
    RaggedDictionary {
        id: ChordId,
        expected: usize,
        got: usize,
    },

    /// Two dictionary rows share an identifier.
    #[error("duplicate chord id {0}")]
    DuplicateId(ChordId),

    /// Malformed dictionary or parameter JSON (including rows missing `z`).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for latent engine operations.
pub type Result<T> = std::result::Result<T, LatentError>;
