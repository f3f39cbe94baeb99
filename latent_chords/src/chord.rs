// Chord records and identifiers.
//
// A `Chord` is one immutable row of the chord dictionary: its identifier,
// its latent vector `z`, an optional precomputed 2D projection (`z2D` in the
// JSON) for the visualization layer, and an opaque `pitchclass` payload that
// only the notation/audio collaborators interpret. The engine reads `id` and
// `z`; the other fields are carried through untouched so that results handed
// back to the UI already contain everything it needs to draw and play them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a chord in the dictionary.
///
/// Dictionary files use either strings or integers for ids; both are
/// normalized to their string form on load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ChordId(pub String);

impl ChordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ChordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => ChordId(s),
            RawId::Integer(n) => ChordId(n.to_string()),
        })
    }
}

/// One entry of the chord dictionary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub id: ChordId,
    /// Latent vector. Every chord in a dictionary has the same length.
    pub z: Vec<f64>,
    /// Precomputed display projection. Never used in distance computations.
    #[serde(rename = "z2D", default, skip_serializing_if = "Option::is_none")]
    pub z2d: Option<[f64; 2]>,
    /// Pitch content, opaque to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitchclass: Option<serde_json::Value>,
}

impl Chord {
    /// A chord with only an id and a latent vector.
    pub fn new(id: impl Into<ChordId>, z: Vec<f64>) -> Self {
        Chord {
            id: id.into(),
            z,
            z2d: None,
            pitchclass: None,
        }
    }

    pub fn with_projection(mut self, z2d: [f64; 2]) -> Self {
        self.z2d = Some(z2d);
        self
    }

    pub fn dimension(&self) -> usize {
        self.z.len()
    }
}
