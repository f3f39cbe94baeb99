// The chord dictionary: an ordered, validated, read-only set of chords.
//
// Built once from a list of rows (usually parsed from JSON) and never
// mutated afterwards. Construction enforces the dictionary invariants so
// that nothing downstream has to re-check them mid-query:
// - every chord has a non-empty latent vector,
// - every latent vector has the same dimensionality,
// - ids are unique.
//
// Row order is preserved. Neighbor search and the linear strategy break
// distance ties by this order, so reloading the same file reproduces the
// same substitutions (and the same visualizations).
//
// See also: `index.rs`, which holds the active dictionary for a session.

use crate::chord::{Chord, ChordId};
use crate::error::{LatentError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Accepted top-level shapes for a dictionary file.
#[derive(Deserialize)]
#[serde(untagged)]
enum DictionaryFile {
    Rows(Vec<Chord>),
    Wrapped { chords: Vec<Chord> },
}

/// An immutable, ordered collection of chords, unique by id.
#[derive(Debug, Clone, Default)]
pub struct ChordDictionary {
    chords: Vec<Chord>,
    positions: HashMap<ChordId, usize>,
    dimension: usize,
}

impl ChordDictionary {
    /// Validate and index a list of chords.
    pub fn new(chords: Vec<Chord>) -> Result<Self> {
        let dimension = chords.first().map_or(0, Chord::dimension);
        let mut positions = HashMap::with_capacity(chords.len());

        for (i, chord) in chords.iter().enumerate() {
            if chord.z.is_empty() {
                return Err(LatentError::EmptyVector {
                    id: chord.id.clone(),
                });
            }
            if chord.dimension() != dimension {
                return Err(LatentError::RaggedDictionary {
                    id: chord.id.clone(),
                    expected: dimension,
                    got: chord.dimension(),
                });
            }
            if positions.insert(chord.id.clone(), i).is_some() {
                return Err(LatentError::DuplicateId(chord.id.clone()));
            }
        }

        Ok(ChordDictionary {
            chords,
            positions,
            dimension,
        })
    }

    /// Parse a dictionary from JSON: either a bare array of chord rows or
    /// an object with a `chords` array.
    pub fn from_json(json: &str) -> Result<Self> {
        let rows = match serde_json::from_str(json)? {
            DictionaryFile::Rows(rows) => rows,
            DictionaryFile::Wrapped { chords } => chords,
        };
        Self::new(rows)
    }

    /// Load a dictionary from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    /// Shared latent dimensionality (0 for an empty dictionary).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All chords, in load order.
    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chord> {
        self.chords.iter()
    }

    /// Look up a chord by id. Absence is a normal outcome.
    pub fn get(&self, id: &ChordId) -> Option<&Chord> {
        self.positions.get(id).map(|&i| &self.chords[i])
    }

    /// Load-order position of a chord id.
    pub fn position_of(&self, id: &ChordId) -> Option<usize> {
        self.positions.get(id).copied()
    }
}

impl<'a> IntoIterator for &'a ChordDictionary {
    type Item = &'a Chord;
    type IntoIter = std::slice::Iter<'a, Chord>;

    fn into_iter(self) -> Self::IntoIter {
        self.chords.iter()
    }
}
