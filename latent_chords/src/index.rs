// The active chord dictionary for one session.
//
// `ChordIndex` owns a shared handle to the dictionary currently in use.
// The data-loading collaborator installs a dictionary once at startup via
// `set_dictionary`; afterwards the index is read-only. Cloning the index is
// cheap (the dictionary sits behind an `Arc`), so several readers can query
// it at once without locking. Replacing the dictionary takes `&mut self`,
// which keeps a reload from racing an in-flight substitution on the same
// index; clones taken earlier keep seeing the old dictionary.
//
// Independent sessions (or tests) each hold their own `ChordIndex`, so no
// process-wide state is involved.

use crate::chord::{Chord, ChordId};
use crate::dictionary::ChordDictionary;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ChordIndex {
    dictionary: Arc<ChordDictionary>,
}

impl ChordIndex {
    pub fn new(dictionary: ChordDictionary) -> Self {
        let mut index = ChordIndex::default();
        index.set_dictionary(dictionary);
        index
    }

    /// Replace the active dictionary wholesale.
    pub fn set_dictionary(&mut self, dictionary: ChordDictionary) {
        info!(
            chords = dictionary.len(),
            dimension = dictionary.dimension(),
            "chord dictionary installed"
        );
        self.dictionary = Arc::new(dictionary);
    }

    /// Resolve a chord id. Unknown ids yield `None`, never an error.
    pub fn get_by_id(&self, id: &ChordId) -> Option<&Chord> {
        self.dictionary.get(id)
    }

    pub fn dictionary(&self) -> &ChordDictionary {
        &self.dictionary
    }
}
