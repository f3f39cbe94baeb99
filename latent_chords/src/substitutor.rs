// Phrase-level substitution: the engine's single entry point for the UI.
//
// Given a phrase (ordered chord ids, duplicates allowed), the selected
// positions, and a strategy, `PhraseSubstitutor` either replaces exactly one
// chord or declines. The gate:
//
// 1. Exactly one distinct target index, strictly interior (0 < i < len - 1), so that
//    both neighbors A = phrase[i-1] and C = phrase[i+1] exist.
// 2. A, B and C all resolve in the active dictionary.
// 3. (String entry point only) the strategy name is recognized.
//
// A request failing the gate is declined: the phrase comes back unchanged
// and the details record why, with no context or geometry. Declining is a
// normal outcome, not an error; only dimension/metric errors from the
// math layer are returned as `Err`.
//
// A successful substitution can still map B back to itself (e.g. an empty
// candidate pool). `Substitution::is_identity` tells that case apart from a
// decline.

use crate::chord::{Chord, ChordId};
use crate::dictionary::ChordDictionary;
use crate::error::Result;
use crate::index::ChordIndex;
use crate::params::StrategyParams;
use crate::strategy::{ContextWindow, Geometry, Strategy};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Why a substitution request was declined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DeclineReason {
    /// No position was selected.
    NoTarget,
    /// More than one distinct position was selected.
    MultipleTargets { count: usize },
    /// The position is the first or last of the phrase, or past its end.
    BoundaryIndex { index: usize, len: usize },
    /// A context chord is not in the dictionary.
    UnknownChord { id: ChordId },
    /// The strategy name is not one of `linear`, `knn`, `angular`.
    UnknownStrategy { name: String },
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::NoTarget => write!(f, "no target selected"),
            DeclineReason::MultipleTargets { count } => {
                write!(f, "{count} targets selected, exactly one is required")
            }
            DeclineReason::BoundaryIndex { index, len } => {
                write!(f, "index {index} has no interior context in a phrase of {len}")
            }
            DeclineReason::UnknownChord { id } => write!(f, "unknown chord {id}"),
            DeclineReason::UnknownStrategy { name } => write!(f, "unknown strategy {name:?}"),
        }
    }
}

/// A completed substitution at one phrase position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub strategy: Strategy,
    /// Position in the phrase that was replaced.
    pub index: usize,
    pub context_a: Chord,
    pub context_b: Chord,
    pub context_c: Chord,
    pub substituted: Chord,
    pub geometry: Geometry,
}

impl Substitution {
    /// True if the strategy kept the original chord.
    pub fn is_identity(&self) -> bool {
        self.substituted.id == self.context_b.id
    }
}

/// Outcome details for the visualization layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubstitutionDetails {
    Declined { reason: DeclineReason },
    Substituted(Substitution),
}

impl SubstitutionDetails {
    pub fn substitution(&self) -> Option<&Substitution> {
        match self {
            SubstitutionDetails::Substituted(s) => Some(s),
            SubstitutionDetails::Declined { .. } => None,
        }
    }

    pub fn decline_reason(&self) -> Option<&DeclineReason> {
        match self {
            SubstitutionDetails::Declined { reason } => Some(reason),
            SubstitutionDetails::Substituted(_) => None,
        }
    }
}

/// The generated phrase together with how it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhraseSubstitution {
    pub phrase: Vec<ChordId>,
    pub details: SubstitutionDetails,
}

impl PhraseSubstitution {
    fn declined(phrase: &[ChordId], reason: DeclineReason) -> Self {
        debug!(%reason, "substitution declined");
        PhraseSubstitution {
            phrase: phrase.to_vec(),
            details: SubstitutionDetails::Declined { reason },
        }
    }
}

/// Substitution engine bound to one chord dictionary.
#[derive(Debug, Clone, Default)]
pub struct PhraseSubstitutor {
    index: ChordIndex,
}

impl PhraseSubstitutor {
    pub fn new(index: ChordIndex) -> Self {
        PhraseSubstitutor { index }
    }

    pub fn with_dictionary(dictionary: ChordDictionary) -> Self {
        Self::new(ChordIndex::new(dictionary))
    }

    /// Replace the dictionary. Must not overlap a substitution call, which
    /// `&mut self` enforces.
    pub fn set_dictionary(&mut self, dictionary: ChordDictionary) {
        self.index.set_dictionary(dictionary);
    }

    /// Resolve a chord id for notation/audio collaborators.
    pub fn get_by_id(&self, id: &ChordId) -> Option<&Chord> {
        self.index.get_by_id(id)
    }

    pub fn index(&self) -> &ChordIndex {
        &self.index
    }

    /// Substitute the chord at the single selected position of `phrase`.
    pub fn substitute_phrase(
        &self,
        phrase: &[ChordId],
        targets: &[usize],
        strategy: &Strategy,
    ) -> Result<PhraseSubstitution> {
        // Targets are a set: repeating a position still selects it once.
        let selected: BTreeSet<usize> = targets.iter().copied().collect();
        let index = match (selected.first(), selected.len()) {
            (None, _) => return Ok(PhraseSubstitution::declined(phrase, DeclineReason::NoTarget)),
            (Some(&i), 1) => i,
            (Some(_), count) => {
                return Ok(PhraseSubstitution::declined(
                    phrase,
                    DeclineReason::MultipleTargets { count },
                ));
            }
        };

        if index == 0 || index >= phrase.len().saturating_sub(1) {
            return Ok(PhraseSubstitution::declined(
                phrase,
                DeclineReason::BoundaryIndex {
                    index,
                    len: phrase.len(),
                },
            ));
        }

        let context = match self.resolve_window(&phrase[index - 1..=index + 1]) {
            Ok(context) => context,
            Err(id) => {
                return Ok(PhraseSubstitution::declined(
                    phrase,
                    DeclineReason::UnknownChord { id },
                ));
            }
        };

        let outcome = strategy.apply(&context, self.index.dictionary())?;
        debug!(
            strategy = strategy.name(),
            index,
            original = %context.b.id,
            substituted = %outcome.substituted.id,
            "substitution complete"
        );

        let mut generated = phrase.to_vec();
        generated[index] = outcome.substituted.id.clone();

        Ok(PhraseSubstitution {
            phrase: generated,
            details: SubstitutionDetails::Substituted(Substitution {
                strategy: strategy.clone(),
                index,
                context_a: context.a.clone(),
                context_b: context.b.clone(),
                context_c: context.c.clone(),
                substituted: outcome.substituted.clone(),
                geometry: outcome.geometry,
            }),
        })
    }

    /// String-keyed variant of `substitute_phrase` for collaborators that
    /// select the strategy by name. An unrecognized name declines.
    pub fn substitute_phrase_named(
        &self,
        phrase: &[ChordId],
        targets: &[usize],
        strategy_name: &str,
        params: &StrategyParams,
    ) -> Result<PhraseSubstitution> {
        match Strategy::from_name(strategy_name, params) {
            Some(strategy) => self.substitute_phrase(phrase, targets, &strategy),
            None => Ok(PhraseSubstitution::declined(
                phrase,
                DeclineReason::UnknownStrategy {
                    name: strategy_name.to_string(),
                },
            )),
        }
    }

    /// Resolve a three-id slice to a context window, or report the first
    /// id missing from the dictionary.
    fn resolve_window(&self, ids: &[ChordId]) -> std::result::Result<ContextWindow<'_>, ChordId> {
        Ok(ContextWindow {
            a: self.resolve(&ids[0])?,
            b: self.resolve(&ids[1])?,
            c: self.resolve(&ids[2])?,
        })
    }

    fn resolve(&self, id: &ChordId) -> std::result::Result<&Chord, ChordId> {
        self.index.get_by_id(id).ok_or_else(|| id.clone())
    }
}
