//! Concept-selector locking, derived from the current graph.
//!
//! A concept is locked while some live node lists it as a parent. Nothing is
//! stored: every query is answered from the node list as it is now.

use crate::{ConceptGraph, ConceptId, StepId};
use std::collections::BTreeSet;

impl ConceptGraph {
    /// Whether `concept` is a parent concept of any live node.
    #[must_use]
    pub fn is_concept_locked(&self, concept: ConceptId) -> bool {
        self.items
            .iter()
            .any(|item| item.parent_concept_ids.contains(&concept))
    }

    /// Whether the node `step` is a parent of any live node.
    #[must_use]
    pub fn is_step_locked(&self, step: StepId) -> bool {
        self.children(step).next().is_some()
    }

    /// Every locked concept.
    #[must_use]
    pub fn locked_concepts(&self) -> BTreeSet<ConceptId> {
        self.items
            .iter()
            .flat_map(|item| item.parent_concept_ids.iter().copied())
            .collect()
    }

    /// Every concept assigned to a live node.
    #[must_use]
    pub fn used_concepts(&self) -> BTreeSet<ConceptId> {
        self.items.iter().filter_map(|item| item.concept_id).collect()
    }

    /// Filter `candidates` down to concepts no live node carries yet.
    ///
    /// Order of `candidates` is preserved.
    pub fn selectable_concepts(
        &self,
        candidates: impl IntoIterator<Item = ConceptId>,
    ) -> Vec<ConceptId> {
        let used = self.used_concepts();
        candidates
            .into_iter()
            .filter(|concept| !used.contains(concept))
            .collect()
    }
}
