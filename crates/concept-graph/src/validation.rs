//! Validation utilities for concept graphs.
//!
//! Edits made through [`ConceptGraph`]'s own methods keep the graph valid; a
//! list installed with [`ConceptGraph::set_flat_list`] is trusted as-is and can
//! be checked here.

use crate::{ConceptGraph, Error};
use petgraph::algo::is_cyclic_directed;
use std::collections::HashSet;

/// Result of graph validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the graph satisfies every structural invariant.
    pub is_valid: bool,
    /// List of validation errors, if any.
    pub errors: Vec<Error>,
}

impl ValidationResult {
    /// Create a valid result.
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create an invalid result with errors.
    #[must_use]
    pub fn invalid(errors: Vec<Error>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

impl ConceptGraph {
    /// Check the graph's structural invariants.
    ///
    /// Checks for:
    /// - Cycles among parent links
    /// - Duplicate step ids or concepts
    /// - The root sentinel mixed with real parents
    /// - Nodes with an empty parent list
    /// - The same parent listed twice
    /// - Parent ids naming nodes that do not exist
    /// - `parent_concept_ids` out of step with the parents' concepts
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();

        if is_cyclic_directed(&self.dependency_graph()) {
            errors.push(Error::malformed("parent links contain a cycle"));
        }

        let mut steps = HashSet::new();
        let mut concepts = HashSet::new();
        for item in &self.items {
            if item.step_id.is_root_sentinel() {
                errors.push(Error::malformed("a node uses the reserved step id 0"));
            }
            if !steps.insert(item.step_id) {
                errors.push(Error::malformed(format!(
                    "{} is used by more than one node",
                    item.step_id
                )));
            }
            if let Some(concept) = item.concept_id
                && !concepts.insert(concept)
            {
                errors.push(Error::DuplicateConcept { concept });
            }
        }

        for item in &self.items {
            let step = item.step_id;
            if item.parent_ids.is_empty() {
                errors.push(Error::malformed(format!("{step} has no parents")));
                continue;
            }
            let mut listed = HashSet::with_capacity(item.parent_ids.len());
            if let Some(repeated) = item.parent_ids.iter().find(|p| !listed.insert(**p)) {
                errors.push(Error::malformed(format!(
                    "{step} lists parent {repeated} more than once"
                )));
            }
            if item.parent_ids.contains(&crate::StepId::ROOT) {
                if item.parent_ids.len() > 1 {
                    errors.push(Error::malformed(format!(
                        "{step} mixes the root sentinel with real parents"
                    )));
                }
                continue;
            }

            let mut expected = Vec::with_capacity(item.parent_ids.len());
            for parent in &item.parent_ids {
                match self.get(*parent) {
                    Some(parent_item) => expected.push(parent_item.concept_id),
                    None => errors.push(Error::malformed(format!(
                        "{step} names missing parent {parent}"
                    ))),
                }
            }
            let cached: Vec<_> = item.parent_concept_ids.iter().copied().map(Some).collect();
            if expected.len() == item.parent_ids.len() && cached != expected {
                errors.push(Error::malformed(format!(
                    "{step} parent concepts do not match its parents"
                )));
            }
        }

        if errors.is_empty() {
            ValidationResult::valid()
        } else {
            ValidationResult::invalid(errors)
        }
    }
}
