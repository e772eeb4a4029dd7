//! The workflow item: one node of the concept graph.

use crate::{ConceptId, RecordId, StepId};
use serde::{Deserialize, Serialize};

/// A node in the concept graph.
///
/// `parent_ids` either holds exactly [`StepId::ROOT`] (the node is a root) or
/// only real parent step ids. `parent_concept_ids` mirrors the real parents
/// position by position and is empty for roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowItem {
    /// Identifier of the node within this graph.
    pub step_id: StepId,
    /// Concept represented by this node, once the user selected one.
    #[serde(default)]
    pub concept_id: Option<ConceptId>,
    /// Direct prerequisite nodes, or `[0]` for a root.
    pub parent_ids: Vec<StepId>,
    /// Layout hint separating siblings added under the same parent.
    pub branch_path: u32,
    /// Concepts of the nodes in `parent_ids`, in the same order.
    #[serde(default)]
    pub parent_concept_ids: Vec<ConceptId>,
    /// Storage id of the record this node was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    #[serde(skip)]
    pub(crate) to_be_removed: bool,
}

impl WorkflowItem {
    /// Create a root node (`parent_ids = [0]`).
    #[must_use]
    pub fn root(step_id: StepId, branch_path: u32) -> Self {
        Self {
            step_id,
            concept_id: None,
            parent_ids: vec![StepId::ROOT],
            branch_path,
            parent_concept_ids: Vec::new(),
            record_id: None,
            to_be_removed: false,
        }
    }

    /// Create a node under a single parent whose concept is `parent_concept`.
    #[must_use]
    pub fn child(
        step_id: StepId,
        parent: StepId,
        parent_concept: ConceptId,
        branch_path: u32,
    ) -> Self {
        Self {
            step_id,
            concept_id: None,
            parent_ids: vec![parent],
            branch_path,
            parent_concept_ids: vec![parent_concept],
            record_id: None,
            to_be_removed: false,
        }
    }

    /// Set the concept, returning `self` for chaining.
    #[must_use]
    pub fn with_concept(mut self, concept: ConceptId) -> Self {
        self.concept_id = Some(concept);
        self
    }

    /// Whether this node is a designated root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_ids.first().is_some_and(|p| p.is_root_sentinel())
    }

    /// Whether `step` is one of this node's real parents.
    #[must_use]
    pub fn has_parent(&self, step: StepId) -> bool {
        !step.is_root_sentinel() && self.parent_ids.contains(&step)
    }

    /// Real parents, skipping the root sentinel.
    pub fn real_parents(&self) -> impl Iterator<Item = StepId> + '_ {
        self.parent_ids
            .iter()
            .copied()
            .filter(|p| !p.is_root_sentinel())
    }

    /// Whether the node is marked by an in-progress cascade removal.
    #[must_use]
    pub fn is_marked_for_removal(&self) -> bool {
        self.to_be_removed
    }

    /// Link a real parent, dropping the root sentinel if present.
    pub(crate) fn push_parent(&mut self, parent: StepId, parent_concept: ConceptId) {
        if self.is_root() {
            self.parent_ids.clear();
            self.parent_concept_ids.clear();
        }
        self.parent_ids.push(parent);
        self.parent_concept_ids.push(parent_concept);
    }

    /// Unlink a real parent, returning the concept that mirrored it.
    ///
    /// Every occurrence of `parent` is dropped, together with the concept at
    /// the same position.
    pub(crate) fn remove_parent(&mut self, parent: StepId) -> Option<ConceptId> {
        let mut mirrored = None;
        while let Some(position) = self.parent_ids.iter().position(|p| *p == parent) {
            self.parent_ids.remove(position);
            if position < self.parent_concept_ids.len() {
                mirrored = Some(self.parent_concept_ids.remove(position));
            }
        }
        mirrored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_sentinel_only() {
        let root = WorkflowItem::root(StepId(1), 1);
        assert!(root.is_root());
        assert_eq!(root.parent_ids, vec![StepId::ROOT]);
        assert!(root.parent_concept_ids.is_empty());
        assert_eq!(root.real_parents().count(), 0);
    }

    #[test]
    fn test_push_parent_replaces_sentinel() {
        let mut root = WorkflowItem::root(StepId(1), 1);
        root.push_parent(StepId(5), ConceptId(50));
        assert!(!root.is_root());
        assert_eq!(root.parent_ids, vec![StepId(5)]);
        assert_eq!(root.parent_concept_ids, vec![ConceptId(50)]);
    }

    #[test]
    fn test_remove_parent_keeps_mirror_aligned() {
        let mut item = WorkflowItem::child(StepId(4), StepId(1), ConceptId(10), 1);
        item.push_parent(StepId(2), ConceptId(20));
        item.push_parent(StepId(3), ConceptId(30));

        assert_eq!(item.remove_parent(StepId(2)), Some(ConceptId(20)));
        assert_eq!(item.parent_ids, vec![StepId(1), StepId(3)]);
        assert_eq!(item.parent_concept_ids, vec![ConceptId(10), ConceptId(30)]);
        assert_eq!(item.remove_parent(StepId(9)), None);
    }

    #[test]
    fn test_serializes_camel_case_without_removal_mark() {
        let item = WorkflowItem::root(StepId(1), 1).with_concept(ConceptId(7));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["stepId"], 1);
        assert_eq!(json["conceptId"], 7);
        assert_eq!(json["parentIds"], serde_json::json!([0]));
        assert!(json.get("toBeRemoved").is_none());
        assert!(json.get("recordId").is_none());
    }
}
