//! Structural edits: node insertion, concept assignment and parent links.
//!
//! Every operation validates before it mutates, so a rejected edit leaves the
//! graph untouched.

use crate::{ConceptGraph, ConceptId, Error, GraphEvent, Result, StepId, WorkflowItem};
use petgraph::algo::has_path_connecting;
use tracing::{debug, warn};

impl ConceptGraph {
    /// Add a new root node.
    ///
    /// Its branch path is one past the largest branch path among existing roots.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] if no step id is left to allocate.
    pub fn add_root_node(&mut self) -> Result<StepId> {
        let branch_path = self
            .items
            .iter()
            .filter(|item| item.is_root())
            .map(|item| item.branch_path)
            .max()
            .unwrap_or(0)
            + 1;

        let step = self.allocator.allocate()?;
        self.insert_root(step, branch_path);
        Ok(step)
    }

    pub(crate) fn insert_root(&mut self, step: StepId, branch_path: u32) {
        self.items.push(WorkflowItem::root(step, branch_path));
        debug!(step = step.0, branch_path, "Added root node");
        self.emit(GraphEvent::NodeAdded {
            step,
            parents: vec![StepId::ROOT],
            branch_path,
        });
    }

    /// Add a new node below `parent`.
    ///
    /// The first child of a parent gets branch path `1`; later siblings get
    /// one past the largest branch path among the parent's current children.
    /// Once the child exists the parent's concept is locked.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStep`] if `parent` does not exist
    /// - [`Error::ConceptUnassigned`] if `parent` has no concept yet
    /// - [`Error::MalformedGraph`] if no step id is left to allocate
    pub fn add_child_node(&mut self, parent: StepId) -> Result<StepId> {
        let parent_index = self.require_index(parent)?;
        let parent_concept = self.items[parent_index]
            .concept_id
            .ok_or(Error::ConceptUnassigned { step: parent })?;

        let branch_path = self
            .children(parent)
            .map(|child| child.branch_path)
            .max()
            .map_or(1, |max| max + 1);

        let step = self.allocator.allocate()?;
        self.items
            .push(WorkflowItem::child(step, parent, parent_concept, branch_path));
        debug!(
            step = step.0,
            parent = parent.0,
            concept = parent_concept.0,
            branch_path,
            "Added child node"
        );
        self.emit(GraphEvent::NodeAdded {
            step,
            parents: vec![parent],
            branch_path,
        });
        Ok(step)
    }

    /// Assign `concept` to the node `step`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStep`] if `step` does not exist
    /// - [`Error::DuplicateConcept`] if another node already carries `concept`
    /// - [`Error::ConceptAlreadyLocked`] if the node's current concept is a
    ///   prerequisite of some other node
    pub fn assign_concept(&mut self, step: StepId, concept: ConceptId) -> Result<()> {
        let index = self.require_index(step)?;
        let current = self.items[index].concept_id;
        if current == Some(concept) {
            return Ok(());
        }

        if self.find_by_concept(concept).is_some() {
            warn!(step = step.0, concept = concept.0, "Rejected duplicate concept");
            return Err(Error::DuplicateConcept { concept });
        }
        if let Some(current) = current
            && self.is_step_locked(step)
        {
            warn!(step = step.0, concept = current.0, "Rejected reassignment of locked concept");
            return Err(Error::ConceptAlreadyLocked { concept: current });
        }

        self.items[index].concept_id = Some(concept);
        debug!(step = step.0, concept = concept.0, "Assigned concept");
        self.emit(GraphEvent::ConceptAssigned { step, concept });
        Ok(())
    }

    /// Make the node carrying `parent_concept` a prerequisite of `child`.
    ///
    /// A root that gains a parent stops being a root.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStep`] if `child` does not exist
    /// - [`Error::UnknownConcept`] if no node carries `parent_concept`
    /// - [`Error::DuplicateRelation`] if the link already exists
    /// - [`Error::CycleDetected`] if the parent is `child` itself or one of
    ///   its descendants
    pub fn add_parent_relation(&mut self, child: StepId, parent_concept: ConceptId) -> Result<()> {
        let child_index = self.require_index(child)?;
        let parent = self.step_for_concept(parent_concept)?;

        if self.items[child_index].has_parent(parent) {
            return Err(Error::DuplicateRelation { child, parent });
        }
        if self.would_create_cycle(parent, child) {
            warn!(
                child = child.0,
                parent = parent.0,
                "Rejected parent relation that would create a cycle"
            );
            return Err(Error::CycleDetected { child, parent });
        }

        self.items[child_index].push_parent(parent, parent_concept);
        debug!(child = child.0, parent = parent.0, "Added parent relation");
        self.emit(GraphEvent::RelationAdded { child, parent });
        Ok(())
    }

    /// Remove the node carrying `parent_concept` from the parents of `child`.
    ///
    /// If that was the parent's last child its concept becomes selectable again.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownStep`] if `child` does not exist
    /// - [`Error::UnknownConcept`] if no node carries `parent_concept`
    /// - [`Error::MissingRelation`] if the link does not exist
    /// - [`Error::LastParentRelation`] if it is the child's only parent
    pub fn remove_parent_relation(
        &mut self,
        child: StepId,
        parent_concept: ConceptId,
    ) -> Result<()> {
        let child_index = self.require_index(child)?;
        let parent = self.step_for_concept(parent_concept)?;

        let item = &self.items[child_index];
        if !item.has_parent(parent) {
            return Err(Error::MissingRelation { child, parent });
        }
        if item.real_parents().count() == 1 {
            return Err(Error::LastParentRelation { child });
        }

        self.items[child_index].remove_parent(parent);
        debug!(
            child = child.0,
            parent = parent.0,
            parent_unlocked = !self.is_step_locked(parent),
            "Removed parent relation"
        );
        self.emit(GraphEvent::RelationRemoved { child, parent });
        Ok(())
    }

    /// Whether an edge `parent -> child` would close a cycle, i.e. `parent`
    /// is `child` or already reachable from it.
    fn would_create_cycle(&self, parent: StepId, child: StepId) -> bool {
        if parent == child {
            return true;
        }
        let graph = self.dependency_graph();
        has_path_connecting(&graph, child, parent, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root(1, c10) -> a(2, c20) -> b(3, c30)
    fn chain() -> ConceptGraph {
        let mut graph = ConceptGraph::with_initial_root();
        graph.assign_concept(StepId(1), ConceptId(10)).unwrap();
        let a = graph.add_child_node(StepId(1)).unwrap();
        graph.assign_concept(a, ConceptId(20)).unwrap();
        let b = graph.add_child_node(a).unwrap();
        graph.assign_concept(b, ConceptId(30)).unwrap();
        graph.drain_events();
        graph
    }

    #[test]
    fn test_root_branch_paths_increase() {
        let mut graph = ConceptGraph::with_initial_root();
        let second = graph.add_root_node().unwrap();
        let third = graph.add_root_node().unwrap();
        assert_eq!(graph.get(second).unwrap().branch_path, 2);
        assert_eq!(graph.get(third).unwrap().branch_path, 3);
    }

    #[test]
    fn test_sibling_branch_numbering() {
        let mut graph = ConceptGraph::with_initial_root();
        graph.assign_concept(StepId(1), ConceptId(10)).unwrap();

        let first = graph.add_child_node(StepId(1)).unwrap();
        let second = graph.add_child_node(StepId(1)).unwrap();

        let first = graph.get(first).unwrap();
        let second = graph.get(second).unwrap();
        assert_eq!(first.branch_path, 1);
        assert_eq!(second.branch_path, 2);
        assert_eq!(first.parent_ids, vec![StepId(1)]);
        assert_eq!(second.parent_ids, vec![StepId(1)]);
        assert_eq!(second.parent_concept_ids, vec![ConceptId(10)]);
    }

    #[test]
    fn test_branch_paths_are_not_renumbered_after_removal() {
        let mut graph = ConceptGraph::with_initial_root();
        graph.assign_concept(StepId(1), ConceptId(10)).unwrap();
        let first = graph.add_child_node(StepId(1)).unwrap();
        let _second = graph.add_child_node(StepId(1)).unwrap();
        graph.remove_node(first).unwrap();

        let third = graph.add_child_node(StepId(1)).unwrap();
        assert_eq!(graph.get(third).unwrap().branch_path, 3);
    }

    #[test]
    fn test_add_child_requires_parent_concept() {
        let mut graph = ConceptGraph::with_initial_root();
        assert_eq!(
            graph.add_child_node(StepId(1)),
            Err(Error::ConceptUnassigned { step: StepId(1) })
        );
        assert_eq!(
            graph.add_child_node(StepId(9)),
            Err(Error::UnknownStep { step: StepId(9) })
        );
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_cycle_rejected_and_rolled_back() {
        let mut graph = chain();
        let result = graph.add_parent_relation(StepId(2), ConceptId(30));
        assert_eq!(
            result,
            Err(Error::CycleDetected {
                child: StepId(2),
                parent: StepId(3)
            })
        );
        let a = graph.get(StepId(2)).unwrap();
        assert_eq!(a.parent_ids, vec![StepId(1)]);
        assert_eq!(a.parent_concept_ids, vec![ConceptId(10)]);
        assert!(graph.pending_events().is_empty());
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut graph = chain();
        assert!(matches!(
            graph.add_parent_relation(StepId(3), ConceptId(30)),
            Err(Error::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_add_parent_relation() {
        let mut graph = chain();
        let c = graph.add_child_node(StepId(1)).unwrap();
        graph.assign_concept(c, ConceptId(40)).unwrap();
        graph.drain_events();

        graph.add_parent_relation(c, ConceptId(30)).unwrap();
        let c_item = graph.get(c).unwrap();
        assert_eq!(c_item.parent_ids, vec![StepId(1), StepId(3)]);
        assert_eq!(c_item.parent_concept_ids, vec![ConceptId(10), ConceptId(30)]);
        assert_eq!(
            graph.drain_events(),
            vec![GraphEvent::RelationAdded {
                child: c,
                parent: StepId(3)
            }]
        );

        assert_eq!(
            graph.add_parent_relation(c, ConceptId(30)),
            Err(Error::DuplicateRelation {
                child: c,
                parent: StepId(3)
            })
        );
    }

    #[test]
    fn test_root_gaining_parent_drops_sentinel() {
        let mut graph = chain();
        let other_root = graph.add_root_node().unwrap();
        graph.assign_concept(other_root, ConceptId(50)).unwrap();

        graph.add_parent_relation(other_root, ConceptId(30)).unwrap();
        let item = graph.get(other_root).unwrap();
        assert!(!item.is_root());
        assert_eq!(item.parent_ids, vec![StepId(3)]);
    }

    #[test]
    fn test_remove_parent_relation() {
        let mut graph = chain();
        let c = graph.add_child_node(StepId(1)).unwrap();
        graph.assign_concept(c, ConceptId(40)).unwrap();
        graph.add_parent_relation(c, ConceptId(30)).unwrap();
        assert!(graph.is_concept_locked(ConceptId(30)));

        graph.remove_parent_relation(c, ConceptId(30)).unwrap();
        let c_item = graph.get(c).unwrap();
        assert_eq!(c_item.parent_ids, vec![StepId(1)]);
        assert_eq!(c_item.parent_concept_ids, vec![ConceptId(10)]);
        assert!(!graph.is_concept_locked(ConceptId(30)));
    }

    #[test]
    fn test_remove_last_parent_rejected() {
        let mut graph = chain();
        assert_eq!(
            graph.remove_parent_relation(StepId(3), ConceptId(20)),
            Err(Error::LastParentRelation { child: StepId(3) })
        );
        assert_eq!(
            graph.remove_parent_relation(StepId(3), ConceptId(10)),
            Err(Error::MissingRelation {
                child: StepId(3),
                parent: StepId(1)
            })
        );
    }

    #[test]
    fn test_assign_concept_rules() {
        let mut graph = chain();
        assert_eq!(
            graph.assign_concept(StepId(3), ConceptId(20)),
            Err(Error::DuplicateConcept {
                concept: ConceptId(20)
            })
        );
        assert_eq!(
            graph.assign_concept(StepId(2), ConceptId(99)),
            Err(Error::ConceptAlreadyLocked {
                concept: ConceptId(20)
            })
        );
        // Leaf nodes may change concept freely.
        graph.assign_concept(StepId(3), ConceptId(31)).unwrap();
        assert_eq!(graph.get(StepId(3)).unwrap().concept_id, Some(ConceptId(31)));
        // Re-assigning the same concept is a no-op.
        graph.assign_concept(StepId(2), ConceptId(20)).unwrap();
    }
}
