//! The graph store.
//!
//! [`ConceptGraph`] owns the canonical flat list of [`WorkflowItem`]s. Parent
//! links are plain step ids into that list; petgraph views are built on demand
//! for ordering and reachability questions.

use crate::{ConceptId, Error, GraphEvent, Result, StepAllocator, StepId, WorkflowItem};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Nodes grouped by depth: layer `k` holds every node whose deepest parent
/// sits in layer `k - 1`. Roots form layer 0. Order within a layer follows
/// the flat list.
pub type LayeredView<'a> = Vec<Vec<&'a WorkflowItem>>;

/// Concept prerequisite graph.
///
/// Editing operations live in sibling modules (`relations`, `removal`,
/// `serializer`, ...) as further `impl` blocks on this type.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    /// Canonical node list.
    pub(crate) items: Vec<WorkflowItem>,
    /// Issues step ids for new nodes.
    pub(crate) allocator: StepAllocator,
    /// Changes not yet drained by the caller.
    pub(crate) events: Vec<GraphEvent>,
}

impl ConceptGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a brand-new graph holding a single root node with step id `1`.
    #[must_use]
    pub fn with_initial_root() -> Self {
        let mut graph = Self::new();
        graph.allocator.set_next_number(2);
        graph.insert_root(StepId(1), 1);
        graph
    }

    /// The current node list.
    #[must_use]
    pub fn flat_list(&self) -> &[WorkflowItem] {
        &self.items
    }

    /// Replace the node list wholesale.
    ///
    /// The list is taken as-is; use [`validate`](Self::validate) to check it.
    /// The allocator is advanced past the largest step id in `items` so later
    /// allocations cannot collide.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] if `items` uses the largest possible
    /// step id, leaving nothing to allocate. The graph is left unchanged.
    pub fn set_flat_list(&mut self, items: Vec<WorkflowItem>) -> Result<()> {
        if let Some(max) = items.iter().map(|item| item.step_id).max() {
            self.allocator.ensure_above(max)?;
        }
        self.items = items;
        for item in &mut self.items {
            item.to_be_removed = false;
        }
        debug!(node_count = self.items.len(), "Replaced concept graph node list");
        self.emit(GraphEvent::Replaced {
            node_count: self.items.len(),
        });
        Ok(())
    }

    /// Take the node list out of the graph, leaving it empty.
    pub fn take_flat_list(&mut self) -> Vec<WorkflowItem> {
        std::mem::take(&mut self.items)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a node with `step` exists.
    #[must_use]
    pub fn contains(&self, step: StepId) -> bool {
        self.index_of(step).is_some()
    }

    /// Look up a node by step id.
    #[must_use]
    pub fn get(&self, step: StepId) -> Option<&WorkflowItem> {
        self.items.iter().find(|item| item.step_id == step)
    }

    /// Look up the node assigned `concept`.
    #[must_use]
    pub fn find_by_concept(&self, concept: ConceptId) -> Option<&WorkflowItem> {
        self.items
            .iter()
            .find(|item| item.concept_id == Some(concept))
    }

    /// Resolve a concept to the step id of the node carrying it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownConcept`] if no node is assigned `concept`.
    pub fn step_for_concept(&self, concept: ConceptId) -> Result<StepId> {
        self.find_by_concept(concept)
            .map(|item| item.step_id)
            .ok_or(Error::UnknownConcept { concept })
    }

    /// Nodes listing `step` among their parents.
    pub fn children(&self, step: StepId) -> impl Iterator<Item = &WorkflowItem> + '_ {
        self.items.iter().filter(move |item| item.has_parent(step))
    }

    /// Number of nodes listing `step` among their parents.
    #[must_use]
    pub fn child_count(&self, step: StepId) -> usize {
        self.children(step).count()
    }

    /// Group nodes into layers by depth.
    ///
    /// A root is in layer 0; any other node sits one layer below its deepest
    /// parent. Parents that do not exist in the store are ignored, so a node
    /// whose parents are all missing lands in layer 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGraph`] if the node list contains a cycle,
    /// which can only happen after [`set_flat_list`](Self::set_flat_list).
    pub fn layered_view(&self) -> Result<LayeredView<'_>> {
        let levels = self.levels()?;
        let mut layers: LayeredView<'_> = Vec::new();

        for item in &self.items {
            let level = levels.get(&item.step_id).copied().unwrap_or(0);
            if level >= layers.len() {
                layers.resize_with(level + 1, Vec::new);
            }
            layers[level].push(item);
        }

        Ok(layers)
    }

    /// The id the allocator will hand out next.
    #[must_use]
    pub fn next_step_id(&self) -> StepId {
        self.allocator.peek()
    }

    /// Changes recorded since the last drain.
    #[must_use]
    pub fn pending_events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Take all recorded changes.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }

    /// Zero-based depth of every node.
    pub(crate) fn levels(&self) -> Result<HashMap<StepId, usize>> {
        let graph = self.dependency_graph();
        let order = toposort(&graph, None).map_err(|cycle| {
            Error::malformed(format!("node list contains a cycle through {}", cycle.node_id()))
        })?;

        let by_step: HashMap<StepId, &WorkflowItem> =
            self.items.iter().map(|item| (item.step_id, item)).collect();
        let mut levels: HashMap<StepId, usize> = HashMap::with_capacity(order.len());
        for step in order {
            let level = by_step.get(&step).map_or(0, |item| {
                item.real_parents()
                    .filter_map(|parent| levels.get(&parent))
                    .map(|parent_level| parent_level + 1)
                    .max()
                    .unwrap_or(0)
            });
            levels.insert(step, level);
        }

        Ok(levels)
    }

    /// Directed view with an edge from every parent to each of its children.
    ///
    /// Links to parents missing from the store are left out.
    pub(crate) fn dependency_graph(&self) -> DiGraphMap<StepId, ()> {
        let mut graph = DiGraphMap::with_capacity(self.items.len(), self.items.len());
        for item in &self.items {
            graph.add_node(item.step_id);
        }
        for item in &self.items {
            for parent in item.real_parents() {
                if graph.contains_node(parent) {
                    graph.add_edge(parent, item.step_id, ());
                }
            }
        }
        graph
    }

    pub(crate) fn index_of(&self, step: StepId) -> Option<usize> {
        self.items.iter().position(|item| item.step_id == step)
    }

    pub(crate) fn require_index(&self, step: StepId) -> Result<usize> {
        self.index_of(step).ok_or(Error::UnknownStep { step })
    }

    pub(crate) fn emit(&mut self, event: GraphEvent) {
        trace!(target: "conceptdag::graph", event_type = event.kind(), ?event);
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> ConceptGraph {
        // 1 -> 2 -> 3, plus 4 under both 1 and 3
        let mut graph = ConceptGraph::new();
        graph.set_flat_list(vec![
            WorkflowItem::root(StepId(1), 1).with_concept(ConceptId(10)),
            WorkflowItem::child(StepId(2), StepId(1), ConceptId(10), 1).with_concept(ConceptId(20)),
            WorkflowItem::child(StepId(3), StepId(2), ConceptId(20), 1).with_concept(ConceptId(30)),
            {
                let mut item = WorkflowItem::child(StepId(4), StepId(1), ConceptId(10), 2)
                    .with_concept(ConceptId(40));
                item.push_parent(StepId(3), ConceptId(30));
                item
            },
        ])
        .unwrap();
        graph
    }

    fn layer_steps(graph: &ConceptGraph) -> Vec<Vec<u32>> {
        graph
            .layered_view()
            .unwrap()
            .iter()
            .map(|layer| layer.iter().map(|item| item.step_id.0).collect())
            .collect()
    }

    #[test]
    fn test_new_graph_is_empty() {
        let graph = ConceptGraph::new();
        assert!(graph.is_empty());
        assert!(graph.layered_view().unwrap().is_empty());
        assert_eq!(graph.next_step_id(), StepId(1));
    }

    #[test]
    fn test_with_initial_root() {
        let graph = ConceptGraph::with_initial_root();
        assert_eq!(graph.len(), 1);
        let root = &graph.flat_list()[0];
        assert_eq!(root.step_id, StepId(1));
        assert!(root.is_root());
        assert_eq!(root.branch_path, 1);
        assert_eq!(graph.next_step_id(), StepId(2));
    }

    #[test]
    fn test_layer_is_one_below_deepest_parent() {
        let graph = chain();
        assert_eq!(layer_steps(&graph), vec![vec![1], vec![2], vec![3], vec![4]]);
    }

    #[test]
    fn test_child_count() {
        let graph = chain();
        assert_eq!(graph.child_count(StepId(1)), 2);
        assert_eq!(graph.child_count(StepId(3)), 1);
        assert_eq!(graph.child_count(StepId(4)), 0);
        assert_eq!(graph.child_count(StepId::ROOT), 0);
    }

    #[test]
    fn test_lookup_by_concept() {
        let graph = chain();
        assert_eq!(graph.step_for_concept(ConceptId(30)).unwrap(), StepId(3));
        assert_eq!(
            graph.step_for_concept(ConceptId(99)),
            Err(Error::UnknownConcept {
                concept: ConceptId(99)
            })
        );
    }

    #[test]
    fn test_set_flat_list_advances_allocator() {
        let graph = chain();
        assert_eq!(graph.next_step_id(), StepId(5));
    }

    #[test]
    fn test_set_flat_list_rejects_exhausted_id_space() {
        let mut graph = chain();
        let error = graph
            .set_flat_list(vec![WorkflowItem::root(StepId(u32::MAX), 1)])
            .unwrap_err();

        assert!(matches!(error, Error::MalformedGraph { .. }));
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.next_step_id(), StepId(5));
    }

    #[test]
    fn test_dangling_parent_counts_as_absent() {
        let mut graph = ConceptGraph::new();
        graph.set_flat_list(vec![
            WorkflowItem::root(StepId(1), 1),
            WorkflowItem::child(StepId(2), StepId(1), ConceptId(10), 1),
            WorkflowItem::child(StepId(3), StepId(42), ConceptId(99), 1),
        ])
        .unwrap();
        assert_eq!(layer_steps(&graph), vec![vec![1, 3], vec![2]]);
    }

    #[test]
    fn test_cyclic_flat_list_is_malformed() {
        let mut graph = ConceptGraph::new();
        graph.set_flat_list(vec![
            WorkflowItem::child(StepId(1), StepId(2), ConceptId(20), 1).with_concept(ConceptId(10)),
            WorkflowItem::child(StepId(2), StepId(1), ConceptId(10), 1).with_concept(ConceptId(20)),
        ])
        .unwrap();
        assert!(matches!(
            graph.layered_view(),
            Err(Error::MalformedGraph { .. })
        ));
    }

    #[test]
    fn test_drain_events() {
        let mut graph = chain();
        assert_eq!(
            graph.drain_events(),
            vec![GraphEvent::Replaced { node_count: 4 }]
        );
        assert!(graph.pending_events().is_empty());
    }
}
