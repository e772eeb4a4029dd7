//! Graph change events.
//!
//! Every structural edit records one or more [`GraphEvent`]s on the graph. A
//! rendering layer drains them with [`ConceptGraph::drain_events`] and redraws
//! whatever changed; nothing flows back from the renderer into the graph.
//!
//! [`ConceptGraph::drain_events`]: crate::ConceptGraph::drain_events

use crate::{ConceptId, StepId};
use serde::{Deserialize, Serialize};

/// A discrete change to the concept graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum GraphEvent {
    /// A node was created.
    NodeAdded {
        /// The new node.
        step: StepId,
        /// Its parent ids (`[0]` for roots).
        parents: Vec<StepId>,
        /// Its branch path.
        branch_path: u32,
    },
    /// A node was given a concept.
    ConceptAssigned {
        /// The node.
        step: StepId,
        /// The concept now assigned.
        concept: ConceptId,
    },
    /// A parent link was added.
    RelationAdded {
        /// Child node.
        child: StepId,
        /// New parent.
        parent: StepId,
    },
    /// A parent link was removed, directly or while pruning a removed node.
    RelationRemoved {
        /// Child node.
        child: StepId,
        /// Former parent.
        parent: StepId,
    },
    /// A node was removed.
    NodeRemoved {
        /// The removed node.
        step: StepId,
        /// Whether it was removed because it lost its last parent.
        cascaded: bool,
    },
    /// The whole node list was replaced (bulk load or external rewrite).
    Replaced {
        /// Number of nodes after replacement.
        node_count: usize,
    },
    /// Every node was removed.
    Cleared,
}

impl GraphEvent {
    /// Short machine-readable name of the event.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NodeAdded { .. } => "node.added",
            Self::ConceptAssigned { .. } => "concept.assigned",
            Self::RelationAdded { .. } => "relation.added",
            Self::RelationRemoved { .. } => "relation.removed",
            Self::NodeRemoved { .. } => "node.removed",
            Self::Replaced { .. } => "graph.replaced",
            Self::Cleared => "graph.cleared",
        }
    }
}
