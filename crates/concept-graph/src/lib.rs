//! Concept prerequisite graph for conceptdag.
//!
//! This crate maintains a directed acyclic graph (DAG) of curriculum concepts,
//! where each node ("workflow item") names the concepts it depends on. Nodes live
//! in a flat arena and refer to their parents by [`StepId`], which keeps the graph
//! free of owning cycles and trivially serializable.
//!
//! # Key Types
//!
//! - [`ConceptGraph`]: the graph store plus every structural edit
//! - [`WorkflowItem`]: a node in the graph
//! - [`StepAllocator`]: issues step identifiers for new nodes
//! - [`PersistedConcept`]: the level-annotated record handed to storage
//! - [`GraphEvent`]: change notifications for rendering layers
//!
//! # Example
//!
//! ```ignore
//! use conceptdag_graph::{ConceptGraph, ConceptId, ModuleId};
//!
//! let mut graph = ConceptGraph::with_initial_root();
//! let root = graph.flat_list()[0].step_id;
//! graph.assign_concept(root, ConceptId(10))?;
//!
//! let child = graph.add_child_node(root)?;
//! graph.assign_concept(child, ConceptId(11))?;
//!
//! let records = graph.to_persisted_list(ModuleId(1))?;
//! assert_eq!(records[1].level, 2);
//! ```

mod allocator;
mod error;
mod events;
mod ids;
mod item;
mod locks;
mod relations;
mod removal;
mod serializer;
mod store;
mod validation;

pub use allocator::StepAllocator;
pub use error::{Error, Result};
pub use events::GraphEvent;
pub use ids::{ConceptId, ModuleId, RecordId, StepId};
pub use item::WorkflowItem;
pub use serializer::{DanglingParentPolicy, ParentRecord, PersistedConcept};
pub use store::{ConceptGraph, LayeredView};
pub use validation::ValidationResult;
