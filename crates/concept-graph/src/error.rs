//! Error types for concept graph operations.

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use crate::{ConceptId, StepId};
use miette::Diagnostic;
use thiserror::Error;

/// Result type for concept graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing or converting a concept graph.
///
/// Every error is recoverable: a rejected edit leaves the graph exactly as it
/// was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// Linking `parent` as a prerequisite of `child` would close a cycle.
    #[error("Adding {parent} as a parent of {child} would create a cycle")]
    #[diagnostic(
        code(conceptdag::graph::cycle),
        help("{parent} already depends on {child}; pick a concept that is not one of its descendants")
    )]
    CycleDetected {
        /// Node that would receive the new parent.
        child: StepId,
        /// Proposed parent node.
        parent: StepId,
    },

    /// The concept is a prerequisite of another node and cannot be reassigned.
    #[error("{concept} is a prerequisite of another node and cannot be reassigned")]
    #[diagnostic(
        code(conceptdag::graph::locked),
        help("Remove the nodes that depend on this concept first")
    )]
    ConceptAlreadyLocked {
        /// The locked concept.
        concept: ConceptId,
    },

    /// The graph data is structurally invalid.
    #[error("Malformed concept graph: {reason}")]
    #[diagnostic(code(conceptdag::graph::malformed))]
    MalformedGraph {
        /// Description of what is wrong.
        reason: String,
    },

    /// No live node carries the given step id.
    #[error("No node with {step}")]
    #[diagnostic(code(conceptdag::graph::unknown_step))]
    UnknownStep {
        /// The missing step id.
        step: StepId,
    },

    /// No live node is assigned the given concept.
    #[error("No node is assigned {concept}")]
    #[diagnostic(code(conceptdag::graph::unknown_concept))]
    UnknownConcept {
        /// The missing concept.
        concept: ConceptId,
    },

    /// The concept is already assigned to another node.
    #[error("{concept} is already used by another node")]
    #[diagnostic(
        code(conceptdag::graph::duplicate_concept),
        help("A concept may appear at most once per module graph")
    )]
    DuplicateConcept {
        /// The duplicated concept.
        concept: ConceptId,
    },

    /// The parent link already exists.
    #[error("{parent} is already a parent of {child}")]
    #[diagnostic(code(conceptdag::graph::duplicate_relation))]
    DuplicateRelation {
        /// Child node.
        child: StepId,
        /// Existing parent node.
        parent: StepId,
    },

    /// The parent link to remove does not exist.
    #[error("{parent} is not a parent of {child}")]
    #[diagnostic(code(conceptdag::graph::missing_relation))]
    MissingRelation {
        /// Child node.
        child: StepId,
        /// Node that is not a parent of `child`.
        parent: StepId,
    },

    /// Removing the link would leave a non-root node with no parents.
    #[error("Cannot remove the last parent of {child}")]
    #[diagnostic(
        code(conceptdag::graph::last_parent),
        help("Remove the node itself instead, which also removes its orphaned descendants")
    )]
    LastParentRelation {
        /// Child node.
        child: StepId,
    },

    /// The node has no concept assigned yet.
    #[error("{step} has no concept assigned")]
    #[diagnostic(
        code(conceptdag::graph::unassigned),
        help("Select a concept for the node before using it as a parent or saving")
    )]
    ConceptUnassigned {
        /// The node without a concept.
        step: StepId,
    },
}

impl Error {
    /// Create a malformed graph error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedGraph {
            reason: reason.into(),
        }
    }
}
