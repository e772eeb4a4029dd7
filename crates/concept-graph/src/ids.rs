//! Identifier newtypes used throughout the graph.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node within one graph instance.
///
/// Step ids are issued by the [`StepAllocator`](crate::StepAllocator) and are
/// never reused while the node is alive. The value `0` is reserved for
/// [`StepId::ROOT`], the sentinel parent of root nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub u32);

impl StepId {
    /// Sentinel parent id marking a node as a root.
    pub const ROOT: Self = Self(0);

    /// Whether this is the root sentinel rather than a real node.
    #[must_use]
    pub fn is_root_sentinel(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step#{}", self.0)
    }
}

/// Identifier of a catalog concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u64);

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "concept#{}", self.0)
    }
}

/// Identifier of the curriculum module a graph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Storage identifier of a persisted concept-module record.
///
/// Present on records that already exist in storage, absent on new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "record#{}", self.0)
    }
}
