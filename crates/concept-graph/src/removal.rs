//! Node removal with orphan cascade.
//!
//! A node whose parent list becomes empty is not a root (roots carry the
//! explicit `[0]` sentinel); it is unreachable and is removed as well.

use crate::{ConceptGraph, GraphEvent, Result, StepId};
use std::collections::VecDeque;
use tracing::debug;

impl ConceptGraph {
    /// Remove `step` and every node left without parents as a result.
    ///
    /// Surviving nodes that listed a removed node as one of several parents
    /// keep their remaining parents. Returns the removed step ids, starting
    /// with `step` and then in cascade order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStep`](crate::Error::UnknownStep) if `step`
    /// does not exist.
    pub fn remove_node(&mut self, step: StepId) -> Result<Vec<StepId>> {
        let index = self.require_index(step)?;
        self.items[index].to_be_removed = true;

        let mut removed = vec![step];
        let mut pending = VecDeque::from([step]);
        let mut pruned = Vec::new();

        while let Some(gone) = pending.pop_front() {
            for item in &mut self.items {
                if item.to_be_removed || !item.has_parent(gone) {
                    continue;
                }
                item.remove_parent(gone);
                if item.parent_ids.is_empty() {
                    item.to_be_removed = true;
                    removed.push(item.step_id);
                    pending.push_back(item.step_id);
                } else {
                    pruned.push((item.step_id, gone));
                }
            }
        }

        self.items.retain(|item| !item.to_be_removed);

        // A survivor pruned early may still have been cascaded later.
        for (child, parent) in pruned {
            if self.contains(child) {
                self.emit(GraphEvent::RelationRemoved { child, parent });
            }
        }
        for (position, gone) in removed.iter().enumerate() {
            self.emit(GraphEvent::NodeRemoved {
                step: *gone,
                cascaded: position > 0,
            });
        }

        debug!(
            step = step.0,
            removed = removed.len(),
            remaining = self.items.len(),
            "Removed node"
        );
        Ok(removed)
    }

    /// Remove every node. The step allocator keeps counting.
    pub fn clear(&mut self) {
        let count = self.items.len();
        self.items.clear();
        debug!(removed = count, "Cleared concept graph");
        self.emit(GraphEvent::Cleared);
    }
}
