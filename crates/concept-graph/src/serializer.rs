//! Conversion between the live graph and level-ordered persisted records.
//!
//! Records are emitted parents-first: level 1 holds the roots, and each record
//! carries back-references to the already-emitted records of its parents.
//! Reconstruction relies on the same ordering.

use crate::{
    ConceptGraph, ConceptId, Error, GraphEvent, ModuleId, RecordId, Result, StepId, WorkflowItem,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One concept of a module as handed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedConcept {
    /// Storage id; absent for records that have not been stored yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// The concept this record places in the module.
    pub concept_id: ConceptId,
    /// Step id of the node at the time it was emitted.
    pub node_id: StepId,
    /// Owning module.
    pub module_id: ModuleId,
    /// 1-based depth; roots are level 1.
    pub level: u32,
    /// Concepts of the node's parents.
    #[serde(default)]
    pub parent_concept_ids: Vec<ConceptId>,
    /// Back-references to the parent records.
    #[serde(default)]
    pub parent_records: Vec<ParentRecord>,
}

/// Lightweight reference from a record to one of its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRecord {
    /// Parent concept.
    pub concept_id: ConceptId,
    /// Parent's module.
    pub module_id: ModuleId,
    /// Parent's level.
    pub level: u32,
}

/// What to do when a record names a parent concept that no earlier record
/// introduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DanglingParentPolicy {
    /// Fail with [`Error::MalformedGraph`].
    #[default]
    Reject,
    /// Drop the reference and log a warning. A record left without any
    /// resolvable parent is dropped too, and so are its descendants.
    Skip,
}

impl ConceptGraph {
    /// Convert the graph into level-ordered records for `module`.
    ///
    /// Within a level, records follow the order of the flat list.
    ///
    /// # Errors
    ///
    /// - [`Error::ConceptUnassigned`] if some node has no concept
    /// - [`Error::MalformedGraph`] if the node list contains a cycle
    pub fn to_persisted_list(&self, module: ModuleId) -> Result<Vec<PersistedConcept>> {
        if let Some(item) = self.items.iter().find(|item| item.concept_id.is_none()) {
            return Err(Error::ConceptUnassigned {
                step: item.step_id,
            });
        }

        let layers = self.layered_view()?;
        let mut records: Vec<PersistedConcept> = Vec::with_capacity(self.items.len());

        for (depth, layer) in layers.iter().enumerate() {
            let level = u32::try_from(depth + 1)
                .map_err(|_| Error::malformed("graph is deeper than u32::MAX levels"))?;
            for item in layer {
                let Some(concept_id) = item.concept_id else {
                    continue;
                };
                let parent_records = records
                    .iter()
                    .filter(|record| item.parent_concept_ids.contains(&record.concept_id))
                    .map(|record| ParentRecord {
                        concept_id: record.concept_id,
                        module_id: record.module_id,
                        level: record.level,
                    })
                    .collect();

                records.push(PersistedConcept {
                    id: item.record_id,
                    concept_id,
                    node_id: item.step_id,
                    module_id: module,
                    level,
                    parent_concept_ids: item.parent_concept_ids.clone(),
                    parent_records,
                });
            }
        }

        debug!(
            module = module.0,
            records = records.len(),
            levels = layers.len(),
            "Serialized concept graph"
        );
        Ok(records)
    }

    /// Rebuild a graph from level-ordered records.
    ///
    /// Step ids are reissued from `1` in record order. Branch paths restart at
    /// `1` whenever the level increases. Parent ids are sorted descending.
    ///
    /// # Errors
    ///
    /// Under [`DanglingParentPolicy::Reject`], returns
    /// [`Error::MalformedGraph`] if a record repeats an earlier concept or
    /// names a parent concept no earlier record introduced.
    pub fn from_persisted_list(
        records: &[PersistedConcept],
        policy: DanglingParentPolicy,
    ) -> Result<Self> {
        let mut graph = Self::new();
        graph.allocator.set_next_number(1);

        let mut current_level = 0;
        let mut branch_path = 0;

        for record in records {
            if graph.find_by_concept(record.concept_id).is_some() {
                let reason = format!("{} appears more than once", record.concept_id);
                match policy {
                    DanglingParentPolicy::Reject => return Err(Error::malformed(reason)),
                    DanglingParentPolicy::Skip => {
                        warn!(concept = record.concept_id.0, "Skipping record: {reason}");
                        continue;
                    }
                }
            }

            let mut parents: Vec<(StepId, ConceptId)> =
                Vec::with_capacity(record.parent_records.len());
            for parent in &record.parent_records {
                if let Some(node) = graph.find_by_concept(parent.concept_id) {
                    parents.push((node.step_id, parent.concept_id));
                    continue;
                }
                let reason = format!(
                    "{} names parent {} which no earlier record introduces",
                    record.concept_id, parent.concept_id
                );
                match policy {
                    DanglingParentPolicy::Reject => return Err(Error::malformed(reason)),
                    DanglingParentPolicy::Skip => {
                        warn!(
                            concept = record.concept_id.0,
                            parent = parent.concept_id.0,
                            "Dropping dangling parent reference"
                        );
                    }
                }
            }
            if parents.is_empty() && !record.parent_records.is_empty() {
                warn!(
                    concept = record.concept_id.0,
                    "Dropping record with no resolvable parent"
                );
                continue;
            }

            // Branch paths count surviving nodes only.
            if record.level > current_level {
                current_level = record.level;
                branch_path = 1;
            } else {
                branch_path += 1;
            }

            let mut item = WorkflowItem::root(graph.allocator.allocate()?, branch_path)
                .with_concept(record.concept_id);
            if !parents.is_empty() {
                parents.sort_by(|a, b| b.0.cmp(&a.0));
                parents.dedup_by_key(|(step, _)| *step);
                item.parent_ids = parents.iter().map(|(step, _)| *step).collect();
                item.parent_concept_ids = parents.iter().map(|(_, concept)| *concept).collect();
            }
            item.record_id = record.id;
            graph.items.push(item);
        }

        debug!(
            records = records.len(),
            nodes = graph.items.len(),
            locked = graph.locked_concepts().len(),
            "Reconstructed concept graph"
        );
        graph.emit(GraphEvent::Replaced {
            node_count: graph.items.len(),
        });
        Ok(graph)
    }

    /// Copy storage ids from saved records onto the nodes carrying the same
    /// concepts, so the next save updates instead of inserting.
    pub fn apply_record_ids(&mut self, records: &[PersistedConcept]) {
        for record in records {
            let Some(id) = record.id else {
                continue;
            };
            if let Some(item) = self
                .items
                .iter_mut()
                .find(|item| item.concept_id == Some(record.concept_id))
            {
                item.record_id = Some(id);
            }
        }
    }
}
