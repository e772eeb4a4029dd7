//! Editing sessions over one module's concept graph.

use crate::{Concept, ConceptCatalog, ModuleRepository, Result, SaveSummary, SessionConfig};
use conceptdag_graph::{ConceptGraph, DanglingParentPolicy, ModuleId};
use tracing::{info, instrument};

/// One module opened for editing.
///
/// The graph itself is edited synchronously through [`graph_mut`](Self::graph_mut);
/// only [`open`](Self::open), [`reload`](Self::reload) and [`save`](Self::save)
/// talk to the repository.
#[derive(Debug)]
pub struct ModuleSession<R> {
    module: ModuleId,
    graph: ConceptGraph,
    repository: R,
    dangling_parents: DanglingParentPolicy,
}

impl<R: ModuleRepository> ModuleSession<R> {
    /// Open `module`.
    ///
    /// Stored records are reconstructed into a graph. A module with nothing
    /// stored starts as a fresh graph holding a single root node.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the stored records are malformed
    /// under the configured dangling-parent policy.
    #[instrument(skip_all, fields(module = module.0))]
    pub async fn open(repository: R, module: ModuleId, config: &SessionConfig) -> Result<Self> {
        let dangling_parents = config.graph.dangling_parents;
        let graph = Self::load_graph(&repository, module, dangling_parents).await?;
        info!(nodes = graph.len(), "Opened module session");

        Ok(Self {
            module,
            graph,
            repository,
            dangling_parents,
        })
    }

    async fn load_graph(
        repository: &R,
        module: ModuleId,
        policy: DanglingParentPolicy,
    ) -> Result<ConceptGraph> {
        let records = repository.load(module).await?;
        if records.is_empty() {
            return Ok(ConceptGraph::with_initial_root());
        }
        Ok(ConceptGraph::from_persisted_list(&records, policy)?)
    }

    /// The module being edited.
    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module
    }

    /// The graph being edited.
    #[must_use]
    pub fn graph(&self) -> &ConceptGraph {
        &self.graph
    }

    /// Mutable access to the graph for edits.
    pub fn graph_mut(&mut self) -> &mut ConceptGraph {
        &mut self.graph
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Catalog concepts not yet used by any node, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    pub async fn selectable_concepts<C: ConceptCatalog>(&self, catalog: &C) -> Result<Vec<Concept>> {
        let used = self.graph.used_concepts();
        Ok(catalog
            .concepts()
            .await?
            .into_iter()
            .filter(|concept| !used.contains(&concept.id))
            .collect())
    }

    /// Persist the graph.
    ///
    /// Storage ids issued to new records are copied back onto the graph so the
    /// next save updates them.
    ///
    /// # Errors
    ///
    /// Returns an error if some node has no concept or the repository fails.
    #[instrument(skip_all, fields(module = self.module.0))]
    pub async fn save(&mut self) -> Result<SaveSummary> {
        let records = self.graph.to_persisted_list(self.module)?;
        let (stored, summary) = self.repository.save(self.module, records).await?;
        self.graph.apply_record_ids(&stored);
        info!(?summary, "Saved module session");
        Ok(summary)
    }

    /// Discard unsaved edits and reload from the repository.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    #[instrument(skip_all, fields(module = self.module.0))]
    pub async fn reload(&mut self) -> Result<()> {
        self.graph = Self::load_graph(&self.repository, self.module, self.dangling_parents).await?;
        info!(nodes = self.graph.len(), "Reloaded module session");
        Ok(())
    }

    /// Close the session, returning the repository.
    pub fn into_repository(self) -> R {
        self.repository
    }
}
