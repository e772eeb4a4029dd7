//! Module repositories: where persisted concept records live.
//!
//! A save replaces the stored record set of a module. Records carrying an `id`
//! update the stored record with that id, records without one are inserted
//! under a freshly issued id, and stored records missing from the new set are
//! deleted.

use crate::{Error, Result, StorageSettings};
use async_trait::async_trait;
use conceptdag_graph::{ModuleId, PersistedConcept, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Outcome of a save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    /// Records stored under a new id.
    pub inserted: usize,
    /// Records that replaced an existing one.
    pub updated: usize,
    /// Previously stored records no longer present.
    pub deleted: usize,
}

/// Storage collaborator for persisted concept records.
#[async_trait]
pub trait ModuleRepository: Send + Sync {
    /// Load the records of `module`, ordered by ascending level.
    ///
    /// A module that was never saved yields an empty list.
    async fn load(&self, module: ModuleId) -> Result<Vec<PersistedConcept>>;

    /// Replace the records of `module`.
    ///
    /// Returns the stored records, every one now carrying an id, together with
    /// a summary of what changed.
    async fn save(
        &self,
        module: ModuleId,
        records: Vec<PersistedConcept>,
    ) -> Result<(Vec<PersistedConcept>, SaveSummary)>;
}

/// Merge `incoming` over `existing`, issuing ids to new records.
fn merge_records(
    existing: &[PersistedConcept],
    mut incoming: Vec<PersistedConcept>,
) -> (Vec<PersistedConcept>, SaveSummary) {
    let known: HashSet<RecordId> = existing.iter().filter_map(|r| r.id).collect();
    let mut next_id = known.iter().map(|id| id.0).max().unwrap_or(0) + 1;
    let mut summary = SaveSummary::default();
    let mut kept = HashSet::new();

    for record in &mut incoming {
        match record.id {
            Some(id) if known.contains(&id) => {
                summary.updated += 1;
                kept.insert(id);
            }
            _ => {
                record.id = Some(RecordId(next_id));
                next_id += 1;
                summary.inserted += 1;
            }
        }
    }
    summary.deleted = known.len() - kept.len();

    (incoming, summary)
}

fn sort_by_level(records: &mut [PersistedConcept]) {
    records.sort_by_key(|record| record.level);
}

/// Repository keeping every module in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    modules: RwLock<HashMap<ModuleId, Vec<PersistedConcept>>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository pre-populated with `records` for `module`.
    #[must_use]
    pub fn with_module(module: ModuleId, records: Vec<PersistedConcept>) -> Self {
        Self {
            modules: RwLock::new(HashMap::from([(module, records)])),
        }
    }
}

#[async_trait]
impl ModuleRepository for InMemoryRepository {
    async fn load(&self, module: ModuleId) -> Result<Vec<PersistedConcept>> {
        let mut records = self
            .modules
            .read()
            .await
            .get(&module)
            .cloned()
            .unwrap_or_default();
        sort_by_level(&mut records);
        debug!(module = module.0, records = records.len(), "Loaded module from memory");
        Ok(records)
    }

    async fn save(
        &self,
        module: ModuleId,
        records: Vec<PersistedConcept>,
    ) -> Result<(Vec<PersistedConcept>, SaveSummary)> {
        let mut modules = self.modules.write().await;
        let existing = modules.get(&module).map(Vec::as_slice).unwrap_or_default();
        let (stored, summary) = merge_records(existing, records);
        modules.insert(module, stored.clone());
        info!(module = module.0, ?summary, "Saved module to memory");
        Ok((stored, summary))
    }
}

/// Repository storing each module as `module-<id>.json` in a directory.
///
/// Saves through one repository (or its clones) are serialized, and each file
/// is replaced atomically by writing a temporary file and renaming it.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    directory: PathBuf,
    save_lock: Arc<Mutex<()>>,
}

impl JsonFileRepository {
    /// Create a repository rooted at `directory`. The directory is created on
    /// first save.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create a repository rooted at the configured storage directory.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.directory.clone())
    }

    /// The directory module files are stored in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file holding `module`.
    #[must_use]
    pub fn module_path(&self, module: ModuleId) -> PathBuf {
        self.directory.join(format!("module-{}.json", module.0))
    }

    async fn read(&self, module: ModuleId) -> Result<Vec<PersistedConcept>> {
        let path = self.module_path(module);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::io(e, &path, "read")),
        }
    }

    async fn write(&self, path: &Path, records: &[PersistedConcept]) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Error::io(e, &self.directory, "create_dir_all"))?;

        let content = serde_json::to_vec_pretty(records)?;
        let tmp_path = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| Error::io(e, &tmp_path, "create"))?;
        file.write_all(&content)
            .await
            .map_err(|e| Error::io(e, &tmp_path, "write"))?;
        file.sync_all()
            .await
            .map_err(|e| Error::io(e, &tmp_path, "sync"))?;
        drop(file);

        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| Error::io(e, path, "rename"))
    }
}

#[async_trait]
impl ModuleRepository for JsonFileRepository {
    async fn load(&self, module: ModuleId) -> Result<Vec<PersistedConcept>> {
        let mut records = self.read(module).await?;
        sort_by_level(&mut records);
        debug!(
            module = module.0,
            records = records.len(),
            path = %self.module_path(module).display(),
            "Loaded module file"
        );
        Ok(records)
    }

    async fn save(
        &self,
        module: ModuleId,
        records: Vec<PersistedConcept>,
    ) -> Result<(Vec<PersistedConcept>, SaveSummary)> {
        let _guard = self.save_lock.lock().await;
        let existing = self.read(module).await?;
        let (stored, summary) = merge_records(&existing, records);

        let path = self.module_path(module);
        self.write(&path, &stored).await?;

        info!(module = module.0, ?summary, path = %path.display(), "Saved module file");
        Ok((stored, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conceptdag_graph::{ConceptId, StepId};

    fn record(id: Option<u64>, concept: u64, level: u32) -> PersistedConcept {
        PersistedConcept {
            id: id.map(RecordId),
            concept_id: ConceptId(concept),
            node_id: StepId(0),
            module_id: ModuleId(1),
            level,
            parent_concept_ids: vec![],
            parent_records: vec![],
        }
    }

    #[test]
    fn test_merge_records() {
        let existing = vec![record(Some(1), 10, 1), record(Some(2), 20, 2)];
        let incoming = vec![record(Some(1), 10, 1), record(None, 30, 2)];

        let (stored, summary) = merge_records(&existing, incoming);
        assert_eq!(
            summary,
            SaveSummary {
                inserted: 1,
                updated: 1,
                deleted: 1
            }
        );
        assert_eq!(stored[1].id, Some(RecordId(3)));
    }

    #[test]
    fn test_unknown_id_is_inserted() {
        let (stored, summary) = merge_records(&[], vec![record(Some(42), 10, 1)]);
        assert_eq!(summary.inserted, 1);
        assert_eq!(stored[0].id, Some(RecordId(1)));
    }

    #[tokio::test]
    async fn test_in_memory_load_sorts_by_level() {
        let repo = InMemoryRepository::with_module(
            ModuleId(1),
            vec![record(Some(2), 20, 2), record(Some(1), 10, 1)],
        );
        let loaded = repo.load(ModuleId(1)).await.unwrap();
        let levels: Vec<u32> = loaded.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![1, 2]);
        assert!(repo.load(ModuleId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("modules"));

        assert!(repo.load(ModuleId(5)).await.unwrap().is_empty());

        let (stored, summary) = repo
            .save(ModuleId(5), vec![record(None, 10, 1), record(None, 20, 2)])
            .await
            .unwrap();
        assert_eq!(summary.inserted, 2);
        assert!(repo.module_path(ModuleId(5)).exists());

        let loaded = repo.load(ModuleId(5)).await.unwrap();
        assert_eq!(loaded, stored);

        let (_, summary) = repo.save(ModuleId(5), vec![loaded[0].clone()]).await.unwrap();
        assert_eq!(
            summary,
            SaveSummary {
                inserted: 0,
                updated: 1,
                deleted: 1
            }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_issue_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());

        for round in 0..20 {
            let module = ModuleId(round);
            let first = repo.clone();
            let second = repo.clone();
            let (a, b) = tokio::join!(
                first.save(module, vec![record(None, 10, 1)]),
                second.save(module, vec![record(None, 20, 1)]),
            );
            let (a, _) = a.unwrap();
            let (b, _) = b.unwrap();
            assert_ne!(a[0].id, b[0].id);

            let loaded = repo.load(module).await.unwrap();
            assert!(loaded == a || loaded == b);
        }

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let settings = StorageSettings {
            directory: PathBuf::from("/srv/concepts"),
        };
        let repo = JsonFileRepository::from_settings(&settings);
        assert_eq!(
            repo.module_path(ModuleId(3)),
            PathBuf::from("/srv/concepts/module-3.json")
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path());
        std::fs::write(repo.module_path(ModuleId(1)), "{ not json").unwrap();

        let error = repo.load(ModuleId(1)).await.unwrap_err();
        assert!(matches!(error, Error::Serialization { .. }));
    }
}
