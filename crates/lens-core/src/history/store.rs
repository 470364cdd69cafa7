//! Project history store.
//!
//! Owns the ledger of saved projects and its persisted encoding. The ledger is
//! kept in memory, most recent first, and written back to the storage port as
//! one JSON array after every change.

use std::collections::HashSet;
use std::sync::Arc;

use super::model::SavedProject;
use super::storage::{HISTORY_STORAGE_KEY, KeyValueStore};
use crate::clock::Clock;
use crate::error::{LensError, Result};
use crate::session::Session;

/// Whether a history write reached the persistent medium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    /// The full ledger was written.
    Persisted,
    /// The medium had no room; only the in-memory ledger changed.
    StorageFull,
    /// The medium failed for another reason; only the in-memory ledger changed.
    Failed(String),
}

/// Result of an operation that changed the ledger.
///
/// The in-memory effect has always been applied when this is returned;
/// `durability` says whether it also survived to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct WriteOutcome<T> {
    pub value: T,
    pub durability: Durability,
}

impl<T> WriteOutcome<T> {
    pub fn is_durable(&self) -> bool {
        self.durability == Durability::Persisted
    }

    /// The error to surface when the write did not persist.
    pub fn persistence_error(&self) -> Option<LensError> {
        match &self.durability {
            Durability::Persisted => None,
            Durability::StorageFull => Some(LensError::storage_full(
                "history ledger exceeds storage capacity",
            )),
            Durability::Failed(message) => Some(LensError::io(message.clone())),
        }
    }
}

/// Durable save/list/load/delete of completed sessions.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    /// Most recent first.
    ledger: Vec<SavedProject>,
    /// Every id minted by this store, including ones deleted since.
    issued_ids: HashSet<String>,
    sequence: u64,
    /// Set when the stored ledger could not be read; writes are skipped so the
    /// unread history is not overwritten.
    read_failure: Option<String>,
}

impl HistoryStore {
    /// Loads the ledger from `storage`.
    ///
    /// Never fails: a missing payload gives an empty ledger, a corrupt payload
    /// is logged, cleared from the medium and replaced by an empty ledger, and
    /// an unreadable medium is logged and treated as empty. In the last case
    /// the store stays in memory only: later changes report
    /// `Durability::Failed` and leave the medium alone.
    pub fn initialize(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (ledger, read_failure) = match storage.get(HISTORY_STORAGE_KEY) {
            Ok(payload) => (Self::decode_ledger(storage.as_ref(), payload), None),
            Err(e) => {
                tracing::warn!(
                    "[History] Failed to read history, keeping changes in memory: {}",
                    e
                );
                (Vec::new(), Some(e.to_string()))
            }
        };
        tracing::debug!("[History] Loaded {} saved project(s)", ledger.len());
        Self {
            storage,
            clock,
            ledger,
            issued_ids: HashSet::new(),
            sequence: 0,
            read_failure,
        }
    }

    fn decode_ledger(storage: &dyn KeyValueStore, payload: Option<String>) -> Vec<SavedProject> {
        let Some(payload) = payload else {
            return Vec::new();
        };

        match serde_json::from_str::<Vec<SavedProject>>(&payload) {
            Ok(ledger) => ledger,
            Err(e) => {
                let corrupt = LensError::StorageCorrupt(e.to_string());
                tracing::warn!("[History] Discarding stored history: {}", corrupt);
                if let Err(e) = storage.remove(HISTORY_STORAGE_KEY) {
                    tracing::warn!("[History] Failed to clear corrupt history: {}", e);
                }
                Vec::new()
            }
        }
    }

    /// Saves a snapshot of `session` at the head of the ledger.
    ///
    /// # Errors
    ///
    /// Returns `LensError::EmptySession` (ledger unchanged) when the session
    /// has no concepts. Persistence failures are not errors; they are
    /// reported through [`WriteOutcome::durability`].
    pub fn save(&mut self, session: &Session) -> Result<WriteOutcome<SavedProject>> {
        if !session.has_concepts() {
            return Err(LensError::EmptySession);
        }

        let timestamp = self.clock.now_ms();
        let project = SavedProject {
            id: self.next_project_id(timestamp),
            timestamp,
            product: session.product.clone(),
            concepts: session.concepts.clone(),
            grounding_sources: session.grounding_sources.clone(),
        };

        self.ledger.insert(0, project.clone());
        tracing::info!(
            "[History] Saved project {} ({} concepts)",
            project.id,
            project.concepts.len()
        );

        let durability = self.persist();
        Ok(WriteOutcome {
            value: project,
            durability,
        })
    }

    /// All saved projects, most recent first.
    pub fn list(&self) -> &[SavedProject] {
        &self.ledger
    }

    pub fn get(&self, id: &str) -> Option<&SavedProject> {
        self.ledger.iter().find(|project| project.id == id)
    }

    /// Returns a copy of the project with `id`.
    pub fn load(&self, id: &str) -> Result<SavedProject> {
        self.get(id)
            .cloned()
            .ok_or_else(|| LensError::not_found("project", id))
    }

    /// Removes the project with `id`, if present, and persists the ledger.
    ///
    /// Deleting an unknown id is a no-op that reports `None`.
    pub fn delete(&mut self, id: &str) -> WriteOutcome<Option<SavedProject>> {
        let removed = self
            .ledger
            .iter()
            .position(|project| project.id == id)
            .map(|index| self.ledger.remove(index));

        match &removed {
            Some(project) => tracing::info!("[History] Deleted project {}", project.id),
            None => tracing::debug!("[History] Delete ignored, no project {}", id),
        }

        let durability = self.persist();
        WriteOutcome {
            value: removed,
            durability,
        }
    }

    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Mints `project-{timestamp}`, suffixed with a sequence number when that
    /// id is already taken or was issued earlier by this store.
    fn next_project_id(&mut self, timestamp: i64) -> String {
        let base = format!("project-{timestamp}");
        let mut candidate = base.clone();
        while self.issued_ids.contains(&candidate) || self.get(&candidate).is_some() {
            self.sequence += 1;
            candidate = format!("{base}-{}", self.sequence);
        }
        self.issued_ids.insert(candidate.clone());
        candidate
    }

    fn persist(&self) -> Durability {
        if let Some(reason) = &self.read_failure {
            tracing::warn!("[History] Not writing history that could not be read: {}", reason);
            return Durability::Failed(format!("history could not be read: {reason}"));
        }

        let payload = match serde_json::to_string(&self.ledger) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("[History] Failed to serialize history: {}", e);
                return Durability::Failed(e.to_string());
            }
        };

        match self.storage.set(HISTORY_STORAGE_KEY, &payload) {
            Ok(()) => Durability::Persisted,
            Err(LensError::StorageFull(message)) => {
                tracing::warn!("[History] Storage limit exceeded: {}", message);
                Durability::StorageFull
            }
            Err(e) => {
                tracing::error!("[History] Failed to persist history: {}", e);
                Durability::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::{Concept, GroundingSource};
    use crate::product::ProductDescriptor;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
        capacity: Option<usize>,
        unreadable: bool,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            if self.unreadable {
                return Err(LensError::io("permission denied"));
            }
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.capacity.is_some_and(|capacity| value.len() > capacity) {
                return Err(LensError::storage_full("quota exceeded"));
            }
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            self.0
        }
    }

    fn concept(index: usize) -> Concept {
        Concept {
            id: format!("concept-1-{index}"),
            category: "Situational Action".to_string(),
            title: format!("Title {index}"),
            description: "description".to_string(),
            prompt: "prompt".to_string(),
        }
    }

    fn session_named(name: &str) -> Session {
        Session {
            product: ProductDescriptor {
                name: name.to_string(),
                ..Default::default()
            },
            concepts: (0..5).map(concept).collect(),
            grounding_sources: vec![GroundingSource {
                title: Some("Shop".to_string()),
                uri: Some("https://shop.example".to_string()),
            }],
            refinement: String::new(),
        }
    }

    fn store_with(storage: Arc<MemoryStore>, now: i64) -> HistoryStore {
        HistoryStore::initialize(storage, Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_initialize_empty_medium() {
        let store = store_with(Arc::new(MemoryStore::default()), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_prepends() {
        let mut store = store_with(Arc::new(MemoryStore::default()), 1_000);
        let first = store.save(&session_named("Lamp")).unwrap().value;
        let second = store.save(&session_named("Chair")).unwrap().value;

        let ids: Vec<_> = store.list().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(store.list()[0].product.name, "Chair");
    }

    #[test]
    fn test_same_millisecond_saves_get_distinct_ids() {
        let mut store = store_with(Arc::new(MemoryStore::default()), 42);
        for _ in 0..10 {
            assert!(store.save(&session_named("Lamp")).unwrap().is_durable());
        }
        let ids: HashSet<_> = store.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 10);
        assert!(ids.contains("project-42"));
        assert!(ids.contains("project-42-1"));
    }

    #[test]
    fn test_ids_stay_unique_after_delete() {
        let mut store = store_with(Arc::new(MemoryStore::default()), 7);
        let first = store.save(&session_named("Lamp")).unwrap().value;
        let _ = store.delete(&first.id);
        let second = store.save(&session_named("Lamp")).unwrap().value;
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_save_empty_session_is_rejected() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = store_with(storage.clone(), 1);
        let err = store.save(&Session::new()).unwrap_err();
        assert_eq!(err, LensError::EmptySession);
        assert!(store.is_empty());
        assert!(storage.get(HISTORY_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_delete_preserves_order_of_rest() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = store_with(storage, 5);
        let a = store.save(&session_named("A")).unwrap().value;
        let b = store.save(&session_named("B")).unwrap().value;
        let c = store.save(&session_named("C")).unwrap().value;

        let outcome = store.delete(&b.id);
        assert_eq!(outcome.value.map(|p| p.id), Some(b.id));
        let ids: Vec<_> = store.list().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![c.id, a.id]);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = store_with(Arc::new(MemoryStore::default()), 5);
        store.save(&session_named("A")).unwrap();
        let before = store.list().to_vec();

        let outcome = store.delete("project-missing");
        assert!(outcome.value.is_none());
        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let store = store_with(Arc::new(MemoryStore::default()), 5);
        assert!(store.load("project-404").unwrap_err().is_not_found());
    }

    #[test]
    fn test_saved_copy_is_independent_of_live_session() {
        let mut store = store_with(Arc::new(MemoryStore::default()), 5);
        let mut session = session_named("Lamp");
        let saved = store.save(&session).unwrap().value;

        session.product.name = "Renamed".to_string();
        session.concepts.clear();

        let loaded = store.load(&saved.id).unwrap();
        assert_eq!(loaded.product.name, "Lamp");
        assert_eq!(loaded.concepts.len(), 5);
    }

    #[test]
    fn test_storage_full_keeps_in_memory_entry() {
        let storage = Arc::new(MemoryStore {
            capacity: Some(16),
            ..Default::default()
        });
        let mut store = store_with(storage.clone(), 5);

        let outcome = store.save(&session_named("Lamp")).unwrap();
        assert_eq!(outcome.durability, Durability::StorageFull);
        assert!(outcome.persistence_error().unwrap().is_storage_full());
        assert_eq!(store.len(), 1);
        assert!(storage.get(HISTORY_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_payload_self_heals() {
        let storage = Arc::new(MemoryStore::default());
        storage
            .set(HISTORY_STORAGE_KEY, "[{\"id\": \"project-1\", \"timesta")
            .unwrap();

        let store = store_with(storage.clone(), 5);
        assert!(store.is_empty());
        assert!(storage.get(HISTORY_STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_medium_is_never_overwritten() {
        let storage = Arc::new(MemoryStore {
            unreadable: true,
            ..Default::default()
        });
        storage
            .values
            .lock()
            .unwrap()
            .insert(HISTORY_STORAGE_KEY.to_string(), "[\"older history\"]".to_string());
        let mut store = store_with(storage.clone(), 5);
        assert!(store.is_empty());

        let saved = store.save(&session_named("Lamp")).unwrap();
        assert!(matches!(saved.durability, Durability::Failed(_)));
        assert_eq!(store.len(), 1);

        let deleted = store.delete("project-missing");
        assert!(matches!(deleted.durability, Durability::Failed(_)));

        let stored = storage.values.lock().unwrap().get(HISTORY_STORAGE_KEY).cloned();
        assert_eq!(stored.as_deref(), Some("[\"older history\"]"));
    }

    #[test]
    fn test_round_trip_through_medium() {
        let storage = Arc::new(MemoryStore::default());
        let mut store = store_with(storage.clone(), 1_718_000_000_000);
        let saved = store.save(&session_named("Lamp")).unwrap().value;

        let reopened = store_with(storage, 1);
        assert_eq!(reopened.list(), &[saved]);
    }
}
