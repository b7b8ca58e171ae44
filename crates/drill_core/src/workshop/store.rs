use super::error::{StorageError, StoreError};
use super::storage::KeyValueStore;
use super::types::{normalize_name, NewWorkshop, Workshop};
use crate::difficulty::Difficulty;
use chrono::Utc;
use std::sync::{Mutex, PoisonError};

/// Storage key of the workshop collection
pub const DEFAULT_STORAGE_KEY: &str = "futsal-workshops";

/// CRUD over the persisted workshop collection.
///
/// The whole collection lives as one JSON array under a single key. Every
/// mutation reads the full array, changes it and writes it back; the
/// mutex serializes those sequences so concurrent callers cannot lose
/// each other's writes.
#[derive(Debug)]
pub struct WorkshopStore<S> {
    backend: S,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> WorkshopStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Self {
        Self { backend, key: key.into(), write_lock: Mutex::new(()) }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Missing key and malformed data both read as an empty collection.
    fn read_all(&self) -> Result<Vec<Workshop>, StorageError> {
        let Some(text) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&text) {
            Ok(workshops) => Ok(workshops),
            Err(e) => {
                log::warn!("Discarding malformed workshop data under '{}': {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, workshops: &[Workshop]) -> Result<(), StorageError> {
        let json = serde_json::to_string(workshops)?;
        self.backend.set(&self.key, &json)
    }

    /// All stored workshops, or an empty list if storage cannot be read.
    pub fn list_all(&self) -> Vec<Workshop> {
        self.read_all().unwrap_or_else(|e| {
            log::warn!("Failed to read workshops: {}", e);
            Vec::new()
        })
    }

    pub fn get(&self, id: &str) -> Result<Workshop, StoreError> {
        self.read_all()?
            .into_iter()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    pub fn create(
        &self,
        name: &str,
        drill_index: usize,
        difficulty: Option<Difficulty>,
    ) -> Result<Workshop, StoreError> {
        self.insert(NewWorkshop::new(name, drill_index, difficulty))
    }

    pub fn insert(&self, new: NewWorkshop) -> Result<Workshop, StoreError> {
        let name = normalize_name(&new.name).ok_or(StoreError::InvalidName)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut workshops = self.read_all()?;

        let workshop = Workshop::from_new(new, name, Utc::now());
        workshops.push(workshop.clone());
        self.write_all(&workshops)?;

        log::info!("Created workshop '{}' ({})", workshop.name, workshop.id);
        Ok(workshop)
    }

    /// Replace the stored workshop with the same id, keeping its position
    /// and creation time.
    pub fn update(&self, workshop: &Workshop) -> Result<Workshop, StoreError> {
        let name = normalize_name(&workshop.name).ok_or(StoreError::InvalidName)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut workshops = self.read_all()?;

        let slot = workshops
            .iter_mut()
            .find(|w| w.id == workshop.id)
            .ok_or_else(|| StoreError::NotFound { id: workshop.id.clone() })?;

        let created = slot.created;
        *slot = Workshop {
            name,
            created,
            // never earlier than creation, even if the wall clock stepped back
            updated: Some(Utc::now().max(created)),
            ..workshop.clone()
        };
        let updated = slot.clone();
        self.write_all(&workshops)?;

        log::info!("Updated workshop '{}' ({})", updated.name, updated.id);
        Ok(updated)
    }

    /// Remove a workshop. An unknown id is `NotFound` and nothing is written.
    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut workshops = self.read_all()?;

        let before = workshops.len();
        workshops.retain(|w| w.id != id);
        if workshops.len() == before {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        self.write_all(&workshops)?;

        log::info!("Deleted workshop {}", id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Backend whose reads and/or writes can be switched off.
    #[derive(Debug, Default)]
    pub struct FlakyStore {
        pub inner: crate::workshop::MemoryStore,
        pub fail_reads: AtomicBool,
        pub fail_writes: AtomicBool,
    }

    impl FlakyStore {
        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("access denied".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.set(key, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::FlakyStore;
    use super::*;
    use crate::workshop::{FileStore, MemoryStore};
    use std::sync::Arc;
    use std::thread;

    fn difficulty() -> Difficulty {
        Difficulty {
            id: "heavy_ball".to_string(),
            name: "Balón pesado".to_string(),
            description: "peso extra".to_string(),
        }
    }

    #[test]
    fn test_create_then_list() {
        let store = WorkshopStore::new(MemoryStore::new());
        let created = store.create("Test", 2, None).unwrap();

        let all = store.list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Test");
        assert_eq!(all[0].drill_index, 2);
        assert_eq!(all[0].difficulty, None);
        assert_eq!(all[0].updated, None);
        assert_eq!(all[0], created);
    }

    #[test]
    fn test_update_sets_updated_and_keeps_position() {
        let store = WorkshopStore::new(MemoryStore::new());
        let first = store.create("Lunes", 0, None).unwrap();
        let mut second = store.create("Test", 2, None).unwrap();
        store.create("Viernes", 1, None).unwrap();

        second.drill_index = 3;
        second.difficulty = Some(difficulty());
        let saved = store.update(&second).unwrap();

        let all = store.list_all();
        assert_eq!(all[1].id, second.id);
        assert_eq!(all[1].drill_index, 3);
        assert_eq!(all[1].difficulty, Some(difficulty()));
        assert!(all[1].updated.unwrap() >= all[1].created);
        assert_eq!(all[1], saved);
        assert_eq!(all[0], first);
    }

    #[test]
    fn test_update_cannot_change_created() {
        let store = WorkshopStore::new(MemoryStore::new());
        let original = store.create("Test", 0, None).unwrap();

        let mut edited = original.clone();
        edited.created = original.created - chrono::Duration::days(30);
        let saved = store.update(&edited).unwrap();
        assert_eq!(saved.created, original.created);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = WorkshopStore::new(MemoryStore::new());
        let mut ghost = store.create("Test", 0, None).unwrap();
        ghost.id = "ws-missing".to_string();

        assert!(matches!(store.update(&ghost), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_blank_names_rejected_without_writing() {
        let store = WorkshopStore::new(MemoryStore::new());
        store.create("Existing", 0, None).unwrap();
        let before = store.backend().get(DEFAULT_STORAGE_KEY).unwrap();

        assert!(matches!(store.create("", 0, None), Err(StoreError::InvalidName)));
        assert!(matches!(store.create("   ", 0, None), Err(StoreError::InvalidName)));

        assert_eq!(store.backend().get(DEFAULT_STORAGE_KEY).unwrap(), before);
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn test_names_are_trimmed() {
        let store = WorkshopStore::new(MemoryStore::new());
        assert_eq!(store.create("  Martes ", 0, None).unwrap().name, "Martes");
    }

    #[test]
    fn test_delete_unknown_id_leaves_collection() {
        let store = WorkshopStore::new(MemoryStore::new());
        store.create("A", 0, None).unwrap();
        store.create("B", 1, None).unwrap();
        let before = store.list_all();

        assert!(matches!(store.delete("nope"), Err(StoreError::NotFound { .. })));
        assert_eq!(store.list_all(), before);
    }

    #[test]
    fn test_delete_removes_entry() {
        let store = WorkshopStore::new(MemoryStore::new());
        let a = store.create("A", 0, None).unwrap();
        let b = store.create("B", 1, None).unwrap();

        store.delete(&a.id).unwrap();
        assert_eq!(store.list_all(), vec![b]);
        assert!(matches!(store.get(&a.id), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_read_failure_is_fail_open() {
        let store = WorkshopStore::new(FlakyStore::default());
        store.create("A", 0, None).unwrap();

        store.backend().set_fail_reads(true);
        assert!(store.list_all().is_empty());

        let err = store.create("B", 0, None).unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
        assert!(err.is_recoverable());

        store.backend().set_fail_reads(false);
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn test_write_failure_leaves_collection_untouched() {
        let store = WorkshopStore::new(FlakyStore::default());
        let a = store.create("A", 0, None).unwrap();

        store.backend().set_fail_writes(true);
        assert!(store.create("B", 1, None).is_err());
        assert!(store.update(&a).is_err());
        assert!(store.delete(&a.id).is_err());

        store.backend().set_fail_writes(false);
        assert_eq!(store.list_all(), vec![a]);
    }

    #[test]
    fn test_missing_and_corrupt_data_read_empty() {
        let backend = MemoryStore::new();
        let store = WorkshopStore::new(&backend);
        assert!(store.list_all().is_empty());

        backend.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        assert!(store.list_all().is_empty());

        // a write after corruption starts a fresh collection
        store.create("A", 0, None).unwrap();
        assert_eq!(store.list_all().len(), 1);
    }

    #[test]
    fn test_custom_key_isolated() {
        let backend = Arc::new(MemoryStore::new());
        let a = WorkshopStore::with_key(Arc::clone(&backend), "club-a");
        let b = WorkshopStore::with_key(Arc::clone(&backend), "club-b");

        a.create("A", 0, None).unwrap();
        assert_eq!(a.list_all().len(), 1);
        assert!(b.list_all().is_empty());
        assert_eq!(b.key(), "club-b");
    }

    #[test]
    fn test_concurrent_creates_not_lost() {
        let store = Arc::new(WorkshopStore::new(MemoryStore::new()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..10 {
                        store.create(&format!("w{}-{}", t, i), i, None).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.list_all().len(), 80);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let temp_dir = tempfile::TempDir::new().unwrap();

        let id = {
            let store = WorkshopStore::new(FileStore::new(temp_dir.path()));
            store.create("Sábado", 4, Some(difficulty())).unwrap().id
        };

        let reopened = WorkshopStore::new(FileStore::new(temp_dir.path()));
        let ws = reopened.get(&id).unwrap();
        assert_eq!(ws.name, "Sábado");
        assert_eq!(ws.difficulty, Some(difficulty()));
    }
}
