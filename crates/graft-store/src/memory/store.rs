use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use arc_swap::ArcSwap;
use bson::Document;
use imbl::Vector;

use crate::error::StoreError;
use crate::store::{DocumentIter, Store};

pub(crate) type Collection = Vector<Document>;

/// In-memory store. Readers scan an immutable snapshot; writers serialize on
/// a store-wide lock and publish a new version of the collection.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Arc<ArcSwap<Collection>>>>,
    write_lock: Mutex<()>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve a collection handle by name.
    fn collection(&self, name: &str) -> Result<Arc<ArcSwap<Collection>>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| StoreError::Storage(format!("collections lock poisoned: {e}")))?;
        collections
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Storage(format!("write lock poisoned: {e}")))
    }
}

impl Store for MemoryStore {
    fn create_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Storage(format!("collections lock poisoned: {e}")))?;
        collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(ArcSwap::new(Arc::new(Vector::new()))));
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| StoreError::Storage(format!("collections lock poisoned: {e}")))?;
        collections.remove(name);
        Ok(())
    }

    fn insert(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError> {
        let handle = self.collection(collection)?;
        let _guard = self.lock_writes()?;

        // Structural sharing keeps the copy cheap; concurrent scans keep
        // reading the version they loaded.
        let mut data = (**handle.load()).clone();
        data.extend(docs);
        handle.store(Arc::new(data));
        Ok(())
    }

    fn scan(&self, collection: &str) -> Result<DocumentIter<'_>, StoreError> {
        let snapshot = self.collection(collection)?.load_full();
        Ok(Box::new(
            (0..snapshot.len()).map(move |i| Ok(snapshot[i].clone())),
        ))
    }
}
