use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::error::DbError;
use crate::schema::Schema;

type Schemas = HashMap<String, Arc<Schema>>;

/// Registry of collection schemas.
///
/// Readers get `Arc<Schema>` snapshots without locking; registrations copy the
/// map, modify the copy and publish it, serialized on a writer lock.
pub struct Catalog {
    schemas: ArcSwap<Schemas>,
    write_lock: Mutex<()>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            schemas: ArcSwap::from_pointee(HashMap::new()),
            write_lock: Mutex::new(()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.load().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.load().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.load().keys().cloned().collect();
        names.sort();
        names
    }

    /// Register or replace a schema.
    pub fn register(&self, schema: Schema) -> Result<(), DbError> {
        self.modify(|schemas| {
            schemas.insert(schema.name.clone(), Arc::new(schema));
            Ok(())
        })
    }

    /// Apply `f` to a registered schema and publish the result.
    pub fn update<F>(&self, name: &str, f: F) -> Result<(), DbError>
    where
        F: FnOnce(&mut Schema),
    {
        self.modify(|schemas| {
            let current = schemas
                .get_mut(name)
                .ok_or_else(|| DbError::CollectionNotFound(name.to_string()))?;
            f(Arc::make_mut(current));
            Ok(())
        })
    }

    pub fn remove(&self, name: &str) -> Result<(), DbError> {
        self.modify(|schemas| {
            schemas.remove(name);
            Ok(())
        })
    }

    fn modify<F>(&self, f: F) -> Result<(), DbError>
    where
        F: FnOnce(&mut Schemas) -> Result<(), DbError>,
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| DbError::Config(format!("catalog lock poisoned: {e}")))?;
        let mut next = Schemas::clone(&self.schemas.load());
        f(&mut next)?;
        self.schemas.store(Arc::new(next));
        Ok(())
    }
}
