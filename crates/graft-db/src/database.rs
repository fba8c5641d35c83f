use bson::Document;
use graft_store::Store;

use crate::catalog::Catalog;
use crate::error::DbError;
use crate::model::Model;
use crate::options::PopulateOptions;
use crate::schema::{Schema, load_schemas};

/// A document store paired with the schema catalog describing its collections.
pub struct Database<S: Store> {
    store: S,
    catalog: Catalog,
}

impl<S: Store> Database<S> {
    pub fn open(store: S) -> Self {
        Self {
            store,
            catalog: Catalog::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ── Collection management ───────────────────────────────────

    /// Create the collection described by `schema` and register the schema.
    /// Re-registering an existing collection replaces its schema and keeps
    /// its documents.
    pub fn create_collection(&self, schema: Schema) -> Result<Model<'_, S>, DbError> {
        let name = schema.name.clone();
        self.store.create_collection(&name)?;
        self.catalog.register(schema)?;
        self.model(&name)
    }

    /// Create every collection declared in a JSON schema list.
    pub fn load_schemas(&self, json: &str) -> Result<Vec<String>, DbError> {
        let mut names = Vec::new();
        for schema in load_schemas(json)? {
            names.push(schema.name.clone());
            self.create_collection(schema)?;
        }
        Ok(names)
    }

    /// Register populate defaults on a collection's schema.
    pub fn plugin<I, K>(&self, collection: &str, defaults: I) -> Result<(), DbError>
    where
        I: IntoIterator<Item = (K, PopulateOptions)>,
        K: Into<String>,
    {
        self.catalog
            .update(collection, |schema| schema.plugin(defaults))
    }

    /// Drop a collection, its documents and its schema.
    pub fn drop_collection(&self, name: &str) -> Result<(), DbError> {
        self.store.drop_collection(name)?;
        self.catalog.remove(name)
    }

    // ── Models ──────────────────────────────────────────────────

    /// Resolve a model handle for a registered collection.
    pub fn model(&self, name: &str) -> Result<Model<'_, S>, DbError> {
        let schema = self
            .catalog
            .get(name)
            .ok_or_else(|| DbError::CollectionNotFound(name.to_string()))?;
        Ok(Model::new(self, schema))
    }

    /// Convenience: insert documents into a registered collection.
    pub fn insert_many(&self, collection: &str, docs: Vec<Document>) -> Result<(), DbError> {
        self.model(collection)?.insert_many(docs)
    }
}
