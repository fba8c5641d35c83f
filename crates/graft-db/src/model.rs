use std::sync::Arc;

use bson::Document;
use graft_store::Store;

use crate::database::Database;
use crate::error::DbError;
use crate::query::Query;
use crate::schema::Schema;

/// Handle to one collection: its schema snapshot plus the database it lives in.
pub struct Model<'db, S: Store> {
    db: &'db Database<S>,
    schema: Arc<Schema>,
}

impl<S: Store> Clone for Model<'_, S> {
    fn clone(&self) -> Self {
        Self {
            db: self.db,
            schema: Arc::clone(&self.schema),
        }
    }
}

impl<'db, S: Store> Model<'db, S> {
    pub(crate) fn new(db: &'db Database<S>, schema: Arc<Schema>) -> Self {
        Self { db, schema }
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn database(&self) -> &'db Database<S> {
        self.db
    }

    pub fn insert_many(&self, docs: Vec<Document>) -> Result<(), DbError> {
        self.db.store().insert(self.name(), docs)?;
        Ok(())
    }

    /// Start a query for documents matching `filter`.
    pub fn find(&self, filter: Document) -> Query<'db, S> {
        Query::new(self.clone(), filter)
    }
}
