use bson::Document;
use graft_query::{Select, matches, parse_filter};
use graft_store::Store;
use tracing::trace;

use crate::error::DbError;
use crate::model::Model;

/// A find query against one collection: a filter document plus an optional
/// field selection.
pub struct Query<'db, S: Store> {
    model: Model<'db, S>,
    filter: Document,
    select: Option<Select>,
}

impl<'db, S: Store> Query<'db, S> {
    pub(crate) fn new(model: Model<'db, S>, filter: Document) -> Self {
        Self {
            model,
            filter,
            select: None,
        }
    }

    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    pub fn model(&self) -> &Model<'db, S> {
        &self.model
    }

    pub fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn selection(&self) -> Option<&Select> {
        self.select.as_ref()
    }

    /// Run the query, returning matching documents in storage order.
    pub fn exec(&self) -> Result<Vec<Document>, DbError> {
        let expr = parse_filter(&self.filter)?;
        let store = self.model.database().store();

        let mut rows = Vec::new();
        for doc in store.scan(self.model.name())? {
            let mut doc = doc?;
            if !matches(&doc, &expr) {
                continue;
            }
            if let Some(select) = &self.select {
                select.apply(&mut doc);
            }
            rows.push(doc);
        }

        trace!(collection = self.model.name(), matched = rows.len(), "find");
        Ok(rows)
    }
}
