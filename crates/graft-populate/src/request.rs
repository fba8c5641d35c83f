use std::collections::BTreeMap;

use bson::Document;
use graft_db::{Database, PopulateOptions};
use graft_store::Store;

use crate::error::PopulateError;
use crate::sequence::populate_paths;

/// Per-call options, keyed by full dotted path from the root collection.
pub type PathOptions = BTreeMap<String, PopulateOptions>;

/// A populate configuration attached to a query: which collection the
/// results come from, the whitespace-separated paths and per-path options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulateRequest {
    pub model: String,
    pub paths: String,
    pub options: PathOptions,
}

impl PopulateRequest {
    pub fn new(model: impl Into<String>, paths: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            paths: paths.into(),
            options: PathOptions::new(),
        }
    }

    pub fn option(mut self, path: impl Into<String>, options: PopulateOptions) -> Self {
        self.options.insert(path.into(), options);
        self
    }

    pub fn run<S: Store>(
        &self,
        db: &Database<S>,
        docs: &mut [Document],
    ) -> Result<(), PopulateError> {
        populate_paths(db, &self.model, &self.paths, &self.options, docs)
    }
}
