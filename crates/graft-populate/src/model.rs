use bson::Document;
use graft_db::Model;
use graft_store::Store;

use crate::error::{Outcome, PopulateError, PopulateFailure};
use crate::request::PathOptions;
use crate::sequence::populate_paths;

/// Populate documents that did not come from a populating query.
pub trait PopulateModelExt {
    /// Populate `paths` on `docs` in place. On failure, paths processed
    /// before the failing one remain populated.
    fn populate(
        &self,
        docs: &mut [Document],
        paths: &str,
        options: &PathOptions,
    ) -> Result<(), PopulateError>;

    /// Callback form: takes ownership of `docs` and reports them back
    /// through `callback`, populated or as far as population got.
    fn populate_with<F>(&self, docs: Vec<Document>, paths: &str, options: &PathOptions, callback: F)
    where
        F: FnOnce(Outcome);
}

impl<S: Store> PopulateModelExt for Model<'_, S> {
    fn populate(
        &self,
        docs: &mut [Document],
        paths: &str,
        options: &PathOptions,
    ) -> Result<(), PopulateError> {
        populate_paths(self.database(), self.name(), paths, options, docs)
    }

    fn populate_with<F>(
        &self,
        mut docs: Vec<Document>,
        paths: &str,
        options: &PathOptions,
        callback: F,
    ) where
        F: FnOnce(Outcome),
    {
        let outcome = match self.populate(&mut docs, paths, options) {
            Ok(()) => Ok(docs),
            Err(error) => Err(PopulateFailure::new(error, docs)),
        };
        callback(outcome)
    }
}
