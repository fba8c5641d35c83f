use graft_db::Query;
use graft_store::Store;
use tracing::debug;

use crate::completion::{Completion, channel};
use crate::error::{Outcome, PopulateFailure};
use crate::request::{PathOptions, PopulateRequest};

/// A find query whose results are populated before they are delivered.
///
/// Without a populate configuration it behaves exactly like the wrapped
/// query. With one, an empty result or a failing primary query is delivered
/// as-is; otherwise the configured paths are populated first.
pub struct PopulatingQuery<'db, S: Store> {
    base: Query<'db, S>,
    request: Option<PopulateRequest>,
}

impl<'db, S: Store> From<Query<'db, S>> for PopulatingQuery<'db, S> {
    fn from(base: Query<'db, S>) -> Self {
        Self::new(base)
    }
}

impl<'db, S: Store> PopulatingQuery<'db, S> {
    pub fn new(base: Query<'db, S>) -> Self {
        Self {
            base,
            request: None,
        }
    }

    /// Attach (or replace) the populate configuration.
    pub fn populate(mut self, paths: &str, options: PathOptions) -> Self {
        self.request = Some(PopulateRequest {
            model: self.base.model().name().to_string(),
            paths: paths.to_string(),
            options,
        });
        self
    }

    pub fn request(&self) -> Option<&PopulateRequest> {
        self.request.as_ref()
    }

    pub fn query(&self) -> &Query<'db, S> {
        &self.base
    }

    /// Execute and hand the outcome to `callback` exactly once.
    pub fn exec_with<F>(self, callback: F)
    where
        F: FnOnce(Outcome),
    {
        callback(self.run())
    }

    /// Execute, returning a completion that yields the same outcome the
    /// callback form would receive.
    pub fn exec(self) -> Completion {
        let (resolver, completion) = channel();
        self.exec_with(|outcome| resolver.resolve(outcome));
        completion
    }

    fn run(self) -> Outcome {
        let mut docs = self
            .base
            .exec()
            .map_err(|e| PopulateFailure::new(e.into(), Vec::new()))?;

        let Some(request) = &self.request else {
            return Ok(docs);
        };
        if docs.is_empty() {
            debug!(model = %request.model, paths = %request.paths, "no results, skipping populate");
            return Ok(docs);
        }

        let db = self.base.model().database();
        match request.run(db, &mut docs) {
            Ok(()) => Ok(docs),
            Err(error) => Err(PopulateFailure::new(error, docs)),
        }
    }
}

/// Adds `.populate(..)` to [`graft_db::Query`].
pub trait PopulateQueryExt<'db, S: Store> {
    fn populate(self, paths: &str, options: PathOptions) -> PopulatingQuery<'db, S>;
}

impl<'db, S: Store> PopulateQueryExt<'db, S> for Query<'db, S> {
    fn populate(self, paths: &str, options: PathOptions) -> PopulatingQuery<'db, S> {
        PopulatingQuery::new(self).populate(paths, options)
    }
}
