use bson::Document;
use graft_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum PopulateError {
    /// A lookup failed; surfaced verbatim from the query layer.
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("invalid populate options for `{path}`: {reason}")]
    InvalidOptions { path: String, reason: String },

    #[error("populate completion dropped before it was resolved")]
    Canceled,
}

/// A failed populate call together with the documents as they stand.
///
/// Paths that finished before the failure stay attached, so `docs` may be
/// partially populated. It is empty when the primary query itself failed.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct PopulateFailure {
    #[source]
    pub error: PopulateError,
    pub docs: Vec<Document>,
}

impl PopulateFailure {
    pub fn new(error: PopulateError, docs: Vec<Document>) -> Self {
        Self { error, docs }
    }

    pub fn into_parts(self) -> (PopulateError, Vec<Document>) {
        (self.error, self.docs)
    }
}

/// What a populate call resolves to.
pub type Outcome = Result<Vec<Document>, PopulateFailure>;
