use graft_query::FilterParseError;
use graft_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(#[from] FilterParseError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Config(e.to_string())
    }
}
