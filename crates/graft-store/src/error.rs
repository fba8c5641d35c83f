#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}
