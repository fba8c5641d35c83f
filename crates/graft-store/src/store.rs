use bson::Document;

use crate::error::StoreError;

/// Documents yielded by a collection scan, in storage order.
pub type DocumentIter<'a> = Box<dyn Iterator<Item = Result<Document, StoreError>> + 'a>;

/// Ordered document storage, one sequence of documents per collection.
///
/// A store knows nothing about filters or schemas. Scans return documents in
/// insertion order, which is the "natural order" callers observe.
pub trait Store {
    /// Create a collection. Idempotent.
    fn create_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Drop a collection and all of its documents. Idempotent.
    fn drop_collection(&self, name: &str) -> Result<(), StoreError>;

    /// Append documents to an existing collection.
    fn insert(&self, collection: &str, docs: Vec<Document>) -> Result<(), StoreError>;

    /// Iterate over a snapshot of a collection.
    fn scan(&self, collection: &str) -> Result<DocumentIter<'_>, StoreError>;
}
