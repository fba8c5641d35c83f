use bson::Document;
use graft_db::{Database, DbError};
use graft_store::Store;
use tracing::{trace, warn};

use crate::error::PopulateError;
use crate::join::join;
use crate::request::PathOptions;
use crate::resolve::resolve;

/// Populate each whitespace-separated path in `paths` on `docs`, one path
/// at a time, last path first.
///
/// The root schema is looked up on every path so defaults registered in the
/// meantime apply. The first failing path stops the sequence; paths already
/// processed stay populated.
pub fn populate_paths<S: Store>(
    db: &Database<S>,
    root: &str,
    paths: &str,
    options: &PathOptions,
    docs: &mut [Document],
) -> Result<(), PopulateError> {
    let mut pending: Vec<&str> = paths.split_whitespace().collect();

    while let Some(path) = pending.pop() {
        let schema = db
            .catalog()
            .get(root)
            .ok_or_else(|| DbError::CollectionNotFound(root.to_string()))?;
        let plan = resolve(db.catalog(), &schema, path, options);
        trace!(model = root, path, steps = plan.len(), "populate plan");

        if let Err(error) = join(db, &plan.steps, docs) {
            warn!(model = root, path, %error, "populate failed");
            return Err(error);
        }
    }
    Ok(())
}
