mod catalog;
mod database;
mod error;
mod model;
mod options;
mod query;
mod schema;

pub use bson::{Bson, Document};
pub use catalog::Catalog;
pub use database::Database;
pub use error::DbError;
pub use model::Model;
pub use options::{KeyDirection, PopulateOptions, merge_documents};
pub use query::Query;
pub use schema::{DEFAULT_PRIMARY_KEY, FieldDef, Schema, load_schemas};
