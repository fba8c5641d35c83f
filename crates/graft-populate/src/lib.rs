//! Reference population for graft collections.
//!
//! Given documents from one collection and a list of dotted paths, fetch the
//! documents those paths reference in other collections and graft them onto
//! the originals. Each path is resolved into a [`Plan`] of [`PopulateStep`]s
//! up front; each step costs exactly one query, however many documents share
//! it.
//!
//! Two entry points:
//! - [`PopulateQueryExt::populate`] wraps a [`graft_db::Query`] so that its
//!   results are populated before they reach the caller;
//! - [`PopulateModelExt::populate`] populates an explicit document set.

mod completion;
mod error;
mod join;
mod model;
mod query;
mod request;
mod resolve;
mod sequence;
mod step;

pub use completion::{Completion, Resolver, channel};
pub use error::{Outcome, PopulateError, PopulateFailure};
pub use join::join;
pub use model::PopulateModelExt;
pub use query::{PopulateQueryExt, PopulatingQuery};
pub use request::{PathOptions, PopulateRequest};
pub use resolve::resolve;
pub use sequence::populate_paths;
pub use step::{KeyPair, Plan, PopulateStep};
