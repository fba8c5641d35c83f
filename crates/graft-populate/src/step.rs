use bson::Document;
use graft_db::{KeyDirection, PopulateOptions, Schema};
use graft_query::Select;

use crate::error::PopulateError;

/// One hop of a populate path: fetch documents of `target` referenced by
/// documents of `source` and attach them at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateStep {
    pub source: String,
    pub target: String,
    /// Attach path, relative to the source documents.
    pub path: String,
    pub foreign_key: Option<String>,
    pub direction: Option<KeyDirection>,
    pub select: Option<Select>,
    /// Extra filter, combined with the key clause.
    pub query: Option<Document>,
    /// Attach the first match instead of the full list.
    pub singular: bool,
}

/// The two fields a step joins on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// Read from the source documents.
    pub local: String,
    /// Matched on the target documents.
    pub foreign: String,
}

impl PopulateStep {
    /// Build a step from merged options. `options.reference` is the target;
    /// callers only build steps for options that name one.
    pub(crate) fn new(
        source: impl Into<String>,
        path: impl Into<String>,
        target: impl Into<String>,
        options: PopulateOptions,
    ) -> Self {
        let singular = options
            .singular
            .unwrap_or(options.direction != Some(KeyDirection::Foreign));
        Self {
            source: source.into(),
            target: target.into(),
            path: path.into(),
            foreign_key: options.foreign_key,
            direction: options.direction,
            select: options.select,
            query: options.query,
            singular,
        }
    }

    /// Work out which source and target fields this step joins on.
    ///
    /// Without a `foreign_key` the attach path holds the key and it matches
    /// the target's primary key. With one, `direction` must say which side
    /// stores it.
    pub fn keys(&self, source: &Schema, target: &Schema) -> Result<KeyPair, PopulateError> {
        match (&self.foreign_key, self.direction) {
            (None, None | Some(KeyDirection::Local)) => Ok(KeyPair {
                local: self.path.clone(),
                foreign: target.primary_key.clone(),
            }),
            (Some(field), Some(KeyDirection::Local)) => Ok(KeyPair {
                local: field.clone(),
                foreign: target.primary_key.clone(),
            }),
            (Some(field), Some(KeyDirection::Foreign)) => Ok(KeyPair {
                local: source.primary_key.clone(),
                foreign: field.clone(),
            }),
            (Some(field), None) => Err(self.invalid(format!(
                "foreign key `{field}` needs a direction (local or foreign)"
            ))),
            (None, Some(KeyDirection::Foreign)) => {
                Err(self.invalid("foreign direction needs a foreign key".to_string()))
            }
        }
    }

    /// The source field keys are read from, or `None` when the options are
    /// invalid.
    pub fn local_field(&self, source: &Schema) -> Option<String> {
        match (&self.foreign_key, self.direction) {
            (None, None | Some(KeyDirection::Local)) => Some(self.path.clone()),
            (Some(field), Some(KeyDirection::Local)) => Some(field.clone()),
            (Some(_), Some(KeyDirection::Foreign)) => Some(source.primary_key.clone()),
            _ => None,
        }
    }

    fn invalid(&self, reason: String) -> PopulateError {
        PopulateError::InvalidOptions {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Ordered steps for one populate path. Step `i + 1` reads the documents
/// step `i` fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    pub path: String,
    pub steps: Vec<PopulateStep>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
