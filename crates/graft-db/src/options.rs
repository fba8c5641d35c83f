use bson::{Bson, Document};
use graft_query::Select;
use serde::{Deserialize, Serialize};

/// Which side of a reference stores the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDirection {
    /// The source document holds the key; it matches the target's primary key.
    Local,
    /// The target document holds the key; it matches the source's primary key.
    Foreign,
}

/// Reference configuration for one populatable path.
///
/// Every field is optional so that schema defaults and per-call overrides can
/// be layered with [`PopulateOptions::merge`]. A path is populatable once the
/// merged options name a target collection (`ref`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulateOptions {
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<KeyDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<bool>,
}

impl PopulateOptions {
    /// Options referencing `target` by its primary key.
    pub fn reference_to(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    /// The source document stores the key in `field`.
    pub fn local_key(mut self, field: impl Into<String>) -> Self {
        self.foreign_key = Some(field.into());
        self.direction = Some(KeyDirection::Local);
        self
    }

    /// The target documents store the source's primary key in `field`.
    pub fn foreign_key(mut self, field: impl Into<String>) -> Self {
        self.foreign_key = Some(field.into());
        self.direction = Some(KeyDirection::Foreign);
        self
    }

    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    pub fn query(mut self, query: Document) -> Self {
        self.query = Some(query);
        self
    }

    pub fn singular(mut self, singular: bool) -> Self {
        self.singular = Some(singular);
        self
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Layer `overrides` on top of `self`, returning a new value.
    ///
    /// Scalar options from the override win; the `query` documents are
    /// deep-merged with [`merge_documents`].
    pub fn merge(&self, overrides: &PopulateOptions) -> PopulateOptions {
        PopulateOptions {
            reference: overrides.reference.clone().or_else(|| self.reference.clone()),
            foreign_key: overrides
                .foreign_key
                .clone()
                .or_else(|| self.foreign_key.clone()),
            direction: overrides.direction.or(self.direction),
            select: overrides.select.clone().or_else(|| self.select.clone()),
            query: match (&self.query, &overrides.query) {
                (Some(defaults), Some(extra)) => Some(merge_documents(defaults, extra)),
                (defaults, extra) => extra.clone().or_else(|| defaults.clone()),
            },
            singular: overrides.singular.or(self.singular),
        }
    }
}

/// Deep-merge two documents into a new one.
///
/// Embedded documents present on both sides merge recursively; any other
/// override value (arrays included) replaces the default wholesale. Keys only
/// present in `defaults` are kept, keys only present in `overrides` are added.
pub fn merge_documents(defaults: &Document, overrides: &Document) -> Document {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        let value = match (merged.get(key), value) {
            (Some(Bson::Document(base)), Bson::Document(extra)) => {
                Bson::Document(merge_documents(base, extra))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), value);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn merge_documents_recurses_into_embedded_documents() {
        let defaults = doc! { "active": true, "meta": { "tier": "gold", "region": "us" } };
        let overrides = doc! { "meta": { "region": "eu" }, "role": "admin" };
        assert_eq!(
            merge_documents(&defaults, &overrides),
            doc! { "active": true, "meta": { "tier": "gold", "region": "eu" }, "role": "admin" }
        );
    }

    #[test]
    fn merge_documents_replaces_arrays_and_scalars() {
        let defaults = doc! { "tags": ["a", "b"], "limit": 5_i32, "nested": 1_i32 };
        let overrides = doc! { "tags": ["c"], "limit": 10_i32, "nested": { "x": 1_i32 } };
        assert_eq!(
            merge_documents(&defaults, &overrides),
            doc! { "tags": ["c"], "limit": 10_i32, "nested": { "x": 1_i32 } }
        );
    }

    #[test]
    fn merge_documents_leaves_inputs_untouched() {
        let defaults = doc! { "meta": { "tier": "gold" } };
        let overrides = doc! { "meta": { "tier": "silver" } };
        let _ = merge_documents(&defaults, &overrides);
        assert_eq!(defaults, doc! { "meta": { "tier": "gold" } });
        assert_eq!(overrides, doc! { "meta": { "tier": "silver" } });
    }

    #[test]
    fn options_override_wins_and_defaults_fill_gaps() {
        let defaults = PopulateOptions::reference_to("authors")
            .select(Select::parse("name").unwrap())
            .query(doc! { "active": true });
        let overrides = PopulateOptions {
            singular: Some(false),
            select: Some(Select::parse("name email").unwrap()),
            query: Some(doc! { "role": "editor" }),
            ..Default::default()
        };

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.reference.as_deref(), Some("authors"));
        assert_eq!(merged.singular, Some(false));
        assert_eq!(merged.select, Some(Select::parse("name email").unwrap()));
        assert_eq!(merged.query, Some(doc! { "active": true, "role": "editor" }));
        // the stored defaults are not touched
        assert_eq!(defaults.query, Some(doc! { "active": true }));
        assert_eq!(defaults.singular, None);
    }

    #[test]
    fn key_builders_declare_direction() {
        let local = PopulateOptions::reference_to("users").local_key("ownerId");
        assert_eq!(local.foreign_key.as_deref(), Some("ownerId"));
        assert_eq!(local.direction, Some(KeyDirection::Local));

        let foreign = PopulateOptions::reference_to("comments").foreign_key("postId");
        assert_eq!(foreign.direction, Some(KeyDirection::Foreign));
    }

    #[test]
    fn deserializes_document_store_spelling() {
        let opts: PopulateOptions = serde_json::from_str(
            r#"{ "ref": "comments", "foreignKey": "postId", "direction": "foreign",
                 "select": "body author", "query": { "hidden": false }, "singular": false }"#,
        )
        .unwrap();
        assert_eq!(opts.reference.as_deref(), Some("comments"));
        assert_eq!(opts.foreign_key.as_deref(), Some("postId"));
        assert_eq!(opts.direction, Some(KeyDirection::Foreign));
        assert_eq!(opts.select, Some(Select::parse("body author").unwrap()));
        assert_eq!(opts.query, Some(doc! { "hidden": false }));
        assert_eq!(opts.singular, Some(false));
    }

    #[test]
    fn rejects_mixed_selection_in_config() {
        let result: Result<PopulateOptions, _> =
            serde_json::from_str(r#"{ "ref": "users", "select": "name -password" }"#);
        assert!(result.is_err());
    }
}
