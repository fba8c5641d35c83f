use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::options::PopulateOptions;

pub const DEFAULT_PRIMARY_KEY: &str = "_id";

fn default_primary_key() -> String {
    DEFAULT_PRIMARY_KEY.to_string()
}

/// Per-collection declaration: primary key, fields, and populate defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub name: String,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Path → default options registered through [`Schema::plugin`].
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub populate: BTreeMap<String, PopulateOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    /// Reference declaration; a field with a `ref` target is populatable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub populate: Option<PopulateOptions>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: default_primary_key(),
            fields: Vec::new(),
            populate: BTreeMap::new(),
        }
    }

    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = field.into();
        self
    }

    /// Declare a plain field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            populate: None,
        });
        self
    }

    /// Declare a reference field.
    pub fn reference(mut self, name: impl Into<String>, options: PopulateOptions) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            populate: Some(options),
        });
        self
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Register populate defaults. Repeated registrations accumulate: options
    /// for a path already present are merged, the new ones winning.
    pub fn plugin<I, K>(&mut self, defaults: I)
    where
        I: IntoIterator<Item = (K, PopulateOptions)>,
        K: Into<String>,
    {
        for (path, options) in defaults {
            let path = path.into();
            let merged = match self.populate.get(&path) {
                Some(existing) => existing.merge(&options),
                None => options,
            };
            self.populate.insert(path, merged);
        }
    }

    /// Effective default options for a path relative to this schema: the
    /// field declaration overlaid with plugin defaults.
    pub fn default_options(&self, path: &str) -> Option<PopulateOptions> {
        let declared = self
            .fields
            .iter()
            .find(|f| f.name == path)
            .and_then(|f| f.populate.as_ref());
        match (declared, self.populate.get(path)) {
            (Some(declared), Some(plugin)) => Some(declared.merge(plugin)),
            (declared, plugin) => declared.or(plugin).cloned(),
        }
    }
}

/// Parse a JSON array of schema declarations.
pub fn load_schemas(json: &str) -> Result<Vec<Schema>, DbError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::KeyDirection;
    use graft_query::Select;

    #[test]
    fn load_schemas_applies_defaults() {
        let schemas = load_schemas(
            r#"[
                { "name": "posts",
                  "fields": [
                    { "name": "title" },
                    { "name": "authorId", "populate": { "ref": "authors" } },
                    { "name": "comments",
                      "populate": { "ref": "comments", "foreignKey": "postId",
                                    "direction": "foreign" } }
                  ] },
                { "name": "authors", "primaryKey": "handle" }
            ]"#,
        )
        .unwrap();

        assert_eq!(schemas.len(), 2);
        let posts = &schemas[0];
        assert_eq!(posts.primary_key, "_id");
        assert!(posts.has_field("title"));
        assert_eq!(
            posts
                .default_options("authorId")
                .and_then(|o| o.reference),
            Some("authors".to_string())
        );
        assert_eq!(
            posts.default_options("comments").and_then(|o| o.direction),
            Some(KeyDirection::Foreign)
        );
        assert_eq!(schemas[1].primary_key, "handle");
    }

    #[test]
    fn load_schemas_reports_bad_json() {
        let err = load_schemas(r#"[{ "fields": [] }]"#).unwrap_err();
        assert!(matches!(err, DbError::Config(_)), "{err}");
    }

    #[test]
    fn plain_fields_have_no_default_options() {
        let schema = Schema::new("posts").field("title");
        assert!(schema.default_options("title").is_none());
        assert!(schema.default_options("missing").is_none());
    }

    #[test]
    fn plugin_defaults_accumulate_and_override_field_declaration() {
        let mut schema = Schema::new("posts")
            .reference("authorId", PopulateOptions::reference_to("authors").singular(true));

        schema.plugin([(
            "authorId",
            PopulateOptions {
                select: Some(Select::parse("name").unwrap()),
                ..Default::default()
            },
        )]);
        schema.plugin([(
            "authorId",
            PopulateOptions {
                singular: Some(false),
                ..Default::default()
            },
        )]);
        schema.plugin([("editorId", PopulateOptions::reference_to("authors"))]);

        let author = schema.default_options("authorId").unwrap();
        assert_eq!(author.reference.as_deref(), Some("authors"));
        assert_eq!(author.select, Some(Select::parse("name").unwrap()));
        assert_eq!(author.singular, Some(false));

        // plugin-only path, no field declaration
        assert!(schema.default_options("editorId").unwrap().is_reference());
    }
}
