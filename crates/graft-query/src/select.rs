use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use bson::{Bson, Document};
use serde::{Deserialize, Serialize};

use crate::path::remove_path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("select parse error: {0}")]
pub struct SelectParseError(pub String);

/// A field selection applied to query results.
///
/// Written as a space-separated list: `"name email"` keeps only those fields
/// (plus `_id`), `"-password -tokens"` drops them. Dotted paths address
/// nested fields. Inclusions and exclusions cannot be mixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Select {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl Select {
    pub fn parse(input: &str) -> Result<Self, SelectParseError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for token in input.split_whitespace() {
            match token.strip_prefix('-') {
                Some("") => return Err(SelectParseError("dangling '-' in selection".into())),
                Some(field) => exclude.push(field.to_string()),
                None => include.push(token.to_string()),
            }
        }

        match (include.is_empty(), exclude.is_empty()) {
            (false, true) => Ok(Select::Include(include)),
            (true, false) => Ok(Select::Exclude(exclude)),
            (true, true) => Err(SelectParseError("empty selection".into())),
            (false, false) => Err(SelectParseError(format!(
                "cannot mix inclusion and exclusion in selection: {input}"
            ))),
        }
    }

    pub fn fields(&self) -> &[String] {
        match self {
            Select::Include(fields) | Select::Exclude(fields) => fields,
        }
    }

    /// Return a selection that is guaranteed to keep `field`.
    ///
    /// `None` when nothing is left to exclude, i.e. the whole document is kept.
    pub fn keeping(&self, field: &str) -> Option<Select> {
        let covers = |f: &String| f == field || field.starts_with(&format!("{f}."));
        match self {
            Select::Include(fields) => {
                let mut fields = fields.clone();
                if !fields.iter().any(covers) {
                    fields.push(field.to_string());
                }
                Some(Select::Include(fields))
            }
            Select::Exclude(fields) => {
                let fields: Vec<String> =
                    fields.iter().filter(|f| !covers(*f)).cloned().collect();
                (!fields.is_empty()).then_some(Select::Exclude(fields))
            }
        }
    }

    /// Apply the selection to a document in place.
    pub fn apply(&self, doc: &mut Document) {
        match self {
            Select::Include(fields) => apply_projection(doc, fields),
            Select::Exclude(fields) => {
                for field in fields {
                    remove_path(doc, field);
                }
            }
        }
    }
}

/// Apply an inclusion projection, supporting dot-notation paths.
/// Keeps `_id` always. For dotted paths like "address.city", outputs
/// `{ "address": { "city": <value> } }`, dropping sibling fields.
fn apply_projection(doc: &mut Document, columns: &[String]) {
    let mut flat_keys: HashSet<&str> = HashSet::new();
    // top_key → vec of remaining sub-paths
    let mut nested: HashMap<&str, Vec<String>> = HashMap::new();

    for col in columns {
        match col.split_once('.') {
            Some((top, rest)) => nested.entry(top).or_default().push(rest.to_string()),
            None => {
                flat_keys.insert(col.as_str());
            }
        }
    }

    // Remove top-level keys that aren't needed
    let keys_to_remove: Vec<String> = doc
        .keys()
        .filter(|k| {
            *k != "_id" && !flat_keys.contains(k.as_str()) && !nested.contains_key(k.as_str())
        })
        .cloned()
        .collect();
    for key in keys_to_remove {
        doc.remove(&key);
    }

    // Trim nested documents to only requested sub-paths
    for (top_key, sub_paths) in &nested {
        if flat_keys.contains(top_key) {
            continue;
        }
        if let Some(Bson::Document(sub_doc)) = doc.get_mut(*top_key) {
            let keep_id = sub_paths.iter().any(|p| p == "_id");
            apply_projection(sub_doc, sub_paths);
            if !keep_id {
                sub_doc.remove("_id");
            }
        }
    }
}

impl FromStr for Select {
    type Err = SelectParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Select::parse(s)
    }
}

impl TryFrom<String> for Select {
    type Error = SelectParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Select::parse(&value)
    }
}

impl From<Select> for String {
    fn from(select: Select) -> Self {
        select.to_string()
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            Select::Include(_) => "",
            Select::Exclude(_) => "-",
        };
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{prefix}{field}")?;
        }
        Ok(())
    }
}
