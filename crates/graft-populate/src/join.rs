use std::collections::{HashMap, HashSet};

use bson::{Bson, Document};
use graft_db::{Database, DbError, KeyDirection};
use graft_query::path::{for_each_parent_mut, for_each_value, get_path};
use graft_store::Store;
use tracing::debug;

use crate::error::PopulateError;
use crate::step::PopulateStep;

/// Run `steps` against `docs`, attaching fetched documents in place.
///
/// The first step issues a single query for every distinct local key in
/// `docs`; the remaining steps run on the fetched documents before they are
/// attached. When a later step fails, what was fetched so far is still
/// attached and the error is returned.
///
/// A local key that already holds a populated document is read through that
/// document's primary key, and the earlier population is kept where the
/// fresh row only has a raw key.
pub fn join<S: Store>(
    db: &Database<S>,
    steps: &[PopulateStep],
    docs: &mut [Document],
) -> Result<(), PopulateError> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(());
    };

    let source = db
        .catalog()
        .get(&step.source)
        .ok_or_else(|| DbError::CollectionNotFound(step.source.clone()))?;
    let target = db.model(&step.target)?;
    let keys = step.keys(&source, target.schema())?;
    let embedded = (step.direction != Some(KeyDirection::Foreign)).then_some(keys.foreign.as_str());

    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for doc in docs.iter() {
        for_each_value(doc, &keys.local, &mut |value: &Bson| {
            for key in key_values(value, embedded) {
                if let Some(index) = IndexKey::from_bson(key) {
                    if seen.insert(index) {
                        values.push(key.clone());
                    }
                }
            }
        });
    }

    let mut membership = Document::new();
    membership.insert("$in", Bson::Array(values));
    let mut filter = Document::new();
    filter.insert(keys.foreign.clone(), membership);
    if let Some(extra) = step.query.as_ref().filter(|q| !q.is_empty()) {
        let mut combined = Document::new();
        combined.insert(
            "$and",
            Bson::Array(vec![Bson::Document(filter), Bson::Document(extra.clone())]),
        );
        filter = combined;
    }

    let mut query = target.find(filter);
    if let Some(select) = &step.select {
        let mut widened = select.keeping(&keys.foreign);
        if let Some(field) = rest.first().and_then(|next| next.local_field(target.schema())) {
            widened = widened.and_then(|select| select.keeping(&field));
        }
        if let Some(select) = widened {
            query = query.select(select);
        }
    }

    let mut rows = query.exec()?;
    debug!(
        source = %step.source,
        target = %step.target,
        path = %step.path,
        keys = seen.len(),
        fetched = rows.len(),
        "populate step"
    );

    let nested = join(db, rest, &mut rows);

    let mut by_key: HashMap<IndexKey, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        let Some(value) = get_path(row, &keys.foreign) else {
            continue;
        };
        for key in IndexKey::all(value) {
            let matched = by_key.entry(key).or_default();
            if matched.last() != Some(&i) {
                matched.push(i);
            }
        }
    }

    let attach = Attach {
        rows: &rows,
        by_key: &by_key,
        embedded,
        primary_key: &target.schema().primary_key,
        singular: step.singular,
    };
    // the key lives at the attach point itself unless a separate field holds it
    let keyed_in_place = keys.local == step.path;
    for doc in docs.iter_mut() {
        let root_key = if keyed_in_place {
            None
        } else {
            get_path(doc, &keys.local).cloned()
        };
        for_each_parent_mut(doc, &step.path, &mut |parent: &mut Document, leaf: &str| {
            let key = if keyed_in_place {
                parent.get(leaf)
            } else {
                root_key.as_ref()
            };
            let value = attach.value(key, parent.get(leaf));
            parent.insert(leaf, value);
        });
    }

    nested
}

/// Fetched rows of one step, indexed for attachment.
struct Attach<'a> {
    rows: &'a [Document],
    by_key: &'a HashMap<IndexKey, Vec<usize>>,
    /// Field read from a local value that is already a populated document.
    embedded: Option<&'a str>,
    primary_key: &'a str,
    singular: bool,
}

impl Attach<'_> {
    fn matches(&self, key: &Bson) -> Option<&[usize]> {
        let key = IndexKey::from_bson(key_value(key, self.embedded)?)?;
        self.by_key.get(&key).map(Vec::as_slice)
    }

    /// Value to store for `key`, given what the document holds there now.
    ///
    /// An array of keys yields the first match of each element, dropping
    /// elements without one. A single key yields the first match or the list
    /// of matches; no match yields null.
    fn value(&self, key: Option<&Bson>, current: Option<&Bson>) -> Bson {
        let current: &[Bson] = match current {
            Some(Bson::Array(items)) => items,
            Some(other) => std::slice::from_ref(other),
            None => &[],
        };
        match key {
            Some(Bson::Array(items)) => Bson::Array(
                items
                    .iter()
                    .filter_map(|item| self.matches(item)?.first())
                    .map(|&row| self.graft(row, current))
                    .collect(),
            ),
            Some(key) => match self.matches(key) {
                Some(matched) if self.singular => self.graft(matched[0], current),
                Some(matched) => Bson::Array(
                    matched
                        .iter()
                        .map(|&row| self.graft(row, current))
                        .collect(),
                ),
                None => Bson::Null,
            },
            None => Bson::Null,
        }
    }

    /// Row `row` as a value, laid over the document with the same primary key
    /// in `current` if there is one.
    fn graft(&self, row: usize, current: &[Bson]) -> Bson {
        let row = &self.rows[row];
        let id = row.get(self.primary_key).and_then(IndexKey::from_bson);
        let previous = id.and_then(|id| {
            current.iter().find_map(|value| match value {
                Bson::Document(prev)
                    if prev.get(self.primary_key).and_then(IndexKey::from_bson).as_ref()
                        == Some(&id) =>
                {
                    Some(prev)
                }
                _ => None,
            })
        });
        match previous {
            Some(prev) => Bson::Document(overlay(row, prev)),
            None => Bson::Document(row.clone()),
        }
    }
}

/// Merge a freshly fetched document with the copy it replaces. Fresh values
/// win, except where the fresh side holds a raw key and the previous side an
/// already populated value.
fn overlay(fresh: &Document, previous: &Document) -> Document {
    let mut merged = fresh.clone();
    for (field, old) in previous {
        let value = match (merged.get(field), old) {
            (None, _) => old.clone(),
            (Some(Bson::Document(new)), Bson::Document(old)) => Bson::Document(overlay(new, old)),
            (Some(new), old) if is_populated(old) && !is_populated(new) => old.clone(),
            _ => continue,
        };
        merged.insert(field.clone(), value);
    }
    merged
}

fn is_populated(value: &Bson) -> bool {
    match value {
        Bson::Document(_) => true,
        Bson::Array(items) => items.iter().any(|item| matches!(item, Bson::Document(_))),
        _ => false,
    }
}

/// Keys carried by a local value: each element of an array, otherwise the
/// value itself.
fn key_values<'a>(value: &'a Bson, embedded: Option<&str>) -> Vec<&'a Bson> {
    match value {
        Bson::Array(items) => items
            .iter()
            .filter_map(|item| key_value(item, embedded))
            .collect(),
        other => key_value(other, embedded).into_iter().collect(),
    }
}

/// A populated document stands for its primary key.
fn key_value<'a>(value: &'a Bson, embedded: Option<&str>) -> Option<&'a Bson> {
    match (value, embedded) {
        (Bson::Document(doc), Some(field)) => doc.get(field),
        (other, _) => Some(other),
    }
}

/// Hashable form of a key value. Integers unify across widths and with
/// integral doubles, matching how filters compare numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Str(String),
    Int(i64),
    Float(u64),
    Bool(bool),
    ObjectId([u8; 12]),
    DateTime(i64),
    Other(String),
}

impl IndexKey {
    /// Key for a scalar value. Null, missing and array values have none.
    fn from_bson(value: &Bson) -> Option<Self> {
        let key = match value {
            Bson::Null | Bson::Undefined | Bson::Array(_) => return None,
            Bson::String(s) => Self::Str(s.clone()),
            Bson::Int32(n) => Self::Int(i64::from(*n)),
            Bson::Int64(n) => Self::Int(*n),
            Bson::Double(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Self::Int(*f as i64)
            }
            Bson::Double(f) => Self::Float(f.to_bits()),
            Bson::Boolean(b) => Self::Bool(*b),
            Bson::ObjectId(oid) => Self::ObjectId(oid.bytes()),
            Bson::DateTime(dt) => Self::DateTime(dt.timestamp_millis()),
            other => Self::Other(other.to_string()),
        };
        Some(key)
    }

    /// Keys a target value is indexed under: each element of an array,
    /// otherwise the value itself.
    fn all(value: &Bson) -> Vec<Self> {
        match value {
            Bson::Array(items) => items.iter().filter_map(Self::from_bson).collect(),
            other => Self::from_bson(other).into_iter().collect(),
        }
    }
}
