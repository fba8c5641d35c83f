//! Dotted-path access into nested documents.
//!
//! `"address.city"` walks through embedded documents. Reads never fail: a
//! missing segment or a non-document intermediate simply yields `None`.
//! Writes only ever add fields: they create missing intermediates and never
//! replace an existing value that is in the way.

use bson::{Bson, Document};

/// Read the value at a dotted path.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Bson::Document(sub) => sub.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at a dotted path, once for every document
/// [`for_each_parent_mut`] reaches.
pub fn set_path(doc: &mut Document, path: &str, value: Bson) {
    for_each_parent_mut(doc, path, &mut |parent: &mut Document, leaf: &str| {
        parent.insert(leaf, value.clone());
    });
}

/// Call `f` with every value found at a dotted path. An array met before the
/// last segment is entered element by element; its non-document elements
/// are skipped.
pub fn for_each_value<'a, F>(doc: &'a Document, path: &str, f: &mut F)
where
    F: FnMut(&'a Bson),
{
    let Some((head, rest)) = path.split_once('.') else {
        if let Some(value) = doc.get(path) {
            f(value);
        }
        return;
    };
    match doc.get(head) {
        Some(Bson::Document(sub)) => for_each_value(sub, rest, f),
        Some(Bson::Array(items)) => {
            for item in items {
                if let Bson::Document(sub) = item {
                    for_each_value(sub, rest, f);
                }
            }
        }
        _ => {}
    }
}

/// Call `f` with every document that holds the last segment of a dotted
/// path, plus that segment.
///
/// Missing or null intermediates become empty documents. Arrays are entered
/// element by element. Any other value in the way is left as it is and the
/// branch is skipped.
pub fn for_each_parent_mut<F>(doc: &mut Document, path: &str, f: &mut F)
where
    F: FnMut(&mut Document, &str),
{
    let Some((head, rest)) = path.split_once('.') else {
        f(doc, path);
        return;
    };
    if matches!(doc.get(head), None | Some(Bson::Null)) {
        doc.insert(head, Document::new());
    }
    match doc.get_mut(head) {
        Some(Bson::Document(sub)) => for_each_parent_mut(sub, rest, f),
        Some(Bson::Array(items)) => {
            for item in items.iter_mut() {
                if let Bson::Document(sub) = item {
                    for_each_parent_mut(sub, rest, f);
                }
            }
        }
        _ => {}
    }
}

/// Remove and return the value at a dotted path, if present.
pub fn remove_path(doc: &mut Document, path: &str) -> Option<Bson> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head) {
            Some(Bson::Document(sub)) => remove_path(sub, rest),
            _ => None,
        },
    }
}
