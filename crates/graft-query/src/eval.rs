use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::expression::Expression;
use crate::path::get_path;

/// Evaluate whether a document matches the given expression.
pub fn matches(doc: &Document, expr: &Expression) -> bool {
    match expr {
        Expression::And(children) => children.iter().all(|child| matches(doc, child)),
        Expression::Or(children) => children.iter().any(|child| matches(doc, child)),
        Expression::Eq(field, val) => field_eq(get_path(doc, field), val),
        Expression::Ne(field, val) => !field_eq(get_path(doc, field), val),
        Expression::In(field, vals) => {
            let field_value = get_path(doc, field);
            vals.iter().any(|val| field_eq(field_value, val))
        }
        Expression::Nin(field, vals) => {
            let field_value = get_path(doc, field);
            !vals.iter().any(|val| field_eq(field_value, val))
        }
        Expression::Gt(field, val)
        | Expression::Gte(field, val)
        | Expression::Lt(field, val)
        | Expression::Lte(field, val) => {
            let predicate: fn(Ordering) -> bool = match expr {
                Expression::Gt(..) => |o| o == Ordering::Greater,
                Expression::Gte(..) => |o| o != Ordering::Less,
                Expression::Lt(..) => |o| o == Ordering::Less,
                _ => |o| o != Ordering::Greater,
            };
            match get_path(doc, field) {
                Some(Bson::Array(arr)) => arr
                    .iter()
                    .any(|elem| value_cmp(elem, val).is_some_and(predicate)),
                Some(v) => value_cmp(v, val).is_some_and(predicate),
                None => false,
            }
        }
        Expression::Regex(field, re) => match get_path(doc, field) {
            Some(Bson::String(s)) => re.is_match(s),
            Some(Bson::Array(arr)) => arr
                .iter()
                .any(|elem| matches!(elem, Bson::String(s) if re.is_match(s))),
            _ => false,
        },
        Expression::Exists(field, expected) => {
            // presence only; a stored null counts as existing
            get_path(doc, field).is_some() == *expected
        }
    }
}

/// Field equality with MongoDB semantics: `null` matches missing fields, and an
/// array field matches when any element (or the whole array) equals the value.
fn field_eq(field_value: Option<&Bson>, query_val: &Bson) -> bool {
    match (field_value, query_val) {
        (None, Bson::Null) => true,
        (None, _) => false,
        (Some(Bson::Array(arr)), _) if !matches!(query_val, Bson::Array(_)) => {
            arr.iter().any(|elem| value_eq(elem, query_val))
        }
        (Some(v), _) => value_eq(v, query_val),
    }
}

/// Equality between a stored value and a query value.
pub(crate) fn value_eq(store_val: &Bson, query_val: &Bson) -> bool {
    match (store_val, query_val) {
        // ── Numeric cross-type matches ──────────────────────────
        (Bson::Int32(a), Bson::Int64(b)) => (*a as i64) == *b,
        (Bson::Int64(a), Bson::Int32(b)) => *a == (*b as i64),
        (Bson::Double(a), Bson::Int64(b)) => *a == (*b as f64),
        (Bson::Double(a), Bson::Int32(b)) => *a == (*b as f64),
        (Bson::Int64(a), Bson::Double(b)) => (*a as f64) == *b,
        (Bson::Int32(a), Bson::Double(b)) => (*a as f64) == *b,
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            a.timestamp_millis() == b.timestamp_millis()
        }

        // ── Same-type structural equality ───────────────────────
        (a, b) => a == b,
    }
}

/// Ordering between a stored value and a query value. `None` for
/// incompatible types, which silently excludes the document.
fn value_cmp(store_val: &Bson, query_val: &Bson) -> Option<Ordering> {
    match (store_val, query_val) {
        (Bson::Int32(a), Bson::Int32(b)) => Some(a.cmp(b)),
        (Bson::Int32(a), Bson::Int64(b)) => Some((*a as i64).cmp(b)),
        (Bson::Int64(a), Bson::Int64(b)) => Some(a.cmp(b)),
        (Bson::Int64(a), Bson::Int32(b)) => Some(a.cmp(&(*b as i64))),
        (Bson::Double(a), Bson::Double(b)) => a.partial_cmp(b),
        (Bson::Double(a), Bson::Int64(b)) => a.partial_cmp(&(*b as f64)),
        (Bson::Double(a), Bson::Int32(b)) => a.partial_cmp(&(*b as f64)),
        (Bson::Int64(a), Bson::Double(b)) => (*a as f64).partial_cmp(b),
        (Bson::Int32(a), Bson::Double(b)) => (*a as f64).partial_cmp(b),
        (Bson::DateTime(a), Bson::DateTime(b)) => {
            Some(a.timestamp_millis().cmp(&b.timestamp_millis()))
        }
        (Bson::String(a), Bson::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
