use bson::{Bson, Document};
use regex::{Regex, RegexBuilder};

use crate::expression::Expression;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("filter parse error: {0}")]
pub struct FilterParseError(pub String);

fn fail<T>(message: impl Into<String>) -> Result<T, FilterParseError> {
    Err(FilterParseError(message.into()))
}

/// Parse a filter document into an [`Expression`].
///
/// Entries of a document are AND-ed; an empty document is an empty `And` and
/// matches everything. A field mapped to a plain value is an equality test; a
/// field mapped to a document of `$`-operators is parsed operator by operator.
/// `$and` and `$or` take arrays of filter documents.
pub fn parse_filter(doc: &Document) -> Result<Expression, FilterParseError> {
    let mut clauses = doc
        .iter()
        .map(|(key, value)| parse_clause(key, value))
        .collect::<Result<Vec<_>, _>>()?;

    if clauses.len() == 1 {
        return Ok(clauses.swap_remove(0));
    }
    Ok(Expression::And(clauses))
}

fn parse_clause(key: &str, value: &Bson) -> Result<Expression, FilterParseError> {
    match key {
        "$and" => Ok(Expression::And(parse_branches(key, value)?)),
        "$or" => Ok(Expression::Or(parse_branches(key, value)?)),
        op if op.starts_with('$') => fail(format!("unknown top-level operator: {op}")),
        field => match value {
            Bson::Document(ops) if ops.keys().next().is_some_and(|k| k.starts_with('$')) => {
                parse_operators(field, ops)
            }
            other => Ok(Expression::Eq(field.to_string(), other.clone())),
        },
    }
}

fn parse_branches(op: &str, value: &Bson) -> Result<Vec<Expression>, FilterParseError> {
    let Bson::Array(items) = value else {
        return fail(format!("{op} expects an array"));
    };
    if items.is_empty() {
        return fail(format!("{op} expects at least one filter"));
    }
    items
        .iter()
        .map(|item| match item {
            Bson::Document(branch) => parse_filter(branch),
            _ => fail(format!("{op} elements must be documents")),
        })
        .collect()
}

fn parse_operators(field: &str, ops: &Document) -> Result<Expression, FilterParseError> {
    if ops.contains_key("$regex") {
        return parse_regex(field, ops);
    }

    let mut conditions = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let field = field.to_string();
        let operand = operand.clone();
        conditions.push(match op.as_str() {
            "$eq" => Expression::Eq(field, operand),
            "$ne" => Expression::Ne(field, operand),
            "$gt" => Expression::Gt(field, operand),
            "$gte" => Expression::Gte(field, operand),
            "$lt" => Expression::Lt(field, operand),
            "$lte" => Expression::Lte(field, operand),
            "$in" | "$nin" => {
                let Bson::Array(values) = operand else {
                    return fail(format!("{op} expects an array"));
                };
                if op == "$in" {
                    Expression::In(field, values)
                } else {
                    Expression::Nin(field, values)
                }
            }
            "$exists" => match operand {
                Bson::Boolean(present) => Expression::Exists(field, present),
                _ => return fail("$exists expects a boolean"),
            },
            "$options" => return fail("$options needs $regex"),
            other => return fail(format!("unknown field operator: {other}")),
        });
    }

    if conditions.len() == 1 {
        return Ok(conditions.swap_remove(0));
    }
    Ok(Expression::And(conditions))
}

/// `{ "$regex": pattern, "$options": flags }`; flags are a subset of `imsx`.
fn parse_regex(field: &str, ops: &Document) -> Result<Expression, FilterParseError> {
    let mut pattern = None;
    let mut flags = "";
    for (op, operand) in ops {
        match (op.as_str(), operand) {
            ("$regex", Bson::String(p)) => pattern = Some(p.as_str()),
            ("$options", Bson::String(f)) => flags = f.as_str(),
            ("$regex" | "$options", _) => return fail(format!("{op} expects a string")),
            (other, _) => return fail(format!("{other} cannot be combined with $regex")),
        }
    }
    let Some(pattern) = pattern else {
        return fail("$regex expects a pattern");
    };
    Ok(Expression::Regex(field.to_string(), compile(pattern, flags)?))
}

fn compile(pattern: &str, flags: &str) -> Result<Regex, FilterParseError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => return fail(format!("unknown regex option: {other}")),
        };
    }
    builder
        .build()
        .map_err(|e| FilterParseError(format!("invalid regex: {e}")))
}
