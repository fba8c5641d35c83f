use bson::Bson;
use regex::Regex;

/// A recursive filter expression tree.
///
/// Owns field names and values so the expression can outlive the filter
/// document it was parsed from. Field names are dotted paths.
#[derive(Debug, Clone)]
pub enum Expression {
    // Logical
    And(Vec<Expression>),
    Or(Vec<Expression>),
    // Comparison
    Eq(String, Bson),
    Ne(String, Bson),
    Gt(String, Bson),
    Gte(String, Bson),
    Lt(String, Bson),
    Lte(String, Bson),
    // Membership
    In(String, Vec<Bson>),
    Nin(String, Vec<Bson>),
    // Pattern
    Regex(String, Regex),
    // Existence
    Exists(String, bool),
}
