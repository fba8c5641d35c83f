mod eval;
mod expression;
mod parse_filter;
pub mod path;
mod select;

pub use eval::matches;
pub use expression::Expression;
pub use parse_filter::{FilterParseError, parse_filter};
pub use select::{Select, SelectParseError};
