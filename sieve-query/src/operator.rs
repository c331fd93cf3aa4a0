//! Canonical operator vocabulary shared by every filter and every backend.
//!
//! Each enum has a stable textual form (`EQUAL`, `GREATER_OR_EQUAL`, `AND`,
//! `ASC`, ...) used for body deserialization and `Display`. Parsing through
//! [`FromStr`] accepts the same names in any case.
//!
//! ```rust
//! use sieve_query::{LikeStrategy, Operator};
//!
//! let op: Operator = "greater_or_equal".parse().unwrap();
//! assert_eq!(op, Operator::GreaterOrEqual);
//! assert_eq!(op.to_string(), "GREATER_OR_EQUAL");
//!
//! assert_eq!(LikeStrategy::Complete.pattern("ann"), "%ann%");
//! assert_eq!(LikeStrategy::Final.pattern("a%n"), "a%n");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, QueryResult};

/// Comparison operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    /// Equal.
    #[default]
    Equal,
    /// Not equal.
    Diff,
    /// Greater than.
    Greater,
    /// Greater than or equal.
    GreaterOrEqual,
    /// Less than.
    Less,
    /// Less than or equal.
    LessOrEqual,
    /// Pattern match.
    Like,
    /// Negated pattern match.
    NotLike,
    /// In list.
    In,
    /// Not in list.
    NotIn,
    /// Is null.
    IsNull,
    /// Is not null.
    IsNotNull,
    /// Inclusive range.
    Between,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 13] = [
        Self::Equal,
        Self::Diff,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Like,
        Self::NotLike,
        Self::In,
        Self::NotIn,
        Self::IsNull,
        Self::IsNotNull,
        Self::Between,
    ];

    /// Stable textual form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Diff => "DIFF",
            Self::Greater => "GREATER",
            Self::GreaterOrEqual => "GREATER_OR_EQUAL",
            Self::Less => "LESS",
            Self::LessOrEqual => "LESS_OR_EQUAL",
            Self::Like => "LIKE",
            Self::NotLike => "NOT_LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT_IN",
            Self::IsNull => "IS_NULL",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::Between => "BETWEEN",
        }
    }

    /// Whether the operator ignores its value.
    #[inline]
    pub const fn is_null_check(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Whether the operator expects a list value.
    #[inline]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QueryError::invalid_value("operator", format!("unknown operator '{}'", s)))
    }
}

/// How a predicate joins the predicates emitted before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    /// Logical AND.
    #[default]
    And,
    /// Logical OR.
    Or,
}

impl Combinator {
    /// Stable textual form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Combinator {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(QueryError::invalid_value(
                "type",
                format!("unknown combinator '{}'", s),
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Stable textual form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> QueryResult<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(QueryError::invalid_value(
                "sort",
                format!("unknown sort direction '{}'", s),
            )),
        }
    }
}

/// Where the `%` wildcard goes around a LIKE value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LikeStrategy {
    /// `value%`
    #[default]
    Final,
    /// `%value`
    Start,
    /// `%value%`
    Complete,
}

impl LikeStrategy {
    /// Build the LIKE pattern for `value`.
    ///
    /// A value that already contains `%` is used verbatim.
    pub fn pattern(&self, value: &str) -> String {
        if value.contains('%') {
            return value.to_string();
        }
        match self {
            Self::Final => format!("{}%", value),
            Self::Start => format!("%{}", value),
            Self::Complete => format!("%{}%", value),
        }
    }
}
