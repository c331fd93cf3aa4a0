//! Mapping between the canonical vocabulary and SQL.
//!
//! Every canonical operator has an exact SQL counterpart, so no mapping here
//! is lossy.
//!
//! ```rust
//! use sieve_query::Operator;
//! use sieve_sql::SqlOperator;
//!
//! let op = SqlOperator::from(Operator::NotLike);
//! assert_eq!(op.as_sql(), "NOT LIKE");
//! assert_eq!(Operator::from(op), Operator::NotLike);
//! ```

use sieve_query::{Combinator, Operator, SortDirection};
use std::fmt;

/// SQL comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlOperator {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS NULL`
    IsNull,
    /// `IS NOT NULL`
    IsNotNull,
    /// `BETWEEN`
    Between,
}

impl SqlOperator {
    /// The SQL keyword or symbol.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Between => "BETWEEN",
        }
    }
}

impl fmt::Display for SqlOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl From<Operator> for SqlOperator {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Equal => Self::Eq,
            Operator::Diff => Self::NotEq,
            Operator::Greater => Self::Gt,
            Operator::GreaterOrEqual => Self::Gte,
            Operator::Less => Self::Lt,
            Operator::LessOrEqual => Self::Lte,
            Operator::Like => Self::Like,
            Operator::NotLike => Self::NotLike,
            Operator::In => Self::In,
            Operator::NotIn => Self::NotIn,
            Operator::IsNull => Self::IsNull,
            Operator::IsNotNull => Self::IsNotNull,
            Operator::Between => Self::Between,
        }
    }
}

impl From<SqlOperator> for Operator {
    fn from(op: SqlOperator) -> Self {
        match op {
            SqlOperator::Eq => Self::Equal,
            SqlOperator::NotEq => Self::Diff,
            SqlOperator::Gt => Self::Greater,
            SqlOperator::Gte => Self::GreaterOrEqual,
            SqlOperator::Lt => Self::Less,
            SqlOperator::Lte => Self::LessOrEqual,
            SqlOperator::Like => Self::Like,
            SqlOperator::NotLike => Self::NotLike,
            SqlOperator::In => Self::In,
            SqlOperator::NotIn => Self::NotIn,
            SqlOperator::IsNull => Self::IsNull,
            SqlOperator::IsNotNull => Self::IsNotNull,
            SqlOperator::Between => Self::Between,
        }
    }
}

/// Whether converting `op` loses meaning. Always `false` for SQL.
pub const fn is_lossy(_op: Operator) -> bool {
    false
}

/// SQL sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlOrder {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SqlOrder {
    /// The SQL keyword.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl From<SortDirection> for SqlOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

impl From<SqlOrder> for SortDirection {
    fn from(order: SqlOrder) -> Self {
        match order {
            SqlOrder::Asc => Self::Asc,
            SqlOrder::Desc => Self::Desc,
        }
    }
}

/// SQL boolean connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlConnector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl SqlConnector {
    /// The SQL keyword.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl From<Combinator> for SqlConnector {
    fn from(combinator: Combinator) -> Self {
        match combinator {
            Combinator::And => Self::And,
            Combinator::Or => Self::Or,
        }
    }
}

impl From<SqlConnector> for Combinator {
    fn from(connector: SqlConnector) -> Self {
        match connector {
            SqlConnector::And => Self::And,
            SqlConnector::Or => Self::Or,
        }
    }
}
