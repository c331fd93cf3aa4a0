//! Mapping between the canonical vocabulary and MongoDB.
//!
//! MongoDB has no single-operator BETWEEN. It is folded into `$gte` on the
//! lower bound, which [`is_lossy`] reports.

use bson::Bson;
use sieve_query::{Combinator, Operator, SortDirection};
use std::fmt;

/// MongoDB query operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MongoOperator {
    /// `$eq`
    Eq,
    /// `$ne`
    Ne,
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
    /// `$regex`
    Regex,
    /// `$not` wrapping a regex
    NotRegex,
    /// `$in`
    In,
    /// `$nin`
    Nin,
    /// `$eq: null`
    IsNull,
    /// `$ne: null`
    NotNull,
}

impl MongoOperator {
    /// The operator key used in the filter document.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq | Self::IsNull => "$eq",
            Self::Ne | Self::NotNull => "$ne",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Regex => "$regex",
            Self::NotRegex => "$not",
            Self::In => "$in",
            Self::Nin => "$nin",
        }
    }
}

impl fmt::Display for MongoOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Operator> for MongoOperator {
    fn from(op: Operator) -> Self {
        match op {
            Operator::Equal => Self::Eq,
            Operator::Diff => Self::Ne,
            Operator::Greater => Self::Gt,
            Operator::GreaterOrEqual | Operator::Between => Self::Gte,
            Operator::Less => Self::Lt,
            Operator::LessOrEqual => Self::Lte,
            Operator::Like => Self::Regex,
            Operator::NotLike => Self::NotRegex,
            Operator::In => Self::In,
            Operator::NotIn => Self::Nin,
            Operator::IsNull => Self::IsNull,
            Operator::IsNotNull => Self::NotNull,
        }
    }
}

impl From<MongoOperator> for Operator {
    fn from(op: MongoOperator) -> Self {
        match op {
            MongoOperator::Eq => Self::Equal,
            MongoOperator::Ne => Self::Diff,
            MongoOperator::Gt => Self::Greater,
            MongoOperator::Gte => Self::GreaterOrEqual,
            MongoOperator::Lt => Self::Less,
            MongoOperator::Lte => Self::LessOrEqual,
            MongoOperator::Regex => Self::Like,
            MongoOperator::NotRegex => Self::NotLike,
            MongoOperator::In => Self::In,
            MongoOperator::Nin => Self::NotIn,
            MongoOperator::IsNull => Self::IsNull,
            MongoOperator::NotNull => Self::IsNotNull,
        }
    }
}

/// Whether converting `op` loses meaning.
pub const fn is_lossy(op: Operator) -> bool {
    matches!(op, Operator::Between)
}

/// MongoDB sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MongoSort {
    /// `1`
    Asc,
    /// `-1`
    Desc,
}

impl MongoSort {
    /// The sort document value.
    pub const fn value(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

impl From<MongoSort> for Bson {
    fn from(sort: MongoSort) -> Self {
        Bson::Int32(sort.value())
    }
}

impl From<SortDirection> for MongoSort {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

impl From<MongoSort> for SortDirection {
    fn from(sort: MongoSort) -> Self {
        match sort {
            MongoSort::Asc => Self::Asc,
            MongoSort::Desc => Self::Desc,
        }
    }
}

/// MongoDB logical connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MongoConnector {
    /// `$and`
    And,
    /// `$or`
    Or,
}

impl MongoConnector {
    /// The logical operator key.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

impl From<Combinator> for MongoConnector {
    fn from(combinator: Combinator) -> Self {
        match combinator {
            Combinator::And => Self::And,
            Combinator::Or => Self::Or,
        }
    }
}

impl From<MongoConnector> for Combinator {
    fn from(connector: MongoConnector) -> Self {
        match connector {
            MongoConnector::And => Self::And,
            MongoConnector::Or => Self::Or,
        }
    }
}
