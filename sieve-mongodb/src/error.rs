//! Error types for the MongoDB adapter.

use sieve_query::QueryError;
use thiserror::Error;

/// Result type for MongoDB adapter operations.
pub type MongoResult<T> = Result<T, MongoError>;

/// Errors that can occur while compiling or executing MongoDB queries.
#[derive(Error, Debug)]
pub enum MongoError {
    /// A field path that cannot be used as a document key.
    #[error("invalid field path: '{0}'")]
    InvalidField(String),

    /// Query execution error reported by the executor.
    #[error("query error: {0}")]
    Query(String),

    /// Document serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MongoError {
    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField(field.into())
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this is an invalid field error.
    pub fn is_invalid_field(&self) -> bool {
        matches!(self, Self::InvalidField(_))
    }
}

impl From<MongoError> for QueryError {
    fn from(err: MongoError) -> Self {
        let message = err.to_string();
        let field = match &err {
            MongoError::InvalidField(field) => Some(field.clone()),
            _ => None,
        };
        let mut query_err = QueryError::backend(message).with_context("MongoDB backend");
        if let Some(field) = field {
            query_err = query_err.with_field(field);
        }
        query_err.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MongoError::invalid_field("$where");
        assert!(err.is_invalid_field());
        assert_eq!(err.to_string(), "invalid field path: '$where'");

        let err = MongoError::query("cursor killed");
        assert_eq!(err.to_string(), "query error: cursor killed");
    }

    #[test]
    fn test_into_query_error() {
        let query_err: QueryError = MongoError::invalid_field("$where").into();
        assert!(query_err.is_backend());
        assert_eq!(query_err.context.field.as_deref(), Some("$where"));

        let query_err: QueryError = MongoError::query("boom").into();
        assert!(query_err.is_backend());
        assert!(query_err.context.field.is_none());
    }
}
