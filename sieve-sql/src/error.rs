//! Error types for the SQL adapter.

use sieve_query::QueryError;
use thiserror::Error;

/// Result type for SQL adapter operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors that can occur while compiling or executing SQL.
#[derive(Error, Debug)]
pub enum SqlError {
    /// A table, column or field path that cannot be used as an identifier.
    #[error("unsafe identifier: '{0}'")]
    UnsafeIdentifier(String),

    /// BETWEEN without exactly two bounds.
    #[error("BETWEEN on '{field}' needs a list of exactly two values, got {got}")]
    InvalidBetween {
        /// The field path.
        field: String,
        /// What was supplied.
        got: String,
    },

    /// A bound value that cannot be converted to its parameter's type.
    #[error("parameter ${position} expects {expected}, got '{value}'")]
    Parameter {
        /// One-based placeholder position.
        position: usize,
        /// Declared parameter type.
        expected: String,
        /// The value that was supplied.
        value: String,
    },

    /// Statement execution error reported by the executor.
    #[error("execution error: {0}")]
    Execution(String),

    /// Row decoding error reported by the executor.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SqlError {
    /// Create an unsafe identifier error.
    pub fn unsafe_identifier(name: impl Into<String>) -> Self {
        Self::UnsafeIdentifier(name.into())
    }

    /// Create a parameter conversion error.
    pub fn parameter(
        position: usize,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Parameter {
            position,
            expected: expected.into(),
            value: value.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Check if this error was raised while compiling, before execution.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::UnsafeIdentifier(_) | Self::InvalidBetween { .. })
    }
}

impl From<SqlError> for QueryError {
    fn from(err: SqlError) -> Self {
        let message = err.to_string();
        let field = match &err {
            SqlError::UnsafeIdentifier(name) => Some(name.clone()),
            SqlError::InvalidBetween { field, .. } => Some(field.clone()),
            _ => None,
        };
        let mut query_err = QueryError::backend(message).with_context("SQL backend");
        if let Some(field) = field {
            query_err = query_err.with_field(field);
        }
        query_err.with_source(err)
    }
}
