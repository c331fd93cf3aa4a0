//! Error types for filter, sort and query-builder operations.
//!
//! Every failure raised by the engine is a [`QueryError`] carrying:
//! - an [`ErrorCode`] for programmatic handling
//! - actionable suggestions for fixing the input or the catalog
//! - context about the field and operation involved
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Configuration errors (field not whitelisted, body-only endpoint, bad sort)
//! - 2xxx: Value errors (unparsable dates or numbers, blank values, bad enum tokens)
//! - 3xxx: Backend errors (raised by a query-builder implementation)
//!
//! ```rust
//! use sieve_query::{ErrorCategory, ErrorCode};
//!
//! assert_eq!(ErrorCode::FieldNotAllowed.code(), "S1001");
//! assert_eq!(ErrorCode::InvalidDate.category(), ErrorCategory::Value);
//! ```
//!
//! # Creating Errors
//!
//! ```rust
//! use sieve_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::field_not_allowed("password");
//! assert_eq!(err.code, ErrorCode::FieldNotAllowed);
//! assert!(err.is_configuration());
//!
//! let err = QueryError::empty_list("tags");
//! assert!(err.is_value_error());
//! assert!(err.to_string().contains("tags"));
//! ```

use std::fmt;
use thiserror::Error;

use crate::operator::Operator;

/// Result type for engine operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Broad classification of an [`ErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The catalog or the request shape does not allow the operation.
    Configuration,
    /// A raw value could not be parsed, coerced or validated.
    Value,
    /// The query-builder implementation rejected or failed the operation.
    Backend,
}

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration errors (1xxx)
    /// Field is not part of the filter whitelist (S1001).
    FieldNotAllowed = 1001,
    /// Filter cannot be driven from a request body (S1002).
    FilterNotBodyCapable = 1002,
    /// Endpoint only accepts a request body (S1003).
    BodyRequired = 1003,
    /// Sort instruction is missing a field or names an unknown one (S1004).
    InvalidSort = 1004,
    /// Body filter node has neither a field nor sub-filters (S1005).
    MalformedFilterNode = 1005,
    /// Invalid engine configuration (S1006).
    InvalidConfiguration = 1006,

    // Value errors (2xxx)
    /// Generic invalid value (S2001).
    InvalidValue = 2001,
    /// Date could not be parsed with the configured pattern (S2002).
    InvalidDate = 2002,
    /// Number could not be parsed or is out of range (S2003).
    InvalidNumber = 2003,
    /// Blank value where one is required (S2004).
    EmptyValue = 2004,
    /// Null value for an operator that needs one (S2005).
    MissingValue = 2005,
    /// Token is not one of the declared enum constants (S2006).
    InvalidEnumValue = 2006,
    /// IN-list is empty after splitting (S2007).
    EmptyList = 2007,
    /// Request body could not be read (S2008).
    InvalidBody = 2008,

    // Backend errors (3xxx)
    /// Error raised by the query-builder implementation (S3001).
    Backend = 3001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S1001").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get the category of this code.
    pub fn category(&self) -> ErrorCategory {
        match *self as u16 {
            1000..=1999 => ErrorCategory::Configuration,
            2000..=2999 => ErrorCategory::Value,
            _ => ErrorCategory::Backend,
        }
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FieldNotAllowed => "Field not allowed",
            Self::FilterNotBodyCapable => "Filter does not support body requests",
            Self::BodyRequired => "Request body required",
            Self::InvalidSort => "Invalid sort",
            Self::MalformedFilterNode => "Malformed filter node",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::InvalidValue => "Invalid value",
            Self::InvalidDate => "Invalid date",
            Self::InvalidNumber => "Invalid number",
            Self::EmptyValue => "Empty value",
            Self::MissingValue => "Missing value",
            Self::InvalidEnumValue => "Invalid enum value",
            Self::EmptyList => "Empty value list",
            Self::InvalidBody => "Invalid request body",
            Self::Backend => "Backend error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The external parameter or field involved.
    pub field: Option<String>,
    /// The raw value involved.
    pub value: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Create new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the operation.
    pub fn operation(mut self, op: impl Into<String>) -> Self {
        self.operation = Some(op.into());
        self
    }

    /// Set the field.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add a text suggestion.
    pub fn suggest(mut self, text: impl Into<String>) -> Self {
        self.suggestions.push(Suggestion::new(text));
        self
    }
}

/// Errors that can occur while turning input into query instructions.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the raw value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.context.value = Some(value.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Configuration Errors ==============

    /// The field is not part of the filter whitelist.
    pub fn field_not_allowed(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::FieldNotAllowed,
            format!("The field '{}' is not allowed", field),
        )
        .with_field(&field)
        .with_code_suggestion(
            "Register a filter for this parameter",
            format!("Filterable::new().with_filters([Filter::exact(\"{}\")])", field),
        )
    }

    /// The filter exists but cannot be driven from a request body.
    pub fn filter_not_body_capable(param: impl Into<String>, kind: &str) -> Self {
        let param = param.into();
        Self::new(
            ErrorCode::FilterNotBodyCapable,
            format!("The {} filter '{}' does not support body requests", kind, param),
        )
        .with_field(&param)
        .with_suggestion("Send this filter as a query parameter instead")
    }

    /// A body-only endpoint was invoked without a body.
    pub fn body_required(method: impl Into<String>) -> Self {
        let method = method.into();
        Self::new(
            ErrorCode::BodyRequired,
            format!("This endpoint only accepts a request body, got a {} request", method),
        )
        .with_help("Body-only mode rejects query-parameter filtering entirely")
    }

    /// A sort instruction without a field.
    pub fn sort_field_missing() -> Self {
        Self::new(
            ErrorCode::InvalidSort,
            "The sort list is not valid, one element has a null field",
        )
    }

    /// A sort instruction naming a field outside the sort whitelist.
    pub fn sort_field_not_valid(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(ErrorCode::InvalidSort, format!("The field '{}' is not valid", field))
            .with_field(&field)
            .with_suggestion("Add the field to the allowed sorts")
    }

    /// A body filter node with neither a field nor sub-filters.
    pub fn malformed_filter_node() -> Self {
        Self::new(
            ErrorCode::MalformedFilterNode,
            "The field and subFilters cannot be empty at the same time",
        )
    }

    /// Invalid engine configuration.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
    }

    // ============== Value Errors ==============

    /// Generic invalid value.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        Self::new(
            ErrorCode::InvalidValue,
            format!("Invalid value for '{}': {}", field, message),
        )
        .with_field(&field)
    }

    /// A date that could not be parsed with the configured pattern.
    pub fn invalid_date(
        value: impl Into<String>,
        field: impl Into<String>,
        pattern: &str,
        date_type: impl fmt::Display,
    ) -> Self {
        let value = value.into();
        let field = field.into();
        Self::new(
            ErrorCode::InvalidDate,
            format!(
                "Invalid date format for '{}' in filter '{}'. Expected pattern: {}, Date type: {}",
                value, field, pattern, date_type
            ),
        )
        .with_field(&field)
        .with_value(&value)
    }

    /// A number that could not be parsed or is out of range.
    pub fn invalid_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        Self::new(
            ErrorCode::InvalidNumber,
            format!("Invalid number '{}' for filter '{}'", value, field),
        )
        .with_field(&field)
        .with_value(&value)
    }

    /// A blank value where the filter needs one.
    pub fn empty_value(field: impl Into<String>, kind: &str) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::EmptyValue,
            format!("Value cannot be empty for {} filter '{}'", kind, field),
        )
        .with_field(&field)
    }

    /// A null value for an operator that requires one.
    pub fn missing_value(field: impl Into<String>, operator: Operator) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::MissingValue,
            format!("The value cannot be null for: {}", operator),
        )
        .with_field(&field)
        .with_suggestion("Only IS_NULL and IS_NOT_NULL may omit the value")
    }

    /// A token outside the declared enum constants.
    pub fn invalid_enum_value(
        value: impl Into<String>,
        field: impl Into<String>,
        allowed: &[impl AsRef<str>],
    ) -> Self {
        let value = value.into();
        let field = field.into();
        let allowed = allowed
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(
            ErrorCode::InvalidEnumValue,
            format!("Invalid value '{}' for {}. Allowed values: {}", value, field, allowed),
        )
        .with_field(&field)
        .with_value(&value)
    }

    /// An IN-list that is empty after splitting.
    pub fn empty_list(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::EmptyList,
            format!("Value list cannot be empty for IN filter '{}'", field),
        )
        .with_field(&field)
    }

    /// A request body that could not be read.
    pub fn invalid_body(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::InvalidBody, format!("Error reading body request: {}", message))
    }

    // ============== Backend Errors ==============

    /// An error raised by a query-builder implementation.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Backend, message)
    }

    // ============== Error Checks ==============

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }

    /// Check if this is a configuration error.
    pub fn is_configuration(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Check if this is a value error.
    pub fn is_value_error(&self) -> bool {
        self.category() == ErrorCategory::Value
    }

    /// Check if this error came from the backend.
    pub fn is_backend(&self) -> bool {
        self.category() == ErrorCategory::Backend
    }

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(ref value) = self.context.value {
            output.push_str(&format!("  → Value: {}\n", value));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!(
                        "     ```\n     {}\n     ```\n",
                        code.replace('\n', "\n     ")
                    ));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Extension trait for converting foreign errors into backend errors.
pub trait IntoQueryError {
    /// Convert to a QueryError.
    fn into_query_error(self) -> QueryError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoQueryError for E {
    fn into_query_error(self) -> QueryError {
        QueryError::backend(self.to_string()).with_source(self)
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
