//! # sieve-query
//!
//! Filter and sort expression engine with a backend-agnostic query contract.
//!
//! This crate turns untyped request input into validated, typed predicates
//! and order clauses, and hands them to any backend through one trait:
//! - Canonical operator vocabulary (`EQUAL`, `GREATER_OR_EQUAL`, `LIKE`, `IN`, ...)
//! - Whitelisted filters with their own value mini-languages
//! - Whitelisted sorts with the compact `name,-createdAt` syntax
//! - Recursive boolean filter trees from a JSON body
//! - A per-query orchestrator with input-source priority and paging
//!
//! ## Filters
//!
//! Register what an endpoint accepts, then apply raw input:
//!
//! ```rust
//! use sieve_query::{Filter, Operator};
//!
//! let age = Filter::comparison("age");
//! let predicates = age.predicates(">=18").unwrap();
//! assert_eq!(predicates[0].operator, Operator::GreaterOrEqual);
//!
//! let status = Filter::enumeration("status", ["ACTIVE", "PENDING", "INACTIVE"]);
//! let err = status.predicates("BOGUS").unwrap_err();
//! assert!(err.is_value_error());
//! ```
//!
//! ## Sorting
//!
//! ```rust
//! use sieve_query::{SortDirection, Sortable};
//!
//! let orders = Sortable::parse("-createdAt,name");
//! assert_eq!(orders[0].direction, SortDirection::Desc);
//! assert_eq!(orders[1].field.as_deref(), Some("name"));
//! ```
//!
//! ## Body Requests
//!
//! ```rust
//! use sieve_query::{BodyRequest, Combinator};
//!
//! let body = BodyRequest::from_json(r#"{
//!     "filters": [{"subFilters": [
//!         {"field": "name", "value": "ann%", "operator": "LIKE"},
//!         {"field": "email", "value": "ann%", "operator": "LIKE", "type": "OR"}
//!     ]}],
//!     "sorts": [{"field": "name", "sort": "DESC"}]
//! }"#).unwrap();
//!
//! assert_eq!(body.filters[0].children[1].combinator, Combinator::Or);
//! ```
//!
//! ## Backends
//!
//! A backend implements [`ClauseBuilder`] and [`QueryBuilder`]; the
//! `sieve-sql` and `sieve-mongodb` crates are reference implementations.
//!
//! ## Error Handling
//!
//! ```rust
//! use sieve_query::{ErrorCode, QueryError};
//!
//! let err = QueryError::field_not_allowed("password");
//! assert_eq!(err.code, ErrorCode::FieldNotAllowed);
//! assert!(err.is_configuration());
//! ```

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod filterable;
pub mod logging;
pub mod operator;
pub mod page;
pub mod request;
pub mod sortable;
pub mod syntax;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod value;

pub use builder::{ClauseBuilder, Predicate, QueryBuilder};
pub use config::{BodyMode, EnvSource, MapEnvSource, SieveConfig, StdEnvSource};
pub use engine::{InputSource, Sieve};
pub use error::{ErrorCategory, ErrorCode, ErrorContext, QueryError, QueryResult, Suggestion};
pub use filter::{CustomFn, DateKind, DateSpec, Filter, FilterEnum, FilterKind};
pub use filterable::Filterable;
pub use operator::{Combinator, LikeStrategy, Operator, SortDirection};
pub use page::Page;
pub use request::{BodyRequest, FilterNode, MapRequest, OrderRequest, RequestSource};
pub use sortable::{OrderSpec, Sortable};
pub use value::FilterValue;

pub use logging::{LogFormat, LogLevel, LogSettings};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::builder::{ClauseBuilder, Predicate, QueryBuilder};
    pub use crate::config::{BodyMode, SieveConfig};
    pub use crate::engine::Sieve;
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{DateKind, DateSpec, Filter, FilterEnum};
    pub use crate::filterable::Filterable;
    pub use crate::operator::{Combinator, LikeStrategy, Operator, SortDirection};
    pub use crate::page::Page;
    pub use crate::request::{BodyRequest, FilterNode, MapRequest, OrderRequest, RequestSource};
    pub use crate::sortable::{OrderSpec, Sortable};
    pub use crate::value::FilterValue;
}
