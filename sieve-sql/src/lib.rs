//! # sieve-sql
//!
//! SQL backend for sieve filters.
//!
//! This crate provides:
//! - [`SqlQueryBuilder`], a [`QueryBuilder`](sieve_query::QueryBuilder) that renders
//!   parameterized `SELECT` and `COUNT` statements
//! - Placeholder and quoting rules for PostgreSQL, MySQL and SQLite
//! - The [`SqlExecutor`] seam for running statements
//! - A blocking PostgreSQL executor behind the `postgres` feature that coerces
//!   each value to the parameter type the server declares
//!
//! Identifiers are validated before they reach SQL text and every value is bound
//! as a parameter.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sieve_query::{Filter, Filterable, Sieve};
//! use sieve_sql::{Dialect, PgExecutor, SqlQueryBuilder};
//!
//! let client = postgres::Client::connect("host=localhost user=app", postgres::NoTls)?;
//! let builder = SqlQueryBuilder::new(PgExecutor::new(client), "users")?
//!     .with_dialect(Dialect::Postgres);
//!
//! let page = Sieve::new(builder)
//!     .allowed_filters([Filter::comparison("age"), Filter::partial("name")])
//!     .with_params(params)
//!     .page(20, 0)?;
//! ```

pub mod builder;
pub mod convert;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod statement;
#[cfg(feature = "postgres")]
pub mod types;

pub use builder::SqlQueryBuilder;
pub use convert::{SqlConnector, SqlOperator, SqlOrder, is_lossy};
pub use dialect::{Dialect, validate_identifier};
pub use error::{SqlError, SqlResult};
pub use executor::SqlExecutor;
pub use statement::{Condition, Operand, Statement, WhereClause};
#[cfg(feature = "postgres")]
pub use types::{PgExecutor, PgParam, bind_params};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::SqlQueryBuilder;
    pub use crate::dialect::Dialect;
    pub use crate::error::{SqlError, SqlResult};
    pub use crate::executor::SqlExecutor;
    pub use crate::statement::Statement;
}
