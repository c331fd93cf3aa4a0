//! # Sieve
//!
//! Whitelisted filtering, sorting and paging of list endpoints over any query
//! backend.
//!
//! Sieve provides:
//! - Filters with their own value syntax (`>=18`, `10-20`, `A,B`, `2024-01-01|2024-12-31`)
//! - Sorts from `name,-createdAt`
//! - Boolean filter trees from a JSON body
//! - One query-builder contract with SQL and MongoDB reference backends
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sieve::prelude::*;
//! use sieve::sql::{Dialect, SqlQueryBuilder};
//!
//! let builder = SqlQueryBuilder::new(executor, "users")?.with_dialect(Dialect::Postgres);
//!
//! let page = Sieve::for_request(builder, &request)
//!     .allowed_filters([
//!         Filter::comparison("age"),
//!         Filter::partial("name"),
//!         Filter::enumeration("status", ["ACTIVE", "INACTIVE"]),
//!     ])
//!     .allowed_sorts(["name", "createdAt"])
//!     .page(20, 0)?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Filter engine and query-builder contract.
pub mod query {
    pub use sieve_query::*;
}

/// SQL backend.
#[cfg(feature = "sql")]
#[cfg_attr(docsrs, doc(cfg(feature = "sql")))]
pub mod sql {
    pub use sieve_sql::*;
}

/// MongoDB backend.
#[cfg(feature = "mongodb")]
#[cfg_attr(docsrs, doc(cfg(feature = "mongodb")))]
pub mod mongodb {
    pub use sieve_mongodb::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use sieve_query::prelude::*;
}

// Re-export key types at the crate root
pub use sieve_query::{
    Filter, Filterable, Operator, Page, QueryBuilder, QueryError, QueryResult, Sieve, SieveConfig,
    Sortable,
};
