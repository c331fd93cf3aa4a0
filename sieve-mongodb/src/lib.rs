//! # sieve-mongodb
//!
//! MongoDB backend for sieve filters.
//!
//! This crate provides:
//! - [`MongoQueryBuilder`], a [`QueryBuilder`](sieve_query::QueryBuilder) that compiles
//!   filters and sorts into BSON documents
//! - Conversions from filter values to BSON and from LIKE patterns to regexes
//! - The [`MongoExecutor`] seam for running `find` and `count`
//!
//! BETWEEN has no single MongoDB operator and is folded into `$gte` on the
//! lower bound; [`is_lossy`] reports it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sieve_mongodb::MongoQueryBuilder;
//! use sieve_query::{Filter, Sieve};
//!
//! let page = Sieve::new(MongoQueryBuilder::new(UsersCollection::new(collection)))
//!     .allowed_filters([Filter::comparison("age"), Filter::partial("name")])
//!     .allowed_sorts(["name", "age"])
//!     .with_params(params)
//!     .page(20, 0)?;
//! ```

pub mod builder;
pub mod convert;
pub mod error;
pub mod executor;
pub mod types;

pub use bson::{Bson, Document, doc};
pub use builder::{MongoQueryBuilder, validate_field};
pub use convert::{MongoConnector, MongoOperator, MongoSort, is_lossy};
pub use error::{MongoError, MongoResult};
pub use executor::{FindSpec, MongoExecutor};
pub use types::{filter_value_to_bson, filter_value_to_object_id, like_to_regex};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::builder::MongoQueryBuilder;
    pub use crate::error::{MongoError, MongoResult};
    pub use crate::executor::{FindSpec, MongoExecutor};
    pub use bson::{Bson, Document, doc};
}
