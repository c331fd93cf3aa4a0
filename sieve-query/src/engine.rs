//! The per-query orchestrator.
//!
//! A [`Sieve`] binds one [`QueryBuilder`] to a filter whitelist and a sort
//! whitelist, picks the input to read, applies it and runs the terminal
//! operation.
//!
//! # Input priority
//!
//! 1. the explicit parameter map ([`Sieve::with_params`])
//! 2. the request body, when body mode is on and the request method carries one
//! 3. the request's query parameters, unless body mode is [`BodyMode::Only`]
//! 4. nothing
//!
//! ```rust,ignore
//! use sieve_query::{Filter, MapRequest, Sieve};
//!
//! let request = MapRequest::get().with_params([("age", ">=18"), ("sort", "-name")]);
//!
//! let users = Sieve::for_request(UserQuery::new(&pool), &request)
//!     .allowed_filters([Filter::comparison("age")])
//!     .allowed_sorts(["name"])
//!     .page(20, 0)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::builder::QueryBuilder;
use crate::config::{BodyMode, SieveConfig};
use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::filterable::Filterable;
use crate::page::Page;
use crate::request::{BodyRequest, RequestSource};
use crate::sortable::{OrderSpec, Sortable};

/// The input a [`Sieve`] reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The explicit parameter map.
    Params,
    /// The request body.
    Body,
    /// The request's query parameters.
    Request,
    /// No input; nothing is applied.
    Nothing,
}

/// Orchestrates filtering and sorting for one query.
pub struct Sieve<'r, Q: QueryBuilder> {
    builder: Q,
    filterable: Arc<Filterable>,
    sortable: Arc<Sortable>,
    config: SieveConfig,
    request: Option<&'r dyn RequestSource>,
    params: Option<HashMap<String, String>>,
}

impl<Q: QueryBuilder> Sieve<'static, Q> {
    /// Wrap a builder with no request attached.
    pub fn new(builder: Q) -> Self {
        Self {
            builder,
            filterable: Arc::default(),
            sortable: Arc::default(),
            config: SieveConfig::default(),
            request: None,
            params: None,
        }
    }
}

impl<'r, Q: QueryBuilder> Sieve<'r, Q> {
    /// Wrap a builder and read input from `request`.
    pub fn for_request(builder: Q, request: &'r dyn RequestSource) -> Self {
        Sieve::new(builder).with_request(request)
    }

    /// Attach a request.
    pub fn with_request<'a>(self, request: &'a dyn RequestSource) -> Sieve<'a, Q> {
        Sieve {
            builder: self.builder,
            filterable: self.filterable,
            sortable: self.sortable,
            config: self.config,
            request: Some(request),
            params: self.params,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: SieveConfig) -> Self {
        self.config = config;
        self
    }

    /// Read input from `params`, ahead of any request.
    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = Some(params);
        self
    }

    /// Add one entry to the explicit parameter map.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Use a shared filter whitelist.
    pub fn with_filterable(mut self, filterable: Arc<Filterable>) -> Self {
        self.filterable = filterable;
        self
    }

    /// Use a shared sort whitelist.
    pub fn with_sortable(mut self, sortable: Arc<Sortable>) -> Self {
        self.sortable = sortable;
        self
    }

    /// Allow more filters for this query.
    pub fn allowed_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        Arc::make_mut(&mut self.filterable).add_filters(filters);
        self
    }

    /// Allow more sort keys for this query.
    pub fn allowed_sorts<I, S>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OrderSpec>,
    {
        Arc::make_mut(&mut self.sortable).add_sorts(sorts);
        self
    }

    /// Replace the projection.
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.builder.select(fields);
        self
    }

    /// Extend the projection.
    pub fn add_select(mut self, fields: &[&str]) -> Self {
        self.builder.add_select(fields);
        self
    }

    /// Read filters from the body of body-bearing requests.
    pub fn use_body(mut self) -> Self {
        self.config.body_mode = BodyMode::Enabled;
        self
    }

    /// Read filters from the body only and reject any other request.
    pub fn use_only_body(mut self) -> Self {
        self.config.body_mode = BodyMode::Only;
        self
    }

    /// Work on the builder directly.
    pub fn builder(mut self, f: impl FnOnce(&mut Q)) -> Self {
        f(&mut self.builder);
        self
    }

    /// Borrow the builder.
    pub fn builder_ref(&self) -> &Q {
        &self.builder
    }

    /// Mutably borrow the builder.
    pub fn builder_mut(&mut self) -> &mut Q {
        &mut self.builder
    }

    /// The builder's accumulated predicates in backend form.
    pub fn where_conditions(&self) -> Q::Conditions {
        self.builder.where_conditions()
    }

    /// The active configuration.
    pub fn config(&self) -> &SieveConfig {
        &self.config
    }

    /// Decide which input [`Sieve::apply`] will read.
    pub fn input_source(&self) -> QueryResult<InputSource> {
        if self.params.is_some() {
            return Ok(InputSource::Params);
        }
        let body_bearing = self
            .request
            .is_some_and(|r| self.config.is_body_method(r.method()));

        match (self.config.body_mode, self.request) {
            (BodyMode::Enabled | BodyMode::Only, Some(_)) if body_bearing => Ok(InputSource::Body),
            (BodyMode::Only, request) => Err(QueryError::body_required(
                request.map_or("missing", |r| r.method()),
            )),
            (_, Some(_)) => Ok(InputSource::Request),
            (_, None) => Ok(InputSource::Nothing),
        }
    }

    /// Apply filters and sorts and return the configured builder.
    pub fn apply(mut self) -> QueryResult<Q> {
        self.apply_input()?;
        Ok(self.builder)
    }

    fn apply_input(&mut self) -> QueryResult<()> {
        let source = self.input_source()?;
        debug!(source = ?source, "Selected filter input");

        let query = &mut self.builder;
        match source {
            InputSource::Params => {
                if let Some(params) = &self.params {
                    self.filterable.apply_params(query, params)?;
                    self.sortable
                        .apply_params(query, params, &self.config.sort_param)?;
                }
            }
            InputSource::Body => {
                let body = match self.request {
                    Some(request) => request.body()?,
                    None => BodyRequest::default(),
                };
                self.filterable.apply_body(query, &body.filters)?;
                self.sortable.apply_orders(query, &body.sorts)?;
            }
            InputSource::Request => {
                if let Some(request) = self.request {
                    self.filterable.apply_request(query, request)?;
                    self.sortable
                        .apply_request(query, request, &self.config.sort_param)?;
                }
            }
            InputSource::Nothing => {}
        }
        Ok(())
    }

    /// Apply and fetch every matching record.
    pub fn get(mut self) -> QueryResult<Vec<Q::Item>> {
        self.apply_input()?;
        self.builder.get()
    }

    /// Apply and fetch one page.
    ///
    /// The explicit parameter map may override `limit` and `offset`. An
    /// override that does not parse is ignored.
    pub fn page(mut self, limit: u32, offset: u64) -> QueryResult<Page<Q::Item>> {
        self.apply_input()?;
        let limit = self.page_override(&self.config.limit_param, limit);
        let offset = self.page_override(&self.config.offset_param, offset);
        self.builder.page(limit, offset)
    }

    /// [`Sieve::page`] at offset zero.
    pub fn first_page(self, limit: u32) -> QueryResult<Page<Q::Item>> {
        self.page(limit, 0)
    }

    /// Apply and fetch the first matching record.
    pub fn find_first(mut self) -> QueryResult<Option<Q::Item>> {
        self.apply_input()?;
        self.builder.find_first()
    }

    fn page_override<T: std::str::FromStr + Copy>(&self, key: &str, fallback: T) -> T {
        let Some(raw) = self.params.as_ref().and_then(|p| p.get(key)) else {
            return fallback;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "Ignoring unparsable page override");
                fallback
            }
        }
    }
}
