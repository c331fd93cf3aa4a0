//! The sort whitelist.
//!
//! Sorts arrive either as a compact string, `name,-createdAt`, where a leading
//! `-` means descending, or as explicit [`OrderRequest`]s from a body. Only
//! registered keys are accepted and each maps to a backend field path.
//!
//! ```rust
//! use sieve_query::{SortDirection, Sortable};
//!
//! let sorts = Sortable::new().with_sorts(["name", "createdAt"]);
//! assert!(sorts.find("createdAt").is_some());
//!
//! let parsed = Sortable::parse("-createdAt, name");
//! assert_eq!(parsed[0].field.as_deref(), Some("createdAt"));
//! assert_eq!(parsed[0].direction, SortDirection::Desc);
//! assert_eq!(parsed[1].direction, SortDirection::Asc);
//! ```

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::builder::ClauseBuilder;
use crate::error::{QueryError, QueryResult};
use crate::operator::SortDirection;
use crate::request::{OrderRequest, RequestSource};

/// A whitelisted sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    /// Key accepted from the client.
    pub external: String,
    /// Backend field path.
    pub internal: String,
}

impl OrderSpec {
    /// A key that maps to the field of the same name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            internal: name.clone(),
            external: name,
        }
    }

    /// A key that maps to a differently named field.
    pub fn mapped(external: impl Into<String>, internal: impl Into<String>) -> Self {
        Self {
            external: external.into(),
            internal: internal.into(),
        }
    }
}

impl From<&str> for OrderSpec {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for OrderSpec {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<(&str, &str)> for OrderSpec {
    fn from((external, internal): (&str, &str)) -> Self {
        Self::mapped(external, internal)
    }
}

/// An ordered set of whitelisted sort keys.
#[derive(Debug, Clone, Default)]
pub struct Sortable {
    sorts: Vec<OrderSpec>,
}

impl Sortable {
    /// Create an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register more sort keys.
    pub fn add_sorts<I, S>(&mut self, sorts: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OrderSpec>,
    {
        self.sorts.extend(sorts.into_iter().map(Into::into));
        self
    }

    /// Builder form of [`Sortable::add_sorts`].
    pub fn with_sorts<I, S>(mut self, sorts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OrderSpec>,
    {
        self.add_sorts(sorts);
        self
    }

    /// The entry registered for `external`.
    pub fn find(&self, external: &str) -> Option<&OrderSpec> {
        self.sorts.iter().find(|s| s.external == external)
    }

    /// Registered keys, in order.
    pub fn sorts(&self) -> &[OrderSpec] {
        &self.sorts
    }

    /// Whether no key is registered.
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// Parse the compact sort syntax.
    ///
    /// Tokens are comma separated and trimmed. Any number of leading `-`
    /// marks a descending sort. Empty tokens produce an instruction without
    /// a field.
    pub fn parse(raw: &str) -> Vec<OrderRequest> {
        raw.trim()
            .split(',')
            .map(|token| {
                let token = token.trim();
                let field = token.trim_start_matches('-');
                let direction = if field.len() < token.len() {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                OrderRequest {
                    field: (!field.is_empty()).then(|| field.to_string()),
                    direction,
                }
            })
            .collect()
    }

    /// Parse and apply a compact sort string.
    pub fn apply_str(&self, query: &mut dyn ClauseBuilder, raw: &str) -> QueryResult<()> {
        self.apply_orders(query, &Self::parse(raw))
    }

    /// Apply explicit sort instructions in order.
    ///
    /// Every instruction is resolved before the first one is applied.
    pub fn apply_orders(&self, query: &mut dyn ClauseBuilder, orders: &[OrderRequest]) -> QueryResult<()> {
        let mut resolved = Vec::with_capacity(orders.len());
        for order in orders {
            let field = order
                .field
                .as_deref()
                .ok_or_else(QueryError::sort_field_missing)?;
            let spec = self
                .find(field)
                .ok_or_else(|| QueryError::sort_field_not_valid(field))?;
            resolved.push((spec.internal.as_str(), order.direction));
        }

        for (field, direction) in resolved {
            trace!(field, direction = %direction, "Emitting order");
            query.order_by(field, direction)?;
        }
        Ok(())
    }

    /// Apply the sort parameter `param` of `request`, if present.
    pub fn apply_request(
        &self,
        query: &mut dyn ClauseBuilder,
        request: &dyn RequestSource,
        param: &str,
    ) -> QueryResult<()> {
        self.apply_optional(query, request.param(param))
    }

    /// Apply the sort parameter `param` of `params`, if present.
    pub fn apply_params(
        &self,
        query: &mut dyn ClauseBuilder,
        params: &HashMap<String, String>,
        param: &str,
    ) -> QueryResult<()> {
        self.apply_optional(query, params.get(param).map(String::as_str))
    }

    fn apply_optional(&self, query: &mut dyn ClauseBuilder, raw: Option<&str>) -> QueryResult<()> {
        match raw {
            Some(raw) if !raw.trim().is_empty() => {
                debug!(sort = raw, "Applying sort");
                self.apply_str(query, raw)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::request::MapRequest;
    use crate::testing::RecordingBuilder;
    use pretty_assertions::assert_eq;

    fn catalog() -> Sortable {
        Sortable::new().with_sorts([
            OrderSpec::new("name"),
            OrderSpec::new("createdAt"),
            OrderSpec::mapped("author", "author.name"),
        ])
    }

    #[test]
    fn test_parse_compact_syntax() {
        assert_eq!(
            Sortable::parse(" -createdAt , name,--author "),
            vec![
                OrderRequest::desc("createdAt"),
                OrderRequest::asc("name"),
                OrderRequest::desc("author"),
            ]
        );
    }

    #[test]
    fn test_apply_str_emits_in_order() {
        let mut q = RecordingBuilder::<()>::new();
        catalog().apply_str(&mut q, "-createdAt,name").unwrap();
        assert_eq!(
            q.orders(),
            vec![
                ("createdAt".to_string(), SortDirection::Desc),
                ("name".to_string(), SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_mapped_key_uses_internal_name() {
        let mut q = RecordingBuilder::<()>::new();
        catalog()
            .apply_orders(&mut q, &[OrderRequest::desc("author")])
            .unwrap();
        assert_eq!(
            q.orders(),
            vec![("author.name".to_string(), SortDirection::Desc)]
        );
    }

    #[test]
    fn test_missing_field_is_configuration_error() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_orders(&mut q, &[OrderRequest::default()])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSort);
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_field_rejects_whole_list() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog().apply_str(&mut q, "name,password").unwrap_err();
        assert!(err.message.contains("password"));
        assert!(q.is_empty());
    }

    #[test]
    fn test_dangling_comma_is_missing_field() {
        let mut q = RecordingBuilder::<()>::new();
        assert!(catalog().apply_str(&mut q, "name,").is_err());
    }

    #[test]
    fn test_request_and_params_skip_blank() {
        let mut q = RecordingBuilder::<()>::new();
        let req = MapRequest::get().with_param("sort", "  ");
        catalog().apply_request(&mut q, &req, "sort").unwrap();
        catalog().apply_params(&mut q, &HashMap::new(), "sort").unwrap();
        assert!(q.is_empty());

        let params = HashMap::from([("order".to_string(), "-name".to_string())]);
        catalog().apply_params(&mut q, &params, "order").unwrap();
        assert_eq!(q.orders(), vec![("name".to_string(), SortDirection::Desc)]);
    }
}
