//! The filter whitelist.
//!
//! A [`Filterable`] holds the filters an endpoint accepts, in registration
//! order, and applies them from one of three inputs:
//!
//! - a [`RequestSource`]'s query parameters ([`Filterable::apply_request`])
//! - a flat parameter map ([`Filterable::apply_params`])
//! - a body filter tree ([`Filterable::apply_body`])
//!
//! Parameters that match no registered filter are ignored on the first two
//! paths and rejected on the body path.
//!
//! ```rust
//! use sieve_query::{Filter, Filterable, FilterNode, Operator};
//!
//! let filters = Filterable::new().with_filters([
//!     Filter::comparison("age"),
//!     Filter::partial("name").with_internal_name("user.name"),
//! ]);
//!
//! assert!(filters.find("age").is_some());
//! assert!(filters.find("password").is_none());
//! ```

use std::collections::HashMap;
use tracing::{debug, trace};

use crate::builder::ClauseBuilder;
use crate::error::{QueryError, QueryResult};
use crate::filter::Filter;
use crate::request::{FilterNode, RequestSource};
use crate::value::FilterValue;

/// An ordered set of whitelisted filters.
#[derive(Debug, Clone, Default)]
pub struct Filterable {
    filters: Vec<Filter>,
}

impl Filterable {
    /// Create an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register more filters, keeping insertion order.
    pub fn add_filters(&mut self, filters: impl IntoIterator<Item = Filter>) -> &mut Self {
        self.filters.extend(filters);
        self
    }

    /// Builder form of [`Filterable::add_filters`].
    pub fn with_filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.add_filters(filters);
        self
    }

    /// The filter registered for `param`.
    pub fn find(&self, param: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.param() == param)
    }

    /// Registered filters, in order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether no filter is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply every filter whose parameter is present on `request`.
    ///
    /// A blank value (`age=`) counts as absent: the filter's default applies
    /// if it has one, otherwise the filter is skipped. Blank values therefore
    /// never reach a filter and never raise [`ErrorCode::EmptyValue`].
    ///
    /// [`ErrorCode::EmptyValue`]: crate::ErrorCode::EmptyValue
    pub fn apply_request(
        &self,
        query: &mut dyn ClauseBuilder,
        request: &dyn RequestSource,
    ) -> QueryResult<()> {
        self.apply_lookup(query, |param| request.param(param))
    }

    /// Apply every filter whose parameter is present in `params`.
    ///
    /// Blank values are treated as in [`Filterable::apply_request`].
    pub fn apply_params(
        &self,
        query: &mut dyn ClauseBuilder,
        params: &HashMap<String, String>,
    ) -> QueryResult<()> {
        self.apply_lookup(query, |param| params.get(param).map(String::as_str))
    }

    fn apply_lookup<'a>(
        &self,
        query: &mut dyn ClauseBuilder,
        lookup: impl Fn(&str) -> Option<&'a str>,
    ) -> QueryResult<()> {
        for filter in &self.filters {
            let raw = lookup(filter.param())
                .filter(|v| !v.trim().is_empty())
                .or_else(|| filter.default_value());

            let Some(raw) = raw else {
                continue;
            };
            if filter.is_ignored(raw) {
                trace!(param = filter.param(), value = raw, "Skipping ignored value");
                continue;
            }

            debug!(param = filter.param(), kind = filter.kind().name(), "Applying filter");
            filter
                .apply(query, raw)
                .map_err(|e| e.with_context(format!("Applying filter '{}'", filter.param())))?;
        }
        Ok(())
    }

    /// Apply a body filter tree.
    ///
    /// Groups recurse into their children. Each leaf must name a registered,
    /// body-capable filter, and joins its siblings with its own combinator.
    pub fn apply_body(&self, query: &mut dyn ClauseBuilder, nodes: &[FilterNode]) -> QueryResult<()> {
        for node in nodes {
            self.apply_node(query, node)?;
        }
        Ok(())
    }

    fn apply_node(&self, query: &mut dyn ClauseBuilder, node: &FilterNode) -> QueryResult<()> {
        if node.is_group() {
            return self.apply_body(query, &node.children);
        }
        let Some(field) = node.field.as_deref() else {
            return Err(QueryError::malformed_filter_node());
        };

        let filter = self
            .find(field)
            .ok_or_else(|| QueryError::field_not_allowed(field))?;
        if !filter.supports_body_operation() {
            return Err(QueryError::filter_not_body_capable(field, filter.kind().name()));
        }

        let value = if node.operator.is_null_check() {
            FilterValue::Null
        } else {
            let Some(raw) = node.value.as_deref() else {
                return Err(QueryError::missing_value(field, node.operator));
            };
            if filter.is_ignored(raw) {
                trace!(param = field, value = raw, "Skipping ignored body value");
                return Ok(());
            }
            if node.operator.is_list() {
                let items = raw
                    .split(',')
                    .map(|item| filter.transform(item.trim()))
                    .collect::<QueryResult<Vec<_>>>()?;
                FilterValue::List(items)
            } else {
                filter.transform(raw)?
            }
        };

        debug!(
            param = field,
            operator = %node.operator,
            combinator = %node.combinator,
            "Applying body filter"
        );
        query.r#where(filter.internal_name(), node.operator, value, node.combinator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Predicate;
    use crate::error::ErrorCode;
    use crate::operator::{Combinator, Operator};
    use crate::request::MapRequest;
    use crate::testing::RecordingBuilder;
    use pretty_assertions::assert_eq;

    fn catalog() -> Filterable {
        Filterable::new().with_filters([
            Filter::comparison("age"),
            Filter::partial("name").with_internal_name("user.name"),
            Filter::exact("status").with_default("ACTIVE").with_ignored(["ALL"]),
            Filter::default_search(["name", "email"]),
            Filter::exact("id"),
        ])
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_params_apply_in_registration_order() {
        let mut q = RecordingBuilder::<()>::new();
        catalog()
            .apply_params(&mut q, &params(&[("name", "jo"), ("age", ">=18"), ("other", "x")]))
            .unwrap();

        assert_eq!(
            q.predicates(),
            vec![
                Predicate::and("age", Operator::GreaterOrEqual, "18"),
                Predicate::and("user.name", Operator::Like, "jo%"),
                Predicate::and("status", Operator::Equal, "ACTIVE"),
            ]
        );
    }

    #[test]
    fn test_blank_value_falls_back_to_default() {
        let mut q = RecordingBuilder::<()>::new();
        catalog()
            .apply_params(&mut q, &params(&[("status", "  "), ("age", "")]))
            .unwrap();
        assert_eq!(
            q.predicates(),
            vec![Predicate::and("status", Operator::Equal, "ACTIVE")]
        );
    }

    #[test]
    fn test_blank_request_value_skips_without_error() {
        let request = MapRequest::get().with_params([("age", ""), ("name", "  ")]);
        let mut q = RecordingBuilder::<()>::new();
        catalog().apply_request(&mut q, &request).unwrap();
        assert_eq!(
            q.predicates(),
            vec![Predicate::and("status", Operator::Equal, "ACTIVE")]
        );
    }

    #[test]
    fn test_ignored_value_skips() {
        let mut q = RecordingBuilder::<()>::new();
        catalog()
            .apply_params(&mut q, &params(&[("status", " ALL ")]))
            .unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn test_request_path_matches_params_path() {
        let req = MapRequest::get().with_params([("age", "<5"), ("search", "ann")]);
        let mut from_request = RecordingBuilder::<()>::new();
        catalog().apply_request(&mut from_request, &req).unwrap();

        let mut from_params = RecordingBuilder::<()>::new();
        catalog()
            .apply_params(&mut from_params, &params(&[("age", "<5"), ("search", "ann")]))
            .unwrap();

        assert_eq!(from_request.predicates(), from_params.predicates());
        assert_eq!(from_request.predicates().len(), 4);
    }

    #[test]
    fn test_value_error_carries_context() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_params(&mut q, &params(&[("age", ">=")]))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyValue);
        assert_eq!(err.context.operation.as_deref(), Some("Applying filter 'age'"));
    }

    #[test]
    fn test_body_leaves_and_groups() {
        let nodes = vec![
            FilterNode::leaf("id", Operator::In, "1, 2,abc"),
            FilterNode::group([
                FilterNode::leaf("name", Operator::Like, "ann%"),
                FilterNode::null_check("status", Operator::IsNull).or(),
            ]),
        ];
        let mut q = RecordingBuilder::<()>::new();
        catalog().apply_body(&mut q, &nodes).unwrap();

        assert_eq!(
            q.predicates(),
            vec![
                Predicate::and(
                    "id",
                    Operator::In,
                    vec![FilterValue::Int(1), FilterValue::Int(2), FilterValue::from("abc")]
                ),
                Predicate::and("user.name", Operator::Like, "ann%"),
                Predicate::new("status", Operator::IsNull, FilterValue::Null, Combinator::Or),
            ]
        );
    }

    #[test]
    fn test_body_rejects_unknown_field() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_body(&mut q, &[FilterNode::leaf("password", Operator::Equal, "x")])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FieldNotAllowed);
        assert!(err.is_configuration());
    }

    #[test]
    fn test_body_rejects_search_filter() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_body(&mut q, &[FilterNode::leaf("search", Operator::Like, "x")])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FilterNotBodyCapable);
    }

    #[test]
    fn test_body_rejects_malformed_node() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_body(&mut q, &[FilterNode::default()])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedFilterNode);
    }

    #[test]
    fn test_body_null_value_requires_null_check() {
        let mut q = RecordingBuilder::<()>::new();
        let err = catalog()
            .apply_body(&mut q, &[FilterNode::null_check("id", Operator::Equal)])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingValue);
    }

    #[test]
    fn test_body_ignored_value_skips_but_null_check_does_not() {
        let nodes = vec![
            FilterNode::leaf("status", Operator::Equal, "ALL"),
            FilterNode {
                value: Some("ALL".to_string()),
                ..FilterNode::null_check("status", Operator::IsNotNull)
            },
        ];
        let mut q = RecordingBuilder::<()>::new();
        catalog().apply_body(&mut q, &nodes).unwrap();
        assert_eq!(
            q.predicates(),
            vec![Predicate::and("status", Operator::IsNotNull, FilterValue::Null)]
        );
    }

    #[test]
    fn test_body_transform_error_stops() {
        let filters = Filterable::new().with_filters([Filter::date("at")]);
        let mut q = RecordingBuilder::<()>::new();
        let err = filters
            .apply_body(&mut q, &[FilterNode::leaf("at", Operator::Greater, "tomorrow")])
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDate);
    }

    #[test]
    fn test_add_filters_keeps_order() {
        let mut filters = Filterable::new();
        filters
            .add_filters([Filter::exact("b")])
            .add_filters([Filter::exact("a")]);
        let params: Vec<_> = filters.filters().iter().map(Filter::param).collect();
        assert_eq!(params, vec!["b", "a"]);
        assert_eq!(filters.len(), 2);
    }
}
