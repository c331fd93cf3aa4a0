//! Request-side input: the request source seam and the structured body.
//!
//! The body shape is:
//!
//! ```json
//! {
//!   "filters": [
//!     { "field": "age", "value": "18", "operator": "GREATER_OR_EQUAL" },
//!     { "subFilters": [
//!         { "field": "name", "value": "ann%", "operator": "LIKE" },
//!         { "field": "email", "value": "ann%", "operator": "LIKE", "type": "OR" }
//!     ] }
//!   ],
//!   "sorts": [ { "field": "name", "sort": "DESC" } ]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use crate::error::{QueryError, QueryResult};
use crate::operator::{Combinator, Operator, SortDirection};

/// The HTTP method that carries a filter body by default.
pub const DEFAULT_BODY_METHOD: &str = "POST";

/// Where the engine reads request input from.
///
/// Framework integrations implement this over their own request type.
pub trait RequestSource {
    /// Raw value of a query parameter.
    fn param(&self, name: &str) -> Option<&str>;

    /// Request method, upper case.
    fn method(&self) -> &str;

    /// Deserialize the request body.
    fn body(&self) -> QueryResult<BodyRequest>;
}

/// A structured filter and sort request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyRequest {
    /// Filter tree roots.
    pub filters: Vec<FilterNode>,
    /// Sort instructions, in priority order.
    pub sorts: Vec<OrderRequest>,
}

impl BodyRequest {
    /// Create an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON body.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| QueryError::invalid_body(e.to_string()).with_source(e))
    }

    /// Add a filter node.
    pub fn filter(mut self, node: FilterNode) -> Self {
        self.filters.push(node);
        self
    }

    /// Add a sort instruction.
    pub fn sort(mut self, order: OrderRequest) -> Self {
        self.sorts.push(order);
        self
    }
}

/// One node of a body filter tree.
///
/// A node with a `field` is a leaf. A node with `children` is a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterNode {
    /// Filter parameter, `None` for groups.
    pub field: Option<String>,
    /// Raw value. JSON numbers and booleans are read as their text.
    #[serde(deserialize_with = "scalar_as_string")]
    pub value: Option<String>,
    /// Comparison operator.
    pub operator: Operator,
    /// How the node joins its siblings.
    #[serde(rename = "type")]
    pub combinator: Combinator,
    /// Nested nodes.
    #[serde(rename = "subFilters", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FilterNode>,
}

impl FilterNode {
    /// A leaf node.
    pub fn leaf(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            value: Some(value.into()),
            operator,
            ..Self::default()
        }
    }

    /// A leaf node without a value, for null checks.
    pub fn null_check(field: impl Into<String>, operator: Operator) -> Self {
        Self {
            field: Some(field.into()),
            operator,
            ..Self::default()
        }
    }

    /// A group node.
    pub fn group(children: impl IntoIterator<Item = FilterNode>) -> Self {
        Self {
            children: children.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Join this node to its siblings with OR.
    pub fn or(mut self) -> Self {
        self.combinator = Combinator::Or;
        self
    }

    /// Whether the node has sub-filters.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Number(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

/// One explicit sort instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderRequest {
    /// External sort key.
    pub field: Option<String>,
    /// Direction.
    #[serde(rename = "sort")]
    pub direction: SortDirection,
}

impl OrderRequest {
    /// Create a new sort instruction.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: Some(field.into()),
            direction,
        }
    }

    /// Ascending on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Descending on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// In-memory [`RequestSource`].
///
/// ```rust
/// use sieve_query::{MapRequest, RequestSource};
///
/// let req = MapRequest::get().with_param("age", ">=18");
/// assert_eq!(req.param("age"), Some(">=18"));
/// assert_eq!(req.method(), "GET");
///
/// let req = MapRequest::post(r#"{"filters":[{"field":"age","value":"18"}]}"#);
/// assert_eq!(req.body().unwrap().filters.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapRequest {
    params: HashMap<String, String>,
    method: String,
    body: Option<String>,
}

impl MapRequest {
    /// A request with the given method and no body.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            params: HashMap::new(),
            method: method.into().to_uppercase(),
            body: None,
        }
    }

    /// A GET request.
    pub fn get() -> Self {
        Self::new("GET")
    }

    /// A POST request with a raw JSON body.
    pub fn post(json: impl Into<String>) -> Self {
        Self::new(DEFAULT_BODY_METHOD).with_body(json)
    }

    /// A POST request carrying `body`.
    pub fn post_body(body: &BodyRequest) -> QueryResult<Self> {
        let json = serde_json::to_string(body)
            .map_err(|e| QueryError::invalid_body(e.to_string()).with_source(e))?;
        Ok(Self::post(json))
    }

    /// Set a query parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set several query parameters.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the raw body.
    pub fn with_body(mut self, json: impl Into<String>) -> Self {
        self.body = Some(json.into());
        self
    }
}

impl RequestSource for MapRequest {
    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn body(&self) -> QueryResult<BodyRequest> {
        match &self.body {
            Some(json) => BodyRequest::from_json(json),
            None => Ok(BodyRequest::default()),
        }
    }
}
