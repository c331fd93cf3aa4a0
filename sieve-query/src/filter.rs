//! Filter definitions.
//!
//! A [`Filter`] is the unit of filtering capability for one external
//! parameter. It owns the parsing, validation and coercion rules of its
//! [`FilterKind`] and turns a raw string into canonical predicates.
//!
//! | Constructor | Input | Emits |
//! |-------------|-------|-------|
//! | [`Filter::exact`] | `42`, `true`, `ann` | `EQUAL` with a sniffed type |
//! | [`Filter::partial`] | `ann` | `LIKE 'ann%'` |
//! | [`Filter::search`] | `ann` | `LIKE '%ann%'` on every field, OR-joined |
//! | [`Filter::comparison`] | `>=18` | `GREATER_OR_EQUAL '18'` |
//! | [`Filter::greater`] / [`Filter::less`] | `18` | `GREATER 18` / `LESS 18` |
//! | [`Filter::interval`] | `18-65` | `GREATER_OR_EQUAL '18'`, `LESS_OR_EQUAL '65'` |
//! | [`Filter::in_list`] | `a,b` | `IN [a, b]` |
//! | [`Filter::enumeration`] | `ACTIVE,PENDING` | `IN [ACTIVE, PENDING]` |
//! | [`Filter::is_null`] | `yes` / `no` | `IS_NULL` / `IS_NOT_NULL` |
//! | [`Filter::date`] | `2024-01-01\|2024-12-31` | `GREATER_OR_EQUAL`, `LESS_OR_EQUAL` dates |
//! | [`Filter::custom`] | anything | whatever the function emits |
//!
//! ```rust
//! use sieve_query::{Filter, FilterValue, Operator};
//!
//! let filter = Filter::comparison("age");
//! let predicates = filter.predicates(">=18").unwrap();
//! assert_eq!(predicates[0].operator, Operator::GreaterOrEqual);
//! assert_eq!(predicates[0].value, FilterValue::from("18"));
//! ```

mod date;

pub use date::{DateKind, DateSpec};

use indexmap::IndexSet;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::builder::{ClauseBuilder, Predicate};
use crate::error::{QueryError, QueryResult};
use crate::operator::{Combinator, LikeStrategy, Operator};
use crate::syntax;
use crate::value::FilterValue;

/// Caller-supplied filter behavior.
pub type CustomFn = Arc<dyn Fn(&mut dyn ClauseBuilder, &str) -> QueryResult<()> + Send + Sync>;

/// A type whose constants an enum filter accepts.
///
/// ```rust
/// use sieve_query::{Filter, FilterEnum};
///
/// enum Status { Active, Pending }
///
/// impl FilterEnum for Status {
///     fn variants() -> &'static [&'static str] {
///         &["ACTIVE", "PENDING"]
///     }
/// }
///
/// let filter = Filter::enum_of::<Status>("status");
/// assert!(filter.predicates("ACTIVE").is_ok());
/// assert!(filter.predicates("active").is_err());
/// ```
pub trait FilterEnum {
    /// The accepted constant names.
    fn variants() -> &'static [&'static str];
}

/// Parsing behavior of a filter.
#[derive(Clone)]
pub enum FilterKind {
    /// Equality on a sniffed value.
    Exact,
    /// LIKE with a wildcard strategy.
    Partial {
        /// Wildcard placement.
        strategy: LikeStrategy,
    },
    /// LIKE across several fields, OR-joined.
    Search {
        /// Backend fields searched.
        fields: Vec<SmolStr>,
        /// Wildcard placement.
        strategy: LikeStrategy,
    },
    /// Prefix-operator mini-language on a string value.
    Comparison,
    /// Lower bound on a coerced number.
    Greater {
        /// Inclusive bound.
        or_equal: bool,
    },
    /// Upper bound on a coerced number.
    Less {
        /// Inclusive bound.
        or_equal: bool,
    },
    /// `from-to` range.
    Interval,
    /// Delimited list.
    In {
        /// Item separator.
        delimiter: SmolStr,
    },
    /// One or more constants of a closed set.
    Enum {
        /// The accepted constant names.
        allowed: Vec<SmolStr>,
    },
    /// Null check driven by a yes/no token.
    IsNull,
    /// Dates with ranges and prefix operators.
    Date(DateSpec),
    /// Caller-supplied function.
    Custom(CustomFn),
}

impl FilterKind {
    /// Short name used in messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Partial { .. } => "partial",
            Self::Search { .. } => "search",
            Self::Comparison => "comparison",
            Self::Greater { .. } => "greater",
            Self::Less { .. } => "less",
            Self::Interval => "interval",
            Self::In { .. } => "in",
            Self::Enum { .. } => "enum",
            Self::IsNull => "is-null",
            Self::Date(_) => "date",
            Self::Custom(_) => "custom",
        }
    }

    fn body_capable_by_default(&self) -> bool {
        !matches!(self, Self::Search { .. } | Self::Custom(_))
    }
}

impl fmt::Debug for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial { strategy } => f.debug_struct("Partial").field("strategy", strategy).finish(),
            Self::Search { fields, strategy } => f
                .debug_struct("Search")
                .field("fields", fields)
                .field("strategy", strategy)
                .finish(),
            Self::Greater { or_equal } => f.debug_struct("Greater").field("or_equal", or_equal).finish(),
            Self::Less { or_equal } => f.debug_struct("Less").field("or_equal", or_equal).finish(),
            Self::In { delimiter } => f.debug_struct("In").field("delimiter", delimiter).finish(),
            Self::Enum { allowed } => f.debug_struct("Enum").field("allowed", allowed).finish(),
            Self::Date(spec) => f.debug_tuple("Date").field(spec).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
            other => f.write_str(match other {
                Self::Exact => "Exact",
                Self::Comparison => "Comparison",
                Self::Interval => "Interval",
                _ => "IsNull",
            }),
        }
    }
}

const NULL_TOKENS: [&str; 4] = ["null", "true", "1", "yes"];
const NOT_NULL_TOKENS: [&str; 4] = ["not_null", "false", "0", "no"];

/// A whitelisted filter on one external parameter.
///
/// Filters are immutable once registered and hold no per-request state.
#[derive(Debug, Clone)]
pub struct Filter {
    param: SmolStr,
    internal_name: SmolStr,
    default_value: Option<String>,
    ignored: IndexSet<String>,
    body_operation: Option<bool>,
    kind: FilterKind,
}

impl Filter {
    /// Create a filter of the given kind on `param`.
    ///
    /// The internal name defaults to `param`.
    pub fn new(param: impl Into<SmolStr>, kind: FilterKind) -> Self {
        let param = param.into();
        Self {
            internal_name: param.clone(),
            param,
            default_value: None,
            ignored: IndexSet::new(),
            body_operation: None,
            kind,
        }
    }

    /// Equality on a sniffed value.
    pub fn exact(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Exact)
    }

    /// LIKE with the `value%` strategy.
    pub fn partial(param: impl Into<SmolStr>) -> Self {
        Self::new(
            param,
            FilterKind::Partial {
                strategy: LikeStrategy::Final,
            },
        )
    }

    /// LIKE `%value%` across `fields`, OR-joined.
    pub fn search<I, S>(param: impl Into<SmolStr>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self::new(
            param,
            FilterKind::Search {
                fields: fields.into_iter().map(Into::into).collect(),
                strategy: LikeStrategy::Complete,
            },
        )
    }

    /// [`Filter::search`] on the `search` parameter.
    pub fn default_search<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self::search("search", fields)
    }

    /// Prefix-operator comparison.
    pub fn comparison(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Comparison)
    }

    /// Strict lower bound.
    pub fn greater(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Greater { or_equal: false })
    }

    /// Inclusive lower bound.
    pub fn greater_or_equal(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Greater { or_equal: true })
    }

    /// Strict upper bound.
    pub fn less(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Less { or_equal: false })
    }

    /// Inclusive upper bound.
    pub fn less_or_equal(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Less { or_equal: true })
    }

    /// `from-to` range, `from,to` accepted too.
    pub fn interval(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::Interval)
    }

    /// Comma-separated list.
    pub fn in_list(param: impl Into<SmolStr>) -> Self {
        Self::in_list_with(param, ",")
    }

    /// List separated by `delimiter`.
    pub fn in_list_with(param: impl Into<SmolStr>, delimiter: impl Into<SmolStr>) -> Self {
        Self::new(
            param,
            FilterKind::In {
                delimiter: delimiter.into(),
            },
        )
    }

    /// One or more of the `allowed` constants.
    pub fn enumeration<I, S>(param: impl Into<SmolStr>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self::new(
            param,
            FilterKind::Enum {
                allowed: allowed.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// One or more constants of `E`.
    pub fn enum_of<E: FilterEnum>(param: impl Into<SmolStr>) -> Self {
        Self::enumeration(param, E::variants().iter().copied())
    }

    /// Null check.
    pub fn is_null(param: impl Into<SmolStr>) -> Self {
        Self::new(param, FilterKind::IsNull)
    }

    /// Calendar dates, `%Y-%m-%d`.
    pub fn date(param: impl Into<SmolStr>) -> Self {
        Self::date_with(param, DateSpec::new(DateKind::Date))
    }

    /// Local date-times, `%Y-%m-%dT%H:%M:%S`.
    pub fn datetime(param: impl Into<SmolStr>) -> Self {
        Self::date_with(param, DateSpec::new(DateKind::DateTime))
    }

    /// UTC instants, `%Y-%m-%d %H:%M:%S` or RFC 3339.
    pub fn timestamp(param: impl Into<SmolStr>) -> Self {
        Self::date_with(param, DateSpec::new(DateKind::Timestamp))
    }

    /// Dates with an explicit type and pattern.
    pub fn date_with(param: impl Into<SmolStr>, spec: DateSpec) -> Self {
        Self::new(param, FilterKind::Date(spec))
    }

    /// Caller-supplied behavior.
    ///
    /// ```rust
    /// use sieve_query::{Filter, FilterValue, Operator};
    ///
    /// let adults = Filter::custom("adult", |q, value| {
    ///     let op = if value == "true" { Operator::GreaterOrEqual } else { Operator::Less };
    ///     q.where_and("age", op, FilterValue::Int(18))
    /// });
    /// assert!(!adults.supports_body_operation());
    /// ```
    pub fn custom<F>(param: impl Into<SmolStr>, f: F) -> Self
    where
        F: Fn(&mut dyn ClauseBuilder, &str) -> QueryResult<()> + Send + Sync + 'static,
    {
        Self::new(param, FilterKind::Custom(Arc::new(f)))
    }

    /// Target a different backend field.
    pub fn with_internal_name(mut self, internal_name: impl Into<SmolStr>) -> Self {
        self.internal_name = internal_name.into();
        self
    }

    /// Value used when the parameter is absent or blank.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Values that turn the filter into a no-op.
    pub fn with_ignored<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(values.into_iter().map(Into::into));
        self
    }

    /// Change the wildcard strategy of a partial or search filter.
    pub fn with_strategy(mut self, new_strategy: LikeStrategy) -> Self {
        match &mut self.kind {
            FilterKind::Partial { strategy } | FilterKind::Search { strategy, .. } => {
                *strategy = new_strategy;
            }
            _ => {}
        }
        self
    }

    /// Override whether the filter may be driven from a request body.
    pub fn with_body_operation(mut self, supported: bool) -> Self {
        self.body_operation = Some(supported);
        self
    }

    /// External parameter name.
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Backend field path.
    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    /// Value used when the parameter is absent or blank.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// The parsing behavior.
    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    /// Whether `raw`, trimmed, is one of the ignored values.
    pub fn is_ignored(&self, raw: &str) -> bool {
        self.ignored.contains(raw.trim())
    }

    /// Whether the filter may be driven from a request body.
    pub fn supports_body_operation(&self) -> bool {
        self.body_operation
            .unwrap_or_else(|| self.kind.body_capable_by_default())
    }

    /// Convert a raw value into a typed value, without operator syntax.
    ///
    /// Used for body filters, where the operator is explicit.
    pub fn transform(&self, raw: &str) -> QueryResult<FilterValue> {
        match &self.kind {
            FilterKind::Exact => self.sniff(raw),
            FilterKind::Greater { .. } | FilterKind::Less { .. } => {
                Ok(FilterValue::coerce_number(raw.trim()))
            }
            FilterKind::Enum { allowed } => self
                .check_enum(allowed, raw.trim())
                .map(|token| FilterValue::String(token.to_string())),
            FilterKind::IsNull => self.null_check(raw).map(|op| FilterValue::Bool(op == Operator::IsNull)),
            FilterKind::Date(spec) => spec.parse(&self.param, raw),
            _ => Ok(FilterValue::String(raw.to_string())),
        }
    }

    /// Apply the filter for `raw`.
    ///
    /// All predicates are computed before the first one reaches the builder,
    /// so a value error never leaves a half-applied filter behind.
    pub fn apply(&self, query: &mut dyn ClauseBuilder, raw: &str) -> QueryResult<()> {
        if let FilterKind::Custom(f) = &self.kind {
            trace!(param = %self.param, "Applying custom filter");
            return f(query, raw);
        }
        for predicate in self.predicates(raw)? {
            trace!(
                field = %predicate.field,
                operator = %predicate.operator,
                value = %predicate.value,
                "Emitting predicate"
            );
            predicate.apply_to(query)?;
        }
        Ok(())
    }

    /// The predicates this filter emits for `raw`.
    ///
    /// Custom filters have no predicates of their own and return an empty list.
    pub fn predicates(&self, raw: &str) -> QueryResult<Vec<Predicate>> {
        let field = self.internal_name.as_str();
        let one = |operator: Operator, value: FilterValue| -> QueryResult<Vec<Predicate>> {
            Ok(vec![Predicate::and(field, operator, value)])
        };

        match &self.kind {
            FilterKind::Exact => one(Operator::Equal, self.sniff(raw)?),
            FilterKind::Partial { strategy } => one(Operator::Like, strategy.pattern(raw).into()),
            FilterKind::Search { fields, strategy } => {
                let pattern = strategy.pattern(raw);
                Ok(fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| {
                        let combinator = if i == 0 { Combinator::And } else { Combinator::Or };
                        Predicate::new(f.as_str(), Operator::Like, pattern.as_str(), combinator)
                    })
                    .collect())
            }
            FilterKind::Comparison => {
                let (operator, value) = syntax::split_comparison(raw);
                if value.is_empty() {
                    return Err(QueryError::empty_value(self.param.as_str(), self.kind.name()));
                }
                one(operator, value.into())
            }
            FilterKind::Greater { or_equal } => {
                let op = if *or_equal { Operator::GreaterOrEqual } else { Operator::Greater };
                one(op, self.number(raw)?)
            }
            FilterKind::Less { or_equal } => {
                let op = if *or_equal { Operator::LessOrEqual } else { Operator::Less };
                one(op, self.number(raw)?)
            }
            FilterKind::Interval => match syntax::split_interval(raw) {
                None => one(Operator::Equal, raw.trim().into()),
                Some((from, to)) => {
                    let mut out = Vec::with_capacity(2);
                    if let Some(from) = from {
                        out.push(Predicate::and(field, Operator::GreaterOrEqual, from));
                    }
                    if let Some(to) = to {
                        out.push(Predicate::and(field, Operator::LessOrEqual, to));
                    }
                    Ok(out)
                }
            },
            FilterKind::In { delimiter } => {
                let items: Vec<FilterValue> = syntax::split_list(raw, delimiter)
                    .map(FilterValue::from)
                    .collect();
                if items.is_empty() {
                    return Err(QueryError::empty_list(self.param.as_str()));
                }
                one(Operator::In, FilterValue::List(items))
            }
            FilterKind::Enum { allowed } => {
                if !raw.contains(',') {
                    let token = self.check_enum(allowed, raw.trim())?;
                    return one(Operator::Equal, token.into());
                }
                let mut tokens = IndexSet::new();
                for token in syntax::split_list(raw, ",") {
                    tokens.insert(self.check_enum(allowed, token)?);
                }
                if tokens.is_empty() {
                    return Ok(Vec::new());
                }
                one(
                    Operator::In,
                    FilterValue::List(tokens.into_iter().map(FilterValue::from).collect()),
                )
            }
            FilterKind::IsNull => one(self.null_check(raw)?, FilterValue::Null),
            FilterKind::Date(spec) => {
                if let Some((from, to)) = syntax::split_pipe_range(raw) {
                    let mut out = Vec::with_capacity(2);
                    if let Some(from) = from {
                        let value = spec.parse(&self.param, from)?;
                        out.push(Predicate::and(field, Operator::GreaterOrEqual, value));
                    }
                    if let Some(to) = to {
                        let value = spec.parse(&self.param, to)?;
                        out.push(Predicate::and(field, Operator::LessOrEqual, value));
                    }
                    return Ok(out);
                }
                let operator = syntax::comparison_operator(raw);
                let value = spec.parse(&self.param, &syntax::clean_value(raw))?;
                one(operator, value)
            }
            FilterKind::Custom(_) => Ok(Vec::new()),
        }
    }

    fn sniff(&self, raw: &str) -> QueryResult<FilterValue> {
        FilterValue::sniff(raw)
            .map_err(|e| QueryError::invalid_number(self.param.as_str(), raw).with_source(e))
    }

    fn number(&self, raw: &str) -> QueryResult<FilterValue> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(QueryError::empty_value(self.param.as_str(), self.kind.name()));
        }
        Ok(FilterValue::coerce_number(raw))
    }

    fn check_enum<'a>(&self, allowed: &'a [SmolStr], token: &str) -> QueryResult<&'a str> {
        allowed
            .iter()
            .find(|a| a.as_str() == token)
            .map(SmolStr::as_str)
            .ok_or_else(|| QueryError::invalid_enum_value(token, self.param.as_str(), allowed))
    }

    fn null_check(&self, raw: &str) -> QueryResult<Operator> {
        let token = raw.trim().to_lowercase();
        if NULL_TOKENS.contains(&token.as_str()) {
            Ok(Operator::IsNull)
        } else if NOT_NULL_TOKENS.contains(&token.as_str()) {
            Ok(Operator::IsNotNull)
        } else {
            Err(QueryError::invalid_value(
                self.param.as_str(),
                format!(
                    "'{}' is not a null check, expected one of {} or {}",
                    raw,
                    NULL_TOKENS.join("/"),
                    NOT_NULL_TOKENS.join("/")
                ),
            ))
        }
    }
}
