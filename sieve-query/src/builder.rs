//! The query-builder contract.
//!
//! Filters and sort catalogs only ever talk to a backend through
//! [`ClauseBuilder`]. It is object safe so that a filter definition can be
//! applied to any backend through `&mut dyn ClauseBuilder`. [`QueryBuilder`]
//! extends it with projection, paging and execution for the orchestrator.
//!
//! ```rust
//! use sieve_query::{ClauseBuilder, Combinator, FilterValue, Operator, QueryResult, SortDirection};
//!
//! #[derive(Default)]
//! struct Printer(Vec<String>);
//!
//! impl ClauseBuilder for Printer {
//!     fn r#where(
//!         &mut self,
//!         field: &str,
//!         operator: Operator,
//!         value: FilterValue,
//!         combinator: Combinator,
//!     ) -> QueryResult<()> {
//!         self.0.push(format!("{} {} {} {}", combinator, field, operator, value));
//!         Ok(())
//!     }
//!
//!     fn order_by(&mut self, field: &str, direction: SortDirection) -> QueryResult<()> {
//!         self.0.push(format!("ORDER {} {}", field, direction));
//!         Ok(())
//!     }
//! }
//!
//! let mut p = Printer::default();
//! p.where_and("age", Operator::Greater, FilterValue::Int(18)).unwrap();
//! assert_eq!(p.0, vec!["AND age GREATER 18"]);
//! ```

use serde::Serialize;

use crate::error::QueryResult;
use crate::operator::{Combinator, Operator, SortDirection};
use crate::page::Page;
use crate::value::FilterValue;

/// One canonical predicate, as handed to a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    /// Backend field path.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Typed value, [`FilterValue::Null`] for null checks.
    pub value: FilterValue,
    /// How the predicate joins the ones before it.
    pub combinator: Combinator,
}

impl Predicate {
    /// Create a new predicate.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<FilterValue>,
        combinator: Combinator,
    ) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            combinator,
        }
    }

    /// Create an AND-joined predicate.
    pub fn and(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operator, value, Combinator::And)
    }

    /// Create an OR-joined predicate.
    pub fn or(field: impl Into<String>, operator: Operator, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operator, value, Combinator::Or)
    }

    /// Hand the predicate to a builder.
    pub fn apply_to(self, query: &mut dyn ClauseBuilder) -> QueryResult<()> {
        query.r#where(&self.field, self.operator, self.value, self.combinator)
    }
}

/// Receives predicates and order clauses.
pub trait ClauseBuilder {
    /// Add a predicate.
    fn r#where(
        &mut self,
        field: &str,
        operator: Operator,
        value: FilterValue,
        combinator: Combinator,
    ) -> QueryResult<()>;

    /// Add an order clause.
    fn order_by(&mut self, field: &str, direction: SortDirection) -> QueryResult<()>;

    /// Add an AND-joined predicate.
    fn where_and(&mut self, field: &str, operator: Operator, value: FilterValue) -> QueryResult<()> {
        self.r#where(field, operator, value, Combinator::And)
    }
}

/// A backend query that can be projected, paged and executed.
pub trait QueryBuilder: ClauseBuilder {
    /// A result record.
    type Item;
    /// Backend-native representation of the accumulated predicates.
    type Conditions;

    /// Replace the projection.
    fn select(&mut self, fields: &[&str]);

    /// Extend the projection.
    fn add_select(&mut self, fields: &[&str]);

    /// Limit the number of records.
    fn limit(&mut self, limit: u32);

    /// Skip records.
    fn offset(&mut self, offset: u64);

    /// Execute and return every matching record.
    fn get(&mut self) -> QueryResult<Vec<Self::Item>>;

    /// Execute one page along with the total count.
    fn page(&mut self, limit: u32, offset: u64) -> QueryResult<Page<Self::Item>>;

    /// Execute and return the first matching record.
    fn find_first(&mut self) -> QueryResult<Option<Self::Item>>;

    /// The accumulated predicates in backend form.
    fn where_conditions(&self) -> Self::Conditions;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Instruction, RecordingBuilder};

    #[test]
    fn test_predicate_apply_to() {
        let mut q = RecordingBuilder::<()>::new();
        Predicate::or("name", Operator::Like, "jo%").apply_to(&mut q).unwrap();

        assert_eq!(
            q.instructions(),
            &[Instruction::Where(Predicate::new(
                "name",
                Operator::Like,
                "jo%",
                Combinator::Or
            ))]
        );
    }

    #[test]
    fn test_where_and_default() {
        let mut q = RecordingBuilder::<()>::new();
        q.where_and("age", Operator::Equal, FilterValue::Int(3)).unwrap();
        assert_eq!(q.predicates()[0].combinator, Combinator::And);
    }

    #[test]
    fn test_object_safe() {
        let mut q = RecordingBuilder::<()>::new();
        let dyn_q: &mut dyn ClauseBuilder = &mut q;
        dyn_q.order_by("name", SortDirection::Desc).unwrap();
        assert_eq!(q.orders(), vec![("name".to_string(), SortDirection::Desc)]);
    }
}
