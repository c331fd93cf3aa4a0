//! A recording [`QueryBuilder`] for tests.
//!
//! [`RecordingBuilder`] stores every instruction it receives, in order, and
//! serves canned rows from memory. It does not evaluate predicates.
//! Available in unit tests and behind the `testing` feature.
//!
//! ```rust,ignore
//! use sieve_query::testing::RecordingBuilder;
//! use sieve_query::{Filter, Filterable, Operator};
//! use std::collections::HashMap;
//!
//! let filters = Filterable::new().with_filters([Filter::comparison("age")]);
//! let params = HashMap::from([("age".to_string(), ">=18".to_string())]);
//!
//! let mut q = RecordingBuilder::<()>::new();
//! filters.apply_params(&mut q, &params).unwrap();
//!
//! assert_eq!(q.predicates()[0].operator, Operator::GreaterOrEqual);
//! ```

use crate::builder::{ClauseBuilder, Predicate, QueryBuilder};
use crate::error::{QueryError, QueryResult};
use crate::operator::{Combinator, Operator, SortDirection};
use crate::page::Page;
use crate::value::FilterValue;

/// A single call received by a [`RecordingBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `where`
    Where(Predicate),
    /// `order_by`
    OrderBy(String, SortDirection),
    /// `select`
    Select(Vec<String>),
    /// `add_select`
    AddSelect(Vec<String>),
    /// `limit`
    Limit(u32),
    /// `offset`
    Offset(u64),
}

/// Query builder that records instructions instead of executing them.
#[derive(Debug, Clone)]
pub struct RecordingBuilder<T = ()> {
    instructions: Vec<Instruction>,
    rows: Vec<T>,
    fail_on: Option<String>,
}

impl<T> Default for RecordingBuilder<T> {
    fn default() -> Self {
        Self {
            instructions: Vec::new(),
            rows: Vec::new(),
            fail_on: None,
        }
    }
}

impl<T> RecordingBuilder<T> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these rows from `get`, `page` and `find_first`.
    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self
    }

    /// Reject any predicate on `field` with a backend error.
    pub fn fail_on(mut self, field: impl Into<String>) -> Self {
        self.fail_on = Some(field.into());
        self
    }

    /// Every instruction received so far.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Only the predicates, in order.
    pub fn predicates(&self) -> Vec<Predicate> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Where(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    /// Only the order clauses, in order.
    pub fn orders(&self) -> Vec<(String, SortDirection)> {
        self.instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::OrderBy(field, dir) => Some((field.clone(), *dir)),
                _ => None,
            })
            .collect()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl<T> ClauseBuilder for RecordingBuilder<T> {
    fn r#where(
        &mut self,
        field: &str,
        operator: Operator,
        value: FilterValue,
        combinator: Combinator,
    ) -> QueryResult<()> {
        if self.fail_on.as_deref() == Some(field) {
            return Err(QueryError::backend(format!("field '{}' rejected", field)));
        }
        self.instructions
            .push(Instruction::Where(Predicate::new(field, operator, value, combinator)));
        Ok(())
    }

    fn order_by(&mut self, field: &str, direction: SortDirection) -> QueryResult<()> {
        self.instructions
            .push(Instruction::OrderBy(field.to_string(), direction));
        Ok(())
    }
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

impl<T: Clone> QueryBuilder for RecordingBuilder<T> {
    type Item = T;
    type Conditions = Vec<Predicate>;

    fn select(&mut self, fields: &[&str]) {
        self.instructions.push(Instruction::Select(owned(fields)));
    }

    fn add_select(&mut self, fields: &[&str]) {
        self.instructions.push(Instruction::AddSelect(owned(fields)));
    }

    fn limit(&mut self, limit: u32) {
        self.instructions.push(Instruction::Limit(limit));
    }

    fn offset(&mut self, offset: u64) {
        self.instructions.push(Instruction::Offset(offset));
    }

    fn get(&mut self) -> QueryResult<Vec<T>> {
        Ok(self.rows.clone())
    }

    fn page(&mut self, limit: u32, offset: u64) -> QueryResult<Page<T>> {
        self.limit(limit);
        self.offset(offset);
        let content = self
            .rows
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(Page::new(content, self.rows.len() as u64, limit, offset))
    }

    fn find_first(&mut self) -> QueryResult<Option<T>> {
        Ok(self.rows.first().cloned())
    }

    fn where_conditions(&self) -> Vec<Predicate> {
        self.predicates()
    }
}
