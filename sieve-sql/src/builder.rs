//! SQL query builder.

use sieve_query::{
    ClauseBuilder, Combinator, FilterValue, Operator, Page, QueryBuilder, QueryResult,
    SortDirection,
};
use tracing::{debug, trace};

use crate::convert::{SqlOperator, SqlOrder};
use crate::dialect::{Dialect, validate_identifier};
use crate::error::{SqlError, SqlResult};
use crate::executor::SqlExecutor;
use crate::statement::{Condition, Operand, Statement, WhereClause, render_conditions};

/// A [`QueryBuilder`] that renders parameterized SQL for one table.
///
/// ```rust
/// use sieve_query::{ClauseBuilder, FilterValue, Operator, QueryBuilder, SortDirection};
/// use sieve_sql::{Dialect, SqlExecutor, SqlQueryBuilder, SqlResult, Statement};
///
/// struct Nothing;
///
/// impl SqlExecutor for Nothing {
///     type Row = ();
///     fn fetch(&mut self, _: &Statement) -> SqlResult<Vec<()>> { Ok(vec![]) }
///     fn count(&mut self, _: &Statement) -> SqlResult<u64> { Ok(0) }
/// }
///
/// let mut q = SqlQueryBuilder::new(Nothing, "users").unwrap();
/// q.where_and("age", Operator::GreaterOrEqual, FilterValue::Int(18)).unwrap();
/// q.order_by("name", SortDirection::Desc).unwrap();
/// q.limit(10);
///
/// let stmt = q.select_statement().unwrap();
/// assert_eq!(stmt.sql, "SELECT * FROM users WHERE age >= $1 ORDER BY name DESC LIMIT 10");
/// ```
pub struct SqlQueryBuilder<E: SqlExecutor> {
    executor: E,
    dialect: Dialect,
    table: String,
    columns: Vec<String>,
    conditions: Vec<Condition>,
    orders: Vec<(String, SqlOrder)>,
    limit: Option<u32>,
    offset: Option<u64>,
}

impl<E: SqlExecutor> SqlQueryBuilder<E> {
    /// Create a builder for `table` using the PostgreSQL dialect.
    pub fn new(executor: E, table: impl Into<String>) -> SqlResult<Self> {
        let table = table.into();
        validate_identifier(&table)?;
        Ok(Self {
            executor,
            dialect: Dialect::default(),
            table,
            columns: Vec::new(),
            conditions: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    /// Set the dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Get the dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Get the compiled conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Get the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Get the executor mutably.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Render the WHERE body and its values.
    pub fn where_clause(&self) -> WhereClause {
        let mut params = Vec::new();
        let sql = render_conditions(self.dialect, &self.conditions, &mut params).unwrap_or_default();
        WhereClause { sql, params }
    }

    /// Render the full SELECT statement.
    pub fn select_statement(&self) -> SqlResult<Statement> {
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            let mut quoted = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                validate_identifier(column)?;
                quoted.push(self.dialect.quote(column));
            }
            quoted.join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projection, self.dialect.quote(&self.table));
        let mut params = Vec::new();
        if let Some(clause) = render_conditions(self.dialect, &self.conditions, &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        if !self.orders.is_empty() {
            let orders: Vec<String> = self
                .orders
                .iter()
                .map(|(column, order)| format!("{} {}", self.dialect.quote(column), order.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&orders.join(", "));
        }
        if let Some(clause) = self.dialect.limit_clause(self.limit, self.offset) {
            sql.push(' ');
            sql.push_str(&clause);
        }

        Ok(Statement { sql, params })
    }

    /// Render a `SELECT COUNT(*)` over the same conditions.
    pub fn count_statement(&self) -> Statement {
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.dialect.quote(&self.table));
        let mut params = Vec::new();
        if let Some(clause) = render_conditions(self.dialect, &self.conditions, &mut params) {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        Statement { sql, params }
    }

    fn operand(field: &str, operator: SqlOperator, value: FilterValue) -> SqlResult<Operand> {
        match operator {
            SqlOperator::IsNull | SqlOperator::IsNotNull => Ok(Operand::None),
            SqlOperator::In | SqlOperator::NotIn => Ok(match value {
                FilterValue::List(items) => Operand::Many(items),
                FilterValue::Null => Operand::Many(Vec::new()),
                other => Operand::Many(vec![other]),
            }),
            SqlOperator::Between => match value {
                FilterValue::List(items) if items.len() == 2 => {
                    let mut items = items.into_iter();
                    match (items.next(), items.next()) {
                        (Some(low), Some(high)) => Ok(Operand::Range(low, high)),
                        _ => Err(SqlError::Internal("BETWEEN bounds vanished".to_string())),
                    }
                }
                other => Err(SqlError::InvalidBetween {
                    field: field.to_string(),
                    got: other.to_string(),
                }),
            },
            _ => Ok(Operand::Single(value)),
        }
    }
}

impl<E: SqlExecutor> ClauseBuilder for SqlQueryBuilder<E> {
    fn r#where(
        &mut self,
        field: &str,
        operator: Operator,
        value: FilterValue,
        combinator: Combinator,
    ) -> QueryResult<()> {
        validate_identifier(field)?;
        let operator = SqlOperator::from(operator);
        let operand = Self::operand(field, operator, value)?;
        trace!(field = %field, operator = %operator, "Adding SQL condition");
        self.conditions.push(Condition {
            column: field.to_string(),
            operator,
            operand,
            connector: combinator.into(),
        });
        Ok(())
    }

    fn order_by(&mut self, field: &str, direction: SortDirection) -> QueryResult<()> {
        validate_identifier(field)?;
        self.orders.push((field.to_string(), direction.into()));
        Ok(())
    }
}

impl<E: SqlExecutor> QueryBuilder for SqlQueryBuilder<E> {
    type Item = E::Row;
    type Conditions = WhereClause;

    fn select(&mut self, fields: &[&str]) {
        self.columns = fields.iter().map(|f| f.to_string()).collect();
    }

    fn add_select(&mut self, fields: &[&str]) {
        for field in fields {
            if !self.columns.iter().any(|c| c == field) {
                self.columns.push(field.to_string());
            }
        }
    }

    fn limit(&mut self, limit: u32) {
        self.limit = Some(limit);
    }

    fn offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn get(&mut self) -> QueryResult<Vec<Self::Item>> {
        let statement = self.select_statement()?;
        debug!(sql = %statement.sql, params = statement.params.len(), "Executing select");
        Ok(self.executor.fetch(&statement)?)
    }

    fn page(&mut self, limit: u32, offset: u64) -> QueryResult<Page<Self::Item>> {
        let count = self.count_statement();
        debug!(sql = %count.sql, "Executing count");
        let total = self.executor.count(&count)?;

        self.limit = Some(limit);
        self.offset = Some(offset);
        let rows = self.get()?;
        Ok(Page::new(rows, total, limit, offset))
    }

    fn find_first(&mut self) -> QueryResult<Option<Self::Item>> {
        let previous = self.limit.replace(1);
        let rows = self.get();
        self.limit = previous;
        Ok(rows?.into_iter().next())
    }

    fn where_conditions(&self) -> WhereClause {
        self.where_clause()
    }
}
