//! Compiled conditions and rendered statements.

use sieve_query::FilterValue;

use crate::convert::{SqlConnector, SqlOperator};
use crate::dialect::Dialect;

/// The right-hand side of a condition, shaped by its operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `IS NULL` / `IS NOT NULL`.
    None,
    /// A single bound value.
    Single(FilterValue),
    /// `IN` / `NOT IN` members.
    Many(Vec<FilterValue>),
    /// `BETWEEN` bounds.
    Range(FilterValue, FilterValue),
}

/// One compiled WHERE condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Validated column path.
    pub column: String,
    /// SQL operator.
    pub operator: SqlOperator,
    /// Bound values.
    pub operand: Operand,
    /// Connector to the previous condition.
    pub connector: SqlConnector,
}

impl Condition {
    /// Render this condition, appending its bound values to `params`.
    pub fn render(&self, dialect: Dialect, params: &mut Vec<FilterValue>) -> String {
        let column = dialect.quote(&self.column);
        match &self.operand {
            Operand::None => format!("{} {}", column, self.operator),
            Operand::Single(value) => {
                let ph = bind(dialect, params, value.clone());
                format!("{} {} {}", column, self.operator, ph)
            }
            Operand::Many(values) if values.is_empty() => match self.operator {
                SqlOperator::NotIn => "1 = 1".to_string(),
                _ => "1 = 0".to_string(),
            },
            Operand::Many(values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| bind(dialect, params, v.clone()))
                    .collect();
                format!("{} {} ({})", column, self.operator, placeholders.join(", "))
            }
            Operand::Range(low, high) => {
                let low = bind(dialect, params, low.clone());
                let high = bind(dialect, params, high.clone());
                format!("{} BETWEEN {} AND {}", column, low, high)
            }
        }
    }
}

fn bind(dialect: Dialect, params: &mut Vec<FilterValue>, value: FilterValue) -> String {
    params.push(value);
    dialect.placeholder(params.len())
}

/// Render a WHERE body. OR runs bind tighter than AND.
///
/// `a AND b OR c` renders as `a AND (b OR c)`.
pub fn render_conditions(
    dialect: Dialect,
    conditions: &[Condition],
    params: &mut Vec<FilterValue>,
) -> Option<String> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    for condition in conditions {
        let sql = condition.render(dialect, params);
        match (condition.connector, groups.last_mut()) {
            (SqlConnector::Or, Some(group)) => group.push(sql),
            _ => groups.push(vec![sql]),
        }
    }

    if groups.is_empty() {
        return None;
    }

    let rendered: Vec<String> = groups
        .into_iter()
        .map(|group| {
            if group.len() > 1 {
                format!("({})", group.join(" OR "))
            } else {
                group.join("")
            }
        })
        .collect();
    Some(rendered.join(" AND "))
}

/// A WHERE clause with its bound values, without the `WHERE` keyword.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhereClause {
    /// Condition text with placeholders.
    pub sql: String,
    /// Bound values in placeholder order.
    pub params: Vec<FilterValue>,
}

impl WhereClause {
    /// Check if there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// A complete statement ready for an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with placeholders.
    pub sql: String,
    /// Bound values in placeholder order.
    pub params: Vec<FilterValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cond(column: &str, operator: SqlOperator, operand: Operand, connector: SqlConnector) -> Condition {
        Condition {
            column: column.to_string(),
            operator,
            operand,
            connector,
        }
    }

    #[test]
    fn test_or_runs_are_grouped() {
        let conditions = vec![
            cond("a", SqlOperator::Eq, Operand::Single(FilterValue::Int(1)), SqlConnector::And),
            cond("b", SqlOperator::Like, Operand::Single("x%".into()), SqlConnector::And),
            cond("c", SqlOperator::Like, Operand::Single("y%".into()), SqlConnector::Or),
        ];
        let mut params = Vec::new();
        let sql = render_conditions(Dialect::Postgres, &conditions, &mut params);
        assert_eq!(sql.as_deref(), Some("a = $1 AND (b LIKE $2 OR c LIKE $3)"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_leading_or_starts_a_group() {
        let conditions = vec![cond("a", SqlOperator::IsNull, Operand::None, SqlConnector::Or)];
        let mut params = Vec::new();
        let sql = render_conditions(Dialect::MySql, &conditions, &mut params);
        assert_eq!(sql.as_deref(), Some("a IS NULL"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_empty_in_lists() {
        let mut params = Vec::new();
        let empty_in = cond("a", SqlOperator::In, Operand::Many(vec![]), SqlConnector::And);
        let empty_not_in = cond("a", SqlOperator::NotIn, Operand::Many(vec![]), SqlConnector::And);
        assert_eq!(empty_in.render(Dialect::Postgres, &mut params), "1 = 0");
        assert_eq!(empty_not_in.render(Dialect::Postgres, &mut params), "1 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_and_between_placeholders() {
        let mut params = vec![FilterValue::Int(0)];
        let in_list = cond(
            "id",
            SqlOperator::In,
            Operand::Many(vec![FilterValue::Int(1), FilterValue::Int(2)]),
            SqlConnector::And,
        );
        assert_eq!(in_list.render(Dialect::Postgres, &mut params), "id IN ($2, $3)");

        let between = cond(
            "price",
            SqlOperator::Between,
            Operand::Range(FilterValue::Int(10), FilterValue::Int(20)),
            SqlConnector::And,
        );
        assert_eq!(
            between.render(Dialect::Sqlite, &mut params),
            "price BETWEEN ? AND ?"
        );
        assert_eq!(params.len(), 5);
    }
}
