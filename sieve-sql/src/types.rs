//! PostgreSQL executor over the blocking `postgres` client.
//!
//! Filters emit loosely typed values: a comparison on `age` carries the
//! string `"18"`, an exact match on a `BIGINT` id carries an `i32`. The
//! server is strict about wire types, so every statement is prepared first
//! and each value is coerced to the type PostgreSQL inferred for its
//! placeholder.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres::types::{ToSql, Type};
use postgres::{Client, Row};
use rust_decimal::Decimal;
use sieve_query::FilterValue;
use std::str::FromStr;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::{SqlError, SqlResult};
use crate::executor::SqlExecutor;
use crate::statement::Statement;

/// Convert a FilterValue to its natural PostgreSQL parameter type.
pub fn filter_value_to_sql(value: &FilterValue) -> SqlResult<Box<dyn ToSql + Sync>> {
    match value {
        FilterValue::Null => Ok(Box::new(Option::<String>::None)),
        FilterValue::Bool(b) => Ok(Box::new(*b)),
        FilterValue::Int(i) => Ok(Box::new(*i)),
        FilterValue::Long(l) => Ok(Box::new(*l)),
        FilterValue::Float(f) => Ok(Box::new(*f)),
        FilterValue::String(s) => Ok(Box::new(s.clone())),
        FilterValue::Date(d) => Ok(Box::new(*d)),
        FilterValue::DateTime(dt) => Ok(Box::new(*dt)),
        FilterValue::Timestamp(ts) => Ok(Box::new(*ts)),
        // IN and BETWEEN are expanded to one placeholder per member.
        FilterValue::List(_) => Err(SqlError::Internal(
            "list values must be expanded before binding".to_string(),
        )),
    }
}

/// A value converted to the type of the placeholder it binds to.
#[derive(Debug, Clone, PartialEq)]
pub enum PgParam {
    /// `bool`
    Bool(Option<bool>),
    /// `int2`
    Int2(Option<i16>),
    /// `int4`
    Int4(Option<i32>),
    /// `int8`
    Int8(Option<i64>),
    /// `float4`
    Float4(Option<f32>),
    /// `float8`
    Float8(Option<f64>),
    /// `numeric`
    Numeric(Option<Decimal>),
    /// `text`, `varchar`, `bpchar`, `name` and untyped placeholders.
    Text(Option<String>),
    /// `date`
    Date(Option<NaiveDate>),
    /// `timestamp`
    Timestamp(Option<NaiveDateTime>),
    /// `timestamptz`
    TimestampTz(Option<DateTime<Utc>>),
    /// `uuid`
    Uuid(Option<Uuid>),
    /// Any other type, bound as the value's natural type.
    Native(FilterValue),
}

impl PgParam {
    /// Convert `value` to the parameter type `ty`.
    ///
    /// Returns `None` when the value has no representation in that type.
    pub fn coerce(value: &FilterValue, ty: &Type) -> Option<Self> {
        if matches!(value, FilterValue::List(_)) {
            return None;
        }
        let null = value.is_null();
        let param = match *ty {
            Type::BOOL => Self::Bool(convert(null, || as_bool(value))?),
            Type::INT2 => Self::Int2(convert(null, || {
                as_i64(value).and_then(|n| i16::try_from(n).ok())
            })?),
            Type::INT4 => Self::Int4(convert(null, || {
                as_i64(value).and_then(|n| i32::try_from(n).ok())
            })?),
            Type::INT8 => Self::Int8(convert(null, || as_i64(value))?),
            Type::FLOAT4 => Self::Float4(convert(null, || as_f64(value).map(|f| f as f32))?),
            Type::FLOAT8 => Self::Float8(convert(null, || as_f64(value))?),
            Type::NUMERIC => Self::Numeric(convert(null, || as_decimal(value))?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                Self::Text(convert(null, || Some(value.to_string()))?)
            }
            Type::DATE => Self::Date(convert(null, || as_date(value))?),
            Type::TIMESTAMP => Self::Timestamp(convert(null, || as_datetime(value))?),
            Type::TIMESTAMPTZ => Self::TimestampTz(convert(null, || as_timestamp(value))?),
            Type::UUID => Self::Uuid(convert(null, || {
                value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
            })?),
            _ => Self::Native(value.clone()),
        };
        Some(param)
    }

    /// Box the parameter for the client.
    pub fn into_sql(self) -> SqlResult<Box<dyn ToSql + Sync>> {
        Ok(match self {
            Self::Bool(v) => Box::new(v),
            Self::Int2(v) => Box::new(v),
            Self::Int4(v) => Box::new(v),
            Self::Int8(v) => Box::new(v),
            Self::Float4(v) => Box::new(v),
            Self::Float8(v) => Box::new(v),
            Self::Numeric(v) => Box::new(v),
            Self::Text(v) => Box::new(v),
            Self::Date(v) => Box::new(v),
            Self::Timestamp(v) => Box::new(v),
            Self::TimestampTz(v) => Box::new(v),
            Self::Uuid(v) => Box::new(v),
            Self::Native(v) => return filter_value_to_sql(&v),
        })
    }
}

/// `None` for null, otherwise the converted value or a failed conversion.
fn convert<T>(null: bool, f: impl FnOnce() -> Option<T>) -> Option<Option<T>> {
    if null { Some(None) } else { f().map(Some) }
}

fn as_bool(value: &FilterValue) -> Option<bool> {
    match value {
        FilterValue::Bool(b) => Some(*b),
        FilterValue::Int(0) | FilterValue::Long(0) => Some(false),
        FilterValue::Int(1) | FilterValue::Long(1) => Some(true),
        FilterValue::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Some(true),
            "false" | "f" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_i64(value: &FilterValue) -> Option<i64> {
    match value {
        FilterValue::Int(i) => Some(i64::from(*i)),
        FilterValue::Long(l) => Some(*l),
        FilterValue::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Some(*f as i64),
        FilterValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &FilterValue) -> Option<f64> {
    match value {
        FilterValue::Int(i) => Some(f64::from(*i)),
        FilterValue::Long(l) => Some(*l as f64),
        FilterValue::Float(f) => Some(*f),
        FilterValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_decimal(value: &FilterValue) -> Option<Decimal> {
    match value {
        FilterValue::Int(i) => Some(Decimal::from(*i)),
        FilterValue::Long(l) => Some(Decimal::from(*l)),
        FilterValue::Float(f) => Decimal::try_from(*f).ok(),
        FilterValue::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn as_date(value: &FilterValue) -> Option<NaiveDate> {
    match value {
        FilterValue::Date(d) => Some(*d),
        FilterValue::DateTime(dt) => Some(dt.date()),
        FilterValue::Timestamp(ts) => Some(ts.date_naive()),
        FilterValue::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

fn as_datetime(value: &FilterValue) -> Option<NaiveDateTime> {
    match value {
        FilterValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        FilterValue::DateTime(dt) => Some(*dt),
        FilterValue::Timestamp(ts) => Some(ts.naive_utc()),
        FilterValue::String(s) => parse_naive_datetime(s.trim()),
        _ => None,
    }
}

fn as_timestamp(value: &FilterValue) -> Option<DateTime<Utc>> {
    match value {
        FilterValue::Timestamp(ts) => Some(*ts),
        FilterValue::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|ts| ts.with_timezone(&Utc))
            .ok()
            .or_else(|| parse_naive_datetime(s.trim()).map(|dt| dt.and_utc())),
        other => as_datetime(other).map(|dt| dt.and_utc()),
    }
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(s, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Coerce every statement parameter to its declared placeholder type.
pub fn bind_params(values: &[FilterValue], types: &[Type]) -> SqlResult<Vec<PgParam>> {
    if values.len() != types.len() {
        return Err(SqlError::Internal(format!(
            "statement declares {} parameters but {} values were supplied",
            types.len(),
            values.len()
        )));
    }
    values
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (value, ty))| {
            PgParam::coerce(value, ty)
                .ok_or_else(|| SqlError::parameter(i + 1, ty.name(), value.to_string()))
        })
        .collect()
}

/// [`SqlExecutor`] for a blocking PostgreSQL client.
pub struct PgExecutor {
    client: Client,
}

impl PgExecutor {
    /// Wrap a connected client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Consume the executor and return the client.
    pub fn into_inner(self) -> Client {
        self.client
    }

    fn prepare(
        &mut self,
        statement: &Statement,
    ) -> SqlResult<(postgres::Statement, Vec<Box<dyn ToSql + Sync>>)> {
        let prepared = self
            .client
            .prepare(statement.sql.as_str())
            .map_err(|e| SqlError::execution(e.to_string()))?;
        trace!(types = ?prepared.params(), "Prepared statement");
        let params = bind_params(&statement.params, prepared.params())?
            .into_iter()
            .map(PgParam::into_sql)
            .collect::<SqlResult<Vec<_>>>()?;
        Ok((prepared, params))
    }
}

impl SqlExecutor for PgExecutor {
    type Row = Row;

    fn fetch(&mut self, statement: &Statement) -> SqlResult<Vec<Row>> {
        debug!(sql = %statement.sql, "Executing query");
        let (prepared, params) = self.prepare(statement)?;
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect();
        self.client
            .query(&prepared, &param_refs)
            .map_err(|e| SqlError::execution(e.to_string()))
    }

    fn count(&mut self, statement: &Statement) -> SqlResult<u64> {
        debug!(sql = %statement.sql, "Executing count");
        let (prepared, params) = self.prepare(statement)?;
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect();
        let row = self
            .client
            .query_one(&prepared, &param_refs)
            .map_err(|e| SqlError::execution(e.to_string()))?;
        let count: i64 = row
            .try_get(0)
            .map_err(|e| SqlError::deserialization(e.to_string()))?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sieve_query::Filter;

    fn value_of(filter: &Filter, raw: &str) -> FilterValue {
        filter.predicates(raw).unwrap().remove(0).value
    }

    #[test]
    fn test_scalar_values_bind() {
        assert!(filter_value_to_sql(&FilterValue::Int(1)).is_ok());
        assert!(filter_value_to_sql(&FilterValue::Null).is_ok());
        assert!(filter_value_to_sql(&FilterValue::String("x".into())).is_ok());
    }

    #[test]
    fn test_list_is_rejected() {
        let err = filter_value_to_sql(&FilterValue::List(vec![])).err();
        assert!(matches!(err, Some(SqlError::Internal(_))));
        assert_eq!(PgParam::coerce(&FilterValue::List(vec![]), &Type::TEXT), None);
    }

    #[test]
    fn test_comparison_string_binds_to_integer_column() {
        let value = value_of(&Filter::comparison("age"), ">=18");
        assert_eq!(value, FilterValue::String("18".into()));
        assert_eq!(PgParam::coerce(&value, &Type::INT4), Some(PgParam::Int4(Some(18))));
        assert_eq!(PgParam::coerce(&value, &Type::INT2), Some(PgParam::Int2(Some(18))));
        assert_eq!(PgParam::coerce(&value, &Type::FLOAT8), Some(PgParam::Float8(Some(18.0))));
    }

    #[test]
    fn test_exact_int_binds_to_bigint_column() {
        let value = value_of(&Filter::exact("id"), "7");
        assert_eq!(value, FilterValue::Int(7));
        assert_eq!(PgParam::coerce(&value, &Type::INT8), Some(PgParam::Int8(Some(7))));
        assert_eq!(
            PgParam::coerce(&value, &Type::NUMERIC),
            Some(PgParam::Numeric(Some(Decimal::from(7))))
        );
        assert_eq!(
            PgParam::coerce(&value, &Type::VARCHAR),
            Some(PgParam::Text(Some("7".to_string())))
        );
    }

    #[test]
    fn test_interval_bounds_bind_to_numeric() {
        let filter = Filter::interval("price");
        let values: Vec<_> = filter
            .predicates("9.99-20")
            .unwrap()
            .into_iter()
            .map(|p| p.value)
            .collect();
        let params = bind_params(&values, &[Type::NUMERIC, Type::NUMERIC]).unwrap();
        assert_eq!(
            params,
            vec![
                PgParam::Numeric(Decimal::from_str("9.99").ok()),
                PgParam::Numeric(Some(Decimal::from(20))),
            ]
        );
    }

    #[test]
    fn test_temporal_coercion() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let midnight = date.and_time(NaiveTime::MIN);

        assert_eq!(
            PgParam::coerce(&FilterValue::Date(date), &Type::TIMESTAMPTZ),
            Some(PgParam::TimestampTz(Some(midnight.and_utc())))
        );
        assert_eq!(
            PgParam::coerce(&FilterValue::from("2024-03-01 00:00:00"), &Type::TIMESTAMP),
            Some(PgParam::Timestamp(Some(midnight)))
        );
        assert_eq!(
            PgParam::coerce(&FilterValue::from("2024-03-01T00:00:00Z"), &Type::DATE),
            None
        );
        assert_eq!(
            PgParam::coerce(&FilterValue::from("2024-03-01T00:00:00Z"), &Type::TIMESTAMPTZ),
            Some(PgParam::TimestampTz(Some(midnight.and_utc())))
        );
    }

    #[test]
    fn test_null_keeps_declared_type() {
        assert_eq!(PgParam::coerce(&FilterValue::Null, &Type::INT4), Some(PgParam::Int4(None)));
        assert_eq!(PgParam::coerce(&FilterValue::Null, &Type::UUID), Some(PgParam::Uuid(None)));
    }

    #[test]
    fn test_uncoercible_value_is_parameter_error() {
        let err = bind_params(&[FilterValue::Int(1), "abc".into()], &[Type::INT4, Type::INT4])
            .unwrap_err();
        assert!(matches!(
            err,
            SqlError::Parameter { position: 2, ref expected, .. } if expected == "int4"
        ));

        let err = bind_params(&[FilterValue::Long(i64::MAX)], &[Type::INT4]).unwrap_err();
        assert!(matches!(err, SqlError::Parameter { position: 1, .. }));
    }

    #[test]
    fn test_arity_mismatch_is_internal() {
        let err = bind_params(&[FilterValue::Int(1)], &[]).unwrap_err();
        assert!(matches!(err, SqlError::Internal(_)));
    }

    #[test]
    fn test_unknown_type_binds_natively() {
        assert_eq!(
            PgParam::coerce(&FilterValue::from("x"), &Type::JSONB),
            Some(PgParam::Native(FilterValue::from("x")))
        );
        assert!(PgParam::Native(FilterValue::Bool(true)).into_sql().is_ok());
    }
}
