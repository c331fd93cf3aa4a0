//! Temporal parsing for date filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::value::FilterValue;

/// Target temporal type of a date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateKind {
    /// Calendar date, default pattern `%Y-%m-%d`.
    #[default]
    Date,
    /// Local date and time, default pattern `%Y-%m-%dT%H:%M:%S`.
    DateTime,
    /// UTC instant, default pattern `%Y-%m-%d %H:%M:%S`. RFC 3339 input is
    /// also accepted when no pattern is configured.
    Timestamp,
}

impl DateKind {
    /// The pattern used when none is configured.
    pub const fn default_pattern(&self) -> &'static str {
        match self {
            Self::Date => "%Y-%m-%d",
            Self::DateTime => "%Y-%m-%dT%H:%M:%S",
            Self::Timestamp => "%Y-%m-%d %H:%M:%S",
        }
    }
}

impl fmt::Display for DateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Timestamp => "Timestamp",
        })
    }
}

/// Temporal type plus optional chrono format pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateSpec {
    kind: DateKind,
    pattern: Option<String>,
}

impl DateSpec {
    /// Use the default pattern of `kind`.
    pub fn new(kind: DateKind) -> Self {
        Self { kind, pattern: None }
    }

    /// Use a custom chrono pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// The temporal type.
    pub fn kind(&self) -> DateKind {
        self.kind
    }

    /// The effective pattern.
    pub fn pattern(&self) -> &str {
        self.pattern
            .as_deref()
            .unwrap_or_else(|| self.kind.default_pattern())
    }

    /// Parse `value` into the configured temporal type.
    ///
    /// `param` only names the filter in the error.
    pub fn parse(&self, param: &str, value: &str) -> QueryResult<FilterValue> {
        let value = value.trim();
        let pattern = self.pattern();
        let parsed = match self.kind {
            DateKind::Date => NaiveDate::parse_from_str(value, pattern).map(FilterValue::Date),
            DateKind::DateTime => {
                NaiveDateTime::parse_from_str(value, pattern).map(FilterValue::DateTime)
            }
            DateKind::Timestamp => match NaiveDateTime::parse_from_str(value, pattern) {
                Ok(naive) => Ok(FilterValue::Timestamp(Utc.from_utc_datetime(&naive))),
                Err(e) if self.pattern.is_none() => DateTime::parse_from_rfc3339(value)
                    .map(|dt| FilterValue::Timestamp(dt.with_timezone(&Utc)))
                    .map_err(|_| e),
                Err(e) => Err(e),
            },
        };

        parsed.map_err(|e| QueryError::invalid_date(value, param, pattern, self.kind).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_default() {
        let spec = DateSpec::new(DateKind::Date);
        assert_eq!(
            spec.parse("createdAt", "2024-02-29").unwrap(),
            FilterValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
    }

    #[test]
    fn test_parse_custom_pattern() {
        let spec = DateSpec::new(DateKind::Date).with_pattern("%d/%m/%Y");
        assert_eq!(
            spec.parse("birth", " 01/12/1990 ").unwrap(),
            FilterValue::Date(NaiveDate::from_ymd_opt(1990, 12, 1).unwrap())
        );
    }

    #[test]
    fn test_parse_datetime() {
        let spec = DateSpec::new(DateKind::DateTime);
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            spec.parse("at", "2024-01-01T10:30:00").unwrap(),
            FilterValue::DateTime(expected)
        );
    }

    #[test]
    fn test_parse_timestamp_default_and_rfc3339() {
        let spec = DateSpec::new(DateKind::Timestamp);
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap();

        assert_eq!(
            spec.parse("at", "2024-01-01 10:30:00").unwrap(),
            FilterValue::Timestamp(expected)
        );
        assert_eq!(
            spec.parse("at", "2024-01-01T12:30:00+02:00").unwrap(),
            FilterValue::Timestamp(expected)
        );
    }

    #[test]
    fn test_custom_pattern_disables_rfc3339() {
        let spec = DateSpec::new(DateKind::Timestamp).with_pattern("%Y/%m/%d %H:%M");
        assert!(spec.parse("at", "2024-01-01T12:30:00+02:00").is_err());
    }

    #[test]
    fn test_error_names_everything() {
        let spec = DateSpec::new(DateKind::Date);
        let err = spec.parse("createdAt", "yesterday").unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidDate);
        assert!(err.message.contains("yesterday"));
        assert!(err.message.contains("createdAt"));
        assert!(err.message.contains("%Y-%m-%d"));
        assert!(err.message.contains("Date"));
    }
}
