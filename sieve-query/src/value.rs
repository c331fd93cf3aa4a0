//! Typed predicate payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::num::ParseIntError;

/// Integer literals shorter than this many characters (sign included) are
/// sniffed as 32-bit, longer ones as 64-bit.
pub const INT_LENGTH_THRESHOLD: usize = 10;

/// A value carried by a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer value.
    Int(i32),
    /// 64-bit integer value.
    Long(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Local date and time.
    DateTime(NaiveDateTime),
    /// Instant in UTC.
    Timestamp(DateTime<Utc>),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the list payload, if any.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Infer the type of a raw exact-match value.
    ///
    /// Checked in order: `true`/`false` (any case), an integer literal
    /// (32-bit below [`INT_LENGTH_THRESHOLD`] characters, 64-bit otherwise),
    /// a decimal literal, and finally the raw string. A 64-bit literal that
    /// overflows is an error.
    ///
    /// ```rust
    /// use sieve_query::FilterValue;
    ///
    /// assert_eq!(FilterValue::sniff("TRUE").unwrap(), FilterValue::Bool(true));
    /// assert_eq!(FilterValue::sniff("42").unwrap(), FilterValue::Int(42));
    /// assert_eq!(FilterValue::sniff("9876543210").unwrap(), FilterValue::Long(9_876_543_210));
    /// assert_eq!(FilterValue::sniff("1.5").unwrap(), FilterValue::Float(1.5));
    /// assert_eq!(FilterValue::sniff("1e5").unwrap(), FilterValue::from("1e5"));
    /// ```
    pub fn sniff(raw: &str) -> Result<Self, ParseIntError> {
        if raw.eq_ignore_ascii_case("true") {
            return Ok(Self::Bool(true));
        }
        if raw.eq_ignore_ascii_case("false") {
            return Ok(Self::Bool(false));
        }
        if is_integer_literal(raw) {
            return if raw.len() < INT_LENGTH_THRESHOLD {
                raw.parse().map(Self::Int)
            } else {
                raw.parse().map(Self::Long)
            };
        }
        if is_decimal_literal(raw) {
            if let Ok(f) = raw.parse() {
                return Ok(Self::Float(f));
            }
        }
        Ok(Self::String(raw.to_string()))
    }

    /// Coerce a raw value for an ordering comparison.
    ///
    /// A value containing `.` becomes a float, an integer outside the 32-bit
    /// range becomes a long, other integers stay 32-bit. Anything that does
    /// not parse is kept as a string.
    ///
    /// ```rust
    /// use sieve_query::FilterValue;
    ///
    /// assert_eq!(FilterValue::coerce_number("18"), FilterValue::Int(18));
    /// assert_eq!(FilterValue::coerce_number("3000000000"), FilterValue::Long(3_000_000_000));
    /// assert_eq!(FilterValue::coerce_number("2.5"), FilterValue::Float(2.5));
    /// assert_eq!(FilterValue::coerce_number("abc"), FilterValue::from("abc"));
    /// ```
    pub fn coerce_number(raw: &str) -> Self {
        if raw.contains('.') {
            return raw
                .parse::<f64>()
                .map(Self::Float)
                .unwrap_or_else(|_| Self::String(raw.to_string()));
        }
        match raw.parse::<i64>() {
            Ok(n) => match i32::try_from(n) {
                Ok(small) => Self::Int(small),
                Err(_) => Self::Long(n),
            },
            Err(_) => Self::String(raw.to_string()),
        }
    }
}

fn digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn unsigned(s: &str) -> &str {
    s.strip_prefix('-').unwrap_or(s)
}

fn is_integer_literal(s: &str) -> bool {
    digits(unsigned(s))
}

fn is_decimal_literal(s: &str) -> bool {
    match unsigned(s).split_once('.') {
        Some((int, frac)) => digits(int) && digits(frac),
        None => false,
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Long(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_booleans() {
        assert_eq!(FilterValue::sniff("true").unwrap(), FilterValue::Bool(true));
        assert_eq!(FilterValue::sniff("False").unwrap(), FilterValue::Bool(false));
        assert_eq!(FilterValue::sniff("yes").unwrap(), FilterValue::from("yes"));
    }

    #[test]
    fn test_sniff_integer_threshold() {
        assert_eq!(FilterValue::sniff("123456789").unwrap(), FilterValue::Int(123_456_789));
        assert_eq!(
            FilterValue::sniff("1234567890").unwrap(),
            FilterValue::Long(1_234_567_890)
        );
        assert_eq!(FilterValue::sniff("-12345678").unwrap(), FilterValue::Int(-12_345_678));
        assert_eq!(
            FilterValue::sniff("-123456789").unwrap(),
            FilterValue::Long(-123_456_789)
        );
    }

    #[test]
    fn test_sniff_long_overflow_is_error() {
        assert!(FilterValue::sniff("99999999999999999999").is_err());
    }

    #[test]
    fn test_sniff_decimal_and_strings() {
        assert_eq!(FilterValue::sniff("-0.25").unwrap(), FilterValue::Float(-0.25));
        assert_eq!(FilterValue::sniff(".5").unwrap(), FilterValue::from(".5"));
        assert_eq!(FilterValue::sniff("1.").unwrap(), FilterValue::from("1."));
        assert_eq!(FilterValue::sniff("").unwrap(), FilterValue::from(""));
        assert_eq!(FilterValue::sniff("abc").unwrap(), FilterValue::from("abc"));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(FilterValue::coerce_number("-5"), FilterValue::Int(-5));
        assert_eq!(
            FilterValue::coerce_number("2147483648"),
            FilterValue::Long(2_147_483_648)
        );
        assert_eq!(FilterValue::coerce_number("1.2.3"), FilterValue::from("1.2.3"));
        assert_eq!(
            FilterValue::coerce_number("2024-01-01"),
            FilterValue::from("2024-01-01")
        );
    }

    #[test]
    fn test_display() {
        let list = FilterValue::from(vec!["a", "b"]);
        assert_eq!(list.to_string(), "[a, b]");
        assert_eq!(FilterValue::Null.to_string(), "null");
    }

    #[test]
    fn test_serialize_untagged() {
        let v = FilterValue::from(vec![FilterValue::Int(1), FilterValue::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1,null]");

        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            serde_json::to_string(&FilterValue::Date(d)).unwrap(),
            "\"2024-03-01\""
        );
    }
}
