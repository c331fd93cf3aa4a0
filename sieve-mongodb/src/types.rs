//! Type conversions for MongoDB/BSON.

use bson::{Bson, oid::ObjectId};
use chrono::NaiveTime;
use sieve_query::FilterValue;

/// Convert a FilterValue to BSON.
///
/// Dates become BSON dates at midnight UTC; local date-times are taken as
/// UTC. Strings stay strings, see [`filter_value_to_object_id`].
pub fn filter_value_to_bson(value: &FilterValue) -> Bson {
    match value {
        FilterValue::Null => Bson::Null,
        FilterValue::Bool(b) => Bson::Boolean(*b),
        FilterValue::Int(i) => Bson::Int32(*i),
        FilterValue::Long(l) => Bson::Int64(*l),
        FilterValue::Float(f) => Bson::Double(*f),
        FilterValue::String(s) => Bson::String(s.clone()),
        FilterValue::Date(d) => {
            Bson::DateTime(bson::DateTime::from_chrono(d.and_time(NaiveTime::MIN).and_utc()))
        }
        FilterValue::DateTime(dt) => Bson::DateTime(bson::DateTime::from_chrono(dt.and_utc())),
        FilterValue::Timestamp(ts) => Bson::DateTime(bson::DateTime::from_chrono(*ts)),
        FilterValue::List(list) => Bson::Array(filter_values_to_bson(list)),
    }
}

/// Convert filter values to a BSON array.
pub fn filter_values_to_bson(values: &[FilterValue]) -> Vec<Bson> {
    values.iter().map(filter_value_to_bson).collect()
}

/// Convert a value bound for an ObjectId field.
///
/// 24-character hex strings, alone or inside a list, become ObjectIds.
/// Everything else converts as in [`filter_value_to_bson`].
pub fn filter_value_to_object_id(value: &FilterValue) -> Bson {
    match value {
        FilterValue::String(s) if s.len() == 24 && s.chars().all(|c| c.is_ascii_hexdigit()) => {
            ObjectId::parse_str(s)
                .map(Bson::ObjectId)
                .unwrap_or_else(|_| Bson::String(s.clone()))
        }
        FilterValue::List(items) => {
            Bson::Array(items.iter().map(filter_value_to_object_id).collect())
        }
        other => filter_value_to_bson(other),
    }
}

/// Translate a SQL LIKE pattern into an anchored regular expression.
///
/// ```rust
/// use sieve_mongodb::types::like_to_regex;
///
/// assert_eq!(like_to_regex("jo%"), "^jo.*$");
/// assert_eq!(like_to_regex("a_c"), "^a.c$");
/// assert_eq!(like_to_regex("1.5%"), "^1\\.5.*$");
/// ```
pub fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() + 4);
    regex.push('^');
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            other => regex.push_str(&regex_lite::escape(other.encode_utf8(&mut buf))),
        }
    }
    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use regex_lite::Regex;

    #[test]
    fn test_scalars() {
        assert_eq!(filter_value_to_bson(&FilterValue::Int(7)), Bson::Int32(7));
        assert_eq!(filter_value_to_bson(&FilterValue::Long(7)), Bson::Int64(7));
        assert_eq!(filter_value_to_bson(&FilterValue::Null), Bson::Null);
        assert_eq!(
            filter_value_to_bson(&FilterValue::String("ann".into())),
            Bson::String("ann".into())
        );
    }

    #[test]
    fn test_hex_strings_stay_strings() {
        let hex = "507f1f77bcf86cd799439011";
        assert_eq!(
            filter_value_to_bson(&FilterValue::String(hex.into())),
            Bson::String(hex.into())
        );
    }

    #[test]
    fn test_object_id_conversion() {
        let hex = "507f1f77bcf86cd799439011";
        let bson = filter_value_to_object_id(&FilterValue::String(hex.into()));
        assert!(matches!(bson, Bson::ObjectId(oid) if oid.to_hex() == hex));

        let list = FilterValue::List(vec![hex.into(), "not-an-id".into()]);
        let Bson::Array(items) = filter_value_to_object_id(&list) else {
            panic!("expected an array");
        };
        assert!(matches!(items[0], Bson::ObjectId(_)));
        assert_eq!(items[1], Bson::String("not-an-id".into()));

        assert_eq!(filter_value_to_object_id(&FilterValue::Int(3)), Bson::Int32(3));
    }

    #[test]
    fn test_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            filter_value_to_bson(&FilterValue::Date(date)),
            Bson::DateTime(bson::DateTime::from_chrono(expected))
        );
    }

    #[test]
    fn test_list() {
        let list = FilterValue::List(vec![FilterValue::Int(1), FilterValue::Int(2)]);
        assert_eq!(
            filter_value_to_bson(&list),
            Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)])
        );
    }

    #[test]
    fn test_like_translation_matches() {
        let contains = Regex::new(&like_to_regex("%ann%")).unwrap();
        assert!(contains.is_match("joanna"));
        assert!(!contains.is_match("jo"));

        let starts = Regex::new(&like_to_regex("ann%")).unwrap();
        assert!(starts.is_match("anna"));
        assert!(!starts.is_match("joanna"));

        let literal = Regex::new(&like_to_regex("a+b")).unwrap();
        assert!(literal.is_match("a+b"));
        assert!(!literal.is_match("aab"));
    }
}
