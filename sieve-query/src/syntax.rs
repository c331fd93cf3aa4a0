//! Value mini-languages embedded in raw filter strings.
//!
//! - comparison prefix: `>=18`, `<=3`, `<>x`, `>5`, `<5`, else equality
//! - pipe range: `a|b` (dates), either side optional
//! - hyphen range: `a-b` with the legacy comma alias `a,b` (intervals)
//! - delimited list: `a,b,c`

use crate::operator::Operator;

/// Comparison tokens in match priority. Two-character tokens come first so
/// that `>=` is never read as `>`.
pub const COMPARISON_TOKENS: [(&str, Operator); 5] = [
    (">=", Operator::GreaterOrEqual),
    ("<=", Operator::LessOrEqual),
    ("<>", Operator::Diff),
    (">", Operator::Greater),
    ("<", Operator::Less),
];

fn matched_token(value: &str) -> Option<(&'static str, Operator)> {
    COMPARISON_TOKENS
        .iter()
        .copied()
        .find(|(token, _)| value.contains(token))
}

/// Operator named by the first comparison token found in `value`.
///
/// ```rust
/// use sieve_query::{Operator, syntax};
///
/// assert_eq!(syntax::comparison_operator(">=18"), Operator::GreaterOrEqual);
/// assert_eq!(syntax::comparison_operator("18"), Operator::Equal);
/// ```
pub fn comparison_operator(value: &str) -> Operator {
    matched_token(value)
        .map(|(_, op)| op)
        .unwrap_or(Operator::Equal)
}

/// `value` with the first occurrence of the matched token removed.
///
/// ```rust
/// use sieve_query::syntax;
///
/// assert_eq!(syntax::clean_value(">=18"), "18");
/// assert_eq!(syntax::clean_value("plain"), "plain");
/// ```
pub fn clean_value(value: &str) -> String {
    match matched_token(value) {
        Some((token, _)) => value.replacen(token, "", 1),
        None => value.to_string(),
    }
}

/// Operator and cleaned, trimmed value in one pass.
pub fn split_comparison(value: &str) -> (Operator, String) {
    (comparison_operator(value), clean_value(value).trim().to_string())
}

/// Split a delimited list, trimming items and dropping empty ones.
pub fn split_list<'a>(value: &'a str, delimiter: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Split a pipe range into its optional sides.
///
/// Returns `None` when the value contains no pipe.
pub fn split_pipe_range(value: &str) -> Option<(Option<&str>, Option<&str>)> {
    let (from, to) = value.split_once('|')?;
    Some((non_blank(from), non_blank(to)))
}

/// Split a hyphen interval, after normalising the legacy comma separator.
///
/// Returns `None` when there is no separator. Only the first two parts are
/// considered.
pub fn split_interval(value: &str) -> Option<(Option<String>, Option<String>)> {
    let normalised = value.replace(',', "-");
    if !normalised.contains('-') {
        return None;
    }
    let mut parts = normalised.split('-');
    let from = parts.next().and_then(non_blank).map(str::to_string);
    let to = parts.next().and_then(non_blank).map(str::to_string);
    Some((from, to))
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}
