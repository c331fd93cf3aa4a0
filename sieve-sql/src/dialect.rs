//! SQL dialects: placeholders and identifier quoting.

use crate::error::{SqlError, SqlResult};

/// Words that are quoted when used as identifiers.
const RESERVED: &[&str] = &[
    "user", "order", "group", "select", "from", "where", "table", "index", "key", "primary",
    "foreign", "check", "default", "null", "not", "and", "or", "in", "is", "like", "between",
    "case", "when", "then", "else", "end", "as", "on", "join", "left", "right", "inner", "outer",
    "cross", "natural", "using", "limit", "offset", "union", "intersect", "except", "all",
    "distinct", "having", "create", "alter", "drop", "insert", "update", "delete", "into",
    "values", "set", "returning",
];

/// Target database flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// PostgreSQL uses $1, $2, etc.
    #[default]
    Postgres,
    /// MySQL uses ?, ?, etc.
    MySql,
    /// SQLite uses ?, ?, etc.
    Sqlite,
}

impl Dialect {
    /// Get the parameter placeholder for a 1-based index.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::MySql | Self::Sqlite => "?".to_string(),
        }
    }

    /// Quote a validated identifier or dotted path where needed.
    ///
    /// ```rust
    /// use sieve_sql::Dialect;
    ///
    /// assert_eq!(Dialect::Postgres.quote("user.name"), "\"user\".name");
    /// assert_eq!(Dialect::MySql.quote("order"), "`order`");
    /// assert_eq!(Dialect::Sqlite.quote("created_at"), "created_at");
    /// ```
    pub fn quote(&self, path: &str) -> String {
        path.split('.')
            .map(|segment| {
                if RESERVED.contains(&segment.to_lowercase().as_str()) {
                    match self {
                        Self::MySql => format!("`{}`", segment),
                        Self::Postgres | Self::Sqlite => format!("\"{}\"", segment),
                    }
                } else {
                    segment.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render LIMIT/OFFSET. MySQL and SQLite need a LIMIT before any OFFSET.
    pub fn limit_clause(&self, limit: Option<u32>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, None) => None,
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {} OFFSET {}", limit, offset)),
            (None, Some(offset)) => Some(match self {
                Self::Postgres => format!("OFFSET {}", offset),
                Self::MySql => format!("LIMIT 18446744073709551615 OFFSET {}", offset),
                Self::Sqlite => format!("LIMIT -1 OFFSET {}", offset),
            }),
        }
    }
}

/// Check that `path` is a plain identifier or a dotted path of them.
///
/// Each segment must start with a letter or `_` and contain only ASCII
/// alphanumerics and `_`.
pub fn validate_identifier(path: &str) -> SqlResult<()> {
    let valid = !path.is_empty()
        && path.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if valid {
        Ok(())
    } else {
        Err(SqlError::unsafe_identifier(path))
    }
}
