//! Statement execution seam.

use crate::error::SqlResult;
use crate::statement::Statement;

/// Runs rendered statements against a database.
///
/// The builder renders SQL and hands it here; connection handling, parameter
/// binding and row decoding belong to the implementation.
pub trait SqlExecutor {
    /// Decoded row type.
    type Row;

    /// Run a SELECT and decode every row.
    fn fetch(&mut self, statement: &Statement) -> SqlResult<Vec<Self::Row>>;

    /// Run a `SELECT COUNT(*)` and return the count.
    fn count(&mut self, statement: &Statement) -> SqlResult<u64>;
}

impl<E: SqlExecutor + ?Sized> SqlExecutor for &mut E {
    type Row = E::Row;

    fn fetch(&mut self, statement: &Statement) -> SqlResult<Vec<Self::Row>> {
        (**self).fetch(statement)
    }

    fn count(&mut self, statement: &Statement) -> SqlResult<u64> {
        (**self).count(statement)
    }
}
