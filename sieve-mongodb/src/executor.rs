//! Query execution seam.

use bson::Document;

use crate::error::MongoResult;

/// Everything needed for a `find` call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindSpec {
    /// Filter document.
    pub filter: Document,
    /// Sort document, if any orders were given.
    pub sort: Option<Document>,
    /// Projection document, if any fields were selected.
    pub projection: Option<Document>,
    /// Documents to skip.
    pub skip: Option<u64>,
    /// Maximum documents to return.
    pub limit: Option<u32>,
}

/// Runs compiled queries against a collection.
pub trait MongoExecutor {
    /// Decoded document type.
    type Document;

    /// Run a `find` and decode every document.
    fn find(&mut self, spec: &FindSpec) -> MongoResult<Vec<Self::Document>>;

    /// Count documents matching `filter`.
    fn count(&mut self, filter: &Document) -> MongoResult<u64>;
}

impl<E: MongoExecutor + ?Sized> MongoExecutor for &mut E {
    type Document = E::Document;

    fn find(&mut self, spec: &FindSpec) -> MongoResult<Vec<Self::Document>> {
        (**self).find(spec)
    }

    fn count(&mut self, filter: &Document) -> MongoResult<u64> {
        (**self).count(filter)
    }
}
