//! MongoDB query builder.

use bson::{Bson, Document, Regex};
use sieve_query::{
    ClauseBuilder, Combinator, FilterValue, Operator, Page, QueryBuilder, QueryResult,
    SortDirection,
};
use tracing::{debug, trace, warn};

use crate::convert::{MongoConnector, MongoOperator, MongoSort};
use crate::error::{MongoError, MongoResult};
use crate::executor::{FindSpec, MongoExecutor};
use crate::types::{filter_value_to_bson, filter_value_to_object_id, like_to_regex};

/// Check that `field` can be used as a filter or sort key.
pub fn validate_field(field: &str) -> MongoResult<()> {
    let valid = !field.is_empty()
        && !field.starts_with('$')
        && !field.contains('\0')
        && field.split('.').all(|segment| !segment.is_empty());
    if valid {
        Ok(())
    } else {
        Err(MongoError::invalid_field(field))
    }
}

/// A [`QueryBuilder`] that compiles to a MongoDB filter document.
///
/// Conditions are collected under a top-level `$and`. A condition joined with
/// OR is grouped with the one before it into an `$or`.
///
/// String values bound for `_id`, any `._id` path, or a field registered
/// with [`MongoQueryBuilder::with_object_id_fields`] are read as ObjectIds
/// when they are 24 hex characters.
///
/// ```rust
/// use bson::doc;
/// use sieve_mongodb::{FindSpec, MongoExecutor, MongoQueryBuilder, MongoResult};
/// use sieve_query::{ClauseBuilder, FilterValue, Operator};
///
/// struct Nothing;
///
/// impl MongoExecutor for Nothing {
///     type Document = bson::Document;
///     fn find(&mut self, _: &FindSpec) -> MongoResult<Vec<bson::Document>> { Ok(vec![]) }
///     fn count(&mut self, _: &bson::Document) -> MongoResult<u64> { Ok(0) }
/// }
///
/// let mut q = MongoQueryBuilder::new(Nothing);
/// q.where_and("age", Operator::Greater, FilterValue::Int(18)).unwrap();
/// assert_eq!(q.filter_document(), doc! { "$and": [{ "age": { "$gt": 18 } }] });
/// ```
pub struct MongoQueryBuilder<E: MongoExecutor> {
    executor: E,
    conditions: Vec<(Document, MongoConnector)>,
    sort: Document,
    projection: Vec<String>,
    skip: Option<u64>,
    limit: Option<u32>,
    object_id_fields: Vec<String>,
}

impl<E: MongoExecutor> MongoQueryBuilder<E> {
    /// Create an empty builder.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            conditions: Vec::new(),
            sort: Document::new(),
            projection: Vec::new(),
            skip: None,
            limit: None,
            object_id_fields: Vec::new(),
        }
    }

    /// Treat string values bound for `fields` as ObjectIds.
    pub fn with_object_id_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.object_id_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Whether values bound for `field` are read as ObjectIds.
    pub fn is_object_id_field(&self, field: &str) -> bool {
        field == "_id"
            || field.ends_with("._id")
            || self.object_id_fields.iter().any(|f| f == field)
    }

    /// Get the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Get the executor mutably.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Compile the filter document.
    pub fn filter_document(&self) -> Document {
        let mut groups: Vec<Vec<Document>> = Vec::new();
        for (condition, connector) in &self.conditions {
            match (connector, groups.last_mut()) {
                (MongoConnector::Or, Some(group)) => group.push(condition.clone()),
                _ => groups.push(vec![condition.clone()]),
            }
        }

        let mut filter = Document::new();
        if groups.is_empty() {
            return filter;
        }

        let clauses: Vec<Bson> = groups
            .into_iter()
            .map(|mut group| {
                if group.len() == 1 {
                    Bson::Document(group.remove(0))
                } else {
                    let alternatives: Vec<Bson> = group.into_iter().map(Bson::Document).collect();
                    let mut or = Document::new();
                    or.insert(MongoConnector::Or.as_str(), alternatives);
                    Bson::Document(or)
                }
            })
            .collect();
        filter.insert(MongoConnector::And.as_str(), clauses);
        filter
    }

    /// Compile the full `find` request.
    pub fn find_spec(&self) -> MongoResult<FindSpec> {
        let projection = if self.projection.is_empty() {
            None
        } else {
            let mut doc = Document::new();
            for field in &self.projection {
                validate_field(field)?;
                doc.insert(field.as_str(), 1);
            }
            Some(doc)
        };

        Ok(FindSpec {
            filter: self.filter_document(),
            sort: (!self.sort.is_empty()).then(|| self.sort.clone()),
            projection,
            skip: self.skip,
            limit: self.limit,
        })
    }

    fn condition(
        &self,
        field: &str,
        operator: Operator,
        value: FilterValue,
    ) -> MongoResult<Document> {
        let to_bson: fn(&FilterValue) -> Bson = if self.is_object_id_field(field) {
            filter_value_to_object_id
        } else {
            filter_value_to_bson
        };
        let mongo = MongoOperator::from(operator);
        let operand = match mongo {
            MongoOperator::IsNull | MongoOperator::NotNull => Bson::Null,
            MongoOperator::Regex => Bson::String(like_to_regex(&pattern_text(&value))),
            MongoOperator::NotRegex => Bson::RegularExpression(Regex {
                pattern: like_to_regex(&pattern_text(&value)),
                options: String::new(),
            }),
            MongoOperator::In | MongoOperator::Nin => match value {
                FilterValue::List(items) => Bson::Array(items.iter().map(to_bson).collect()),
                FilterValue::Null => Bson::Array(Vec::new()),
                other => Bson::Array(vec![to_bson(&other)]),
            },
            MongoOperator::Gte if operator == Operator::Between => {
                warn!(field = %field, "BETWEEN folded into $gte on the lower bound");
                match value {
                    FilterValue::List(items) => match items.first() {
                        Some(low) => to_bson(low),
                        None => {
                            return Err(MongoError::query(format!(
                                "BETWEEN on '{}' needs a lower bound",
                                field
                            )));
                        }
                    },
                    other => to_bson(&other),
                }
            }
            _ => to_bson(&value),
        };

        let mut inner = Document::new();
        inner.insert(mongo.as_str(), operand);
        let mut condition = Document::new();
        condition.insert(field, inner);
        Ok(condition)
    }
}

fn pattern_text(value: &FilterValue) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

impl<E: MongoExecutor> ClauseBuilder for MongoQueryBuilder<E> {
    fn r#where(
        &mut self,
        field: &str,
        operator: Operator,
        value: FilterValue,
        combinator: Combinator,
    ) -> QueryResult<()> {
        validate_field(field)?;
        let condition = self.condition(field, operator, value)?;
        trace!(field = %field, operator = %operator, "Adding MongoDB condition");
        self.conditions.push((condition, combinator.into()));
        Ok(())
    }

    fn order_by(&mut self, field: &str, direction: SortDirection) -> QueryResult<()> {
        validate_field(field)?;
        self.sort.insert(field, MongoSort::from(direction));
        Ok(())
    }
}

impl<E: MongoExecutor> QueryBuilder for MongoQueryBuilder<E> {
    type Item = E::Document;
    type Conditions = Document;

    fn select(&mut self, fields: &[&str]) {
        self.projection = fields.iter().map(|f| f.to_string()).collect();
    }

    fn add_select(&mut self, fields: &[&str]) {
        for field in fields {
            if !self.projection.iter().any(|p| p == field) {
                self.projection.push(field.to_string());
            }
        }
    }

    fn limit(&mut self, limit: u32) {
        self.limit = Some(limit);
    }

    fn offset(&mut self, offset: u64) {
        self.skip = Some(offset);
    }

    fn get(&mut self) -> QueryResult<Vec<Self::Item>> {
        let spec = self.find_spec()?;
        debug!(filter = %spec.filter, "Executing find");
        Ok(self.executor.find(&spec)?)
    }

    fn page(&mut self, limit: u32, offset: u64) -> QueryResult<Page<Self::Item>> {
        let filter = self.filter_document();
        debug!(filter = %filter, "Executing count");
        let total = self.executor.count(&filter)?;

        self.limit = Some(limit);
        self.skip = Some(offset);
        let documents = self.get()?;
        Ok(Page::new(documents, total, limit, offset))
    }

    fn find_first(&mut self) -> QueryResult<Option<Self::Item>> {
        let previous = self.limit.replace(1);
        let documents = self.get();
        self.limit = previous;
        Ok(documents?.into_iter().next())
    }

    fn where_conditions(&self) -> Document {
        self.filter_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct MockExecutor {
        total: u64,
        finds: Vec<FindSpec>,
        counts: Vec<Document>,
    }

    impl MongoExecutor for MockExecutor {
        type Document = Document;

        fn find(&mut self, spec: &FindSpec) -> MongoResult<Vec<Document>> {
            self.finds.push(spec.clone());
            Ok(vec![doc! { "name": "ann" }, doc! { "name": "bob" }])
        }

        fn count(&mut self, filter: &Document) -> MongoResult<u64> {
            self.counts.push(filter.clone());
            Ok(self.total)
        }
    }

    fn builder() -> MongoQueryBuilder<MockExecutor> {
        MongoQueryBuilder::new(MockExecutor {
            total: 12,
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_filter() {
        assert_eq!(builder().filter_document(), Document::new());
    }

    #[test]
    fn test_or_runs_grouped() {
        let mut q = builder();
        q.where_and("status", Operator::Equal, "ACTIVE".into())
            .unwrap();
        q.r#where("name", Operator::Like, "ann%".into(), Combinator::And)
            .unwrap();
        q.r#where("email", Operator::Like, "ann%".into(), Combinator::Or)
            .unwrap();

        assert_eq!(
            q.filter_document(),
            doc! {
                "$and": [
                    { "status": { "$eq": "ACTIVE" } },
                    { "$or": [
                        { "name": { "$regex": "^ann.*$" } },
                        { "email": { "$regex": "^ann.*$" } },
                    ] },
                ]
            }
        );
    }

    #[test]
    fn test_operator_shapes() {
        let mut q = builder();
        q.where_and("deleted", Operator::IsNull, FilterValue::Null)
            .unwrap();
        q.where_and("tag", Operator::NotIn, FilterValue::List(vec!["a".into(), "b".into()]))
            .unwrap();
        q.where_and("name", Operator::NotLike, "x%".into())
            .unwrap();

        let filter = q.filter_document();
        let clauses = filter.get_array("$and").unwrap();
        assert_eq!(clauses[0], Bson::Document(doc! { "deleted": { "$eq": Bson::Null } }));
        assert_eq!(clauses[1], Bson::Document(doc! { "tag": { "$nin": ["a", "b"] } }));
        let not_like = doc! {
            "name": {
                "$not": Bson::RegularExpression(Regex {
                    pattern: "^x.*$".to_string(),
                    options: String::new(),
                })
            }
        };
        assert_eq!(clauses[2], Bson::Document(not_like));
    }

    #[test]
    fn test_between_folds_to_gte() {
        let mut q = builder();
        q.where_and(
            "price",
            Operator::Between,
            FilterValue::List(vec![FilterValue::Int(10), FilterValue::Int(20)]),
        )
        .unwrap();
        assert_eq!(
            q.filter_document(),
            doc! { "$and": [{ "price": { "$gte": 10 } }] }
        );

        assert!(
            q.where_and("price", Operator::Between, FilterValue::List(vec![]))
                .is_err()
        );
    }

    #[test]
    fn test_object_ids_only_on_id_fields() {
        let hex = "507f1f77bcf86cd799439011";
        let oid = bson::oid::ObjectId::parse_str(hex).unwrap();

        let mut q = builder().with_object_id_fields(["ownerId"]);
        q.where_and("token", Operator::Equal, hex.into()).unwrap();
        q.where_and("_id", Operator::Equal, hex.into()).unwrap();
        q.where_and("author._id", Operator::Diff, hex.into()).unwrap();
        q.where_and("ownerId", Operator::In, FilterValue::List(vec![hex.into()]))
            .unwrap();

        assert_eq!(
            q.filter_document(),
            doc! {
                "$and": [
                    { "token": { "$eq": hex } },
                    { "_id": { "$eq": oid } },
                    { "author._id": { "$ne": oid } },
                    { "ownerId": { "$in": [oid] } },
                ]
            }
        );
    }

    #[test]
    fn test_rejects_operator_fields() {
        let mut q = builder();
        let err = q
            .where_and("$where", Operator::Equal, "1".into())
            .unwrap_err();
        assert!(err.is_backend());
        assert!(q.order_by("", SortDirection::Asc).is_err());
    }

    #[test]
    fn test_page_counts_then_finds() {
        let mut q = builder();
        q.where_and("age", Operator::GreaterOrEqual, FilterValue::Int(18))
            .unwrap();
        q.order_by("name", SortDirection::Asc).unwrap();
        q.order_by("age", SortDirection::Desc).unwrap();
        q.select(&["name"]);

        let page = q.page(5, 10).unwrap();
        assert_eq!(page.total_elements, 12);
        assert_eq!(page.len(), 2);

        let exec = q.executor();
        assert_eq!(exec.counts[0], doc! { "$and": [{ "age": { "$gte": 18 } }] });
        let spec = &exec.finds[0];
        assert_eq!(spec.sort, Some(doc! { "name": 1, "age": -1 }));
        assert_eq!(spec.projection, Some(doc! { "name": 1 }));
        assert_eq!(spec.skip, Some(10));
        assert_eq!(spec.limit, Some(5));
    }

    #[test]
    fn test_find_first_restores_limit() {
        let mut q = builder();
        let first = q.find_first().unwrap();
        assert_eq!(first, Some(doc! { "name": "ann" }));
        assert_eq!(q.executor().finds[0].limit, Some(1));

        q.get().unwrap();
        assert_eq!(q.executor().finds[1].limit, None);
    }
}
