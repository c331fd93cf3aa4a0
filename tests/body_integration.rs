//! Integration tests for JSON body filtering.

use pretty_assertions::assert_eq;
use sieve_query::testing::RecordingBuilder;
use sieve_query::{
    BodyMode, BodyRequest, Combinator, ErrorCode, Filter, FilterNode, FilterValue, InputSource,
    MapRequest, Operator, OrderRequest, Predicate, Sieve, SieveConfig, SortDirection,
};

fn filters() -> Vec<Filter> {
    vec![
        Filter::comparison("age"),
        Filter::partial("name"),
        Filter::exact("email"),
        Filter::in_list("tag"),
        Filter::enumeration("status", ["ACTIVE", "INACTIVE"]),
        Filter::default_search(["name", "email"]),
    ]
}

const BODY: &str = r#"{
    "filters": [
        {"field": "age", "value": "18", "operator": "GREATER_OR_EQUAL"},
        {"subFilters": [
            {"field": "name", "value": "ann%", "operator": "LIKE"},
            {"field": "email", "value": "ann@example.com", "type": "OR"}
        ]},
        {"field": "tag", "value": "a, b", "operator": "IN"},
        {"field": "status", "operator": "IS_NOT_NULL"}
    ],
    "sorts": [{"field": "name", "sort": "DESC"}, {"field": "age"}]
}"#;

#[test]
fn test_body_tree_applies_in_order() {
    let request = MapRequest::post(BODY);

    let q = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .allowed_sorts(["name", "age"])
        .use_body()
        .apply()
        .unwrap();

    assert_eq!(
        q.predicates(),
        vec![
            Predicate::and("age", Operator::GreaterOrEqual, "18"),
            Predicate::and("name", Operator::Like, "ann%"),
            Predicate::new("email", Operator::Equal, "ann@example.com", Combinator::Or),
            Predicate::and(
                "tag",
                Operator::In,
                FilterValue::List(vec!["a".into(), "b".into()])
            ),
            Predicate::and("status", Operator::IsNotNull, FilterValue::Null),
        ]
    );
    assert_eq!(
        q.orders(),
        vec![
            ("name".to_string(), SortDirection::Desc),
            ("age".to_string(), SortDirection::Asc),
        ]
    );
}

#[test]
fn test_body_ignored_without_body_mode() {
    let request = MapRequest::post(BODY).with_param("age", ">30");

    let q = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .apply()
        .unwrap();

    assert_eq!(
        q.predicates(),
        vec![Predicate::and("age", Operator::Greater, "30")]
    );
}

#[test]
fn test_get_request_falls_back_to_query_string() {
    let request = MapRequest::get().with_param("age", ">30");

    let sieve = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body();
    assert_eq!(sieve.input_source().unwrap(), InputSource::Request);
}

#[test]
fn test_only_body_rejects_get() {
    let request = MapRequest::get().with_param("age", ">30");

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_only_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::BodyRequired);
    assert!(err.is_configuration());
}

#[test]
fn test_body_mode_from_config() {
    let body = BodyRequest::new()
        .filter(FilterNode::leaf("age", Operator::Less, "65"))
        .sort(OrderRequest::desc("age"));
    let request = MapRequest::post_body(&body).unwrap();
    let config = SieveConfig::default().body_mode(BodyMode::Only);

    let q = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .with_config(config)
        .allowed_filters(filters())
        .allowed_sorts(["age"])
        .apply()
        .unwrap();

    assert_eq!(
        q.predicates(),
        vec![Predicate::and("age", Operator::Less, "65")]
    );
    assert_eq!(q.orders(), vec![("age".to_string(), SortDirection::Desc)]);
}

#[test]
fn test_unknown_body_field() {
    let request = MapRequest::post(r#"{"filters":[{"field":"password","value":"x"}]}"#);

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::FieldNotAllowed);
}

#[test]
fn test_search_is_not_body_capable() {
    let request = MapRequest::post(r#"{"filters":[{"field":"search","value":"ann"}]}"#);

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::FilterNotBodyCapable);
}

#[test]
fn test_body_enum_validation() {
    let request = MapRequest::post(
        r#"{"filters":[{"field":"status","value":"DELETED","operator":"EQUAL"}]}"#,
    );

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidEnumValue);
    assert!(err.is_value_error());
}

#[test]
fn test_malformed_json() {
    let request = MapRequest::post("{not json");

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidBody);
}

#[test]
fn test_missing_value_for_comparison() {
    let request = MapRequest::post(r#"{"filters":[{"field":"age","operator":"GREATER"}]}"#);

    let err = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::MissingValue);
}

#[test]
fn test_numeric_json_values() {
    let request = MapRequest::post(
        r#"{"filters":[
            {"field":"age","value":18,"operator":"GREATER"},
            {"field":"email","value":42}
        ]}"#,
    );

    let q = Sieve::for_request(RecordingBuilder::<()>::new(), &request)
        .allowed_filters(filters())
        .use_body()
        .apply()
        .unwrap();

    assert_eq!(
        q.predicates(),
        vec![
            Predicate::and("age", Operator::Greater, "18"),
            Predicate::and("email", Operator::Equal, FilterValue::Int(42)),
        ]
    );
}
