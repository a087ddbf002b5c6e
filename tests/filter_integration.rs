//! Integration tests for the filter families and their wire form.
//!
//! These tests verify:
//! - The three end-to-end encodings
//! - Tri-state fidelity of nullable slots
//! - Structural (not logical) handling of nested `not`
//! - Strict decoding

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tern::prelude::*;
use tern::query::{Comparable, Enumerable, ValueKind};
use tern::wire;
use tern::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum Role {
    Admin,
    Member,
    Guest,
}

impl FilterValue for Role {
    const KIND: ValueKind = ValueKind::Enum;
}
impl Comparable for Role {}
impl Enumerable for Role {}

#[test]
fn test_string_filter_end_to_end() {
    let filter = Filter::builder()
        .in_list(vec!["a".to_string(), "b".to_string()])
        .not_filter(Filter::builder().contains("z".to_string()).build())
        .build();

    let encoded = wire::encode_string(&filter).unwrap();
    assert_eq!(encoded, r#"{"in":["a","b"],"not":{"contains":"z"}}"#);

    let decoded: Filter<String> = wire::decode_str(&encoded).unwrap();
    assert_eq!(decoded, filter);
}

#[test]
fn test_nullable_number_filter_end_to_end() {
    let null = NullableFilter::<f64>::is_null();
    let unset = NullableFilter::<f64>::default();

    assert_eq!(wire::encode_string(&null).unwrap(), r#"{"equals":null}"#);
    assert_eq!(wire::encode_string(&unset).unwrap(), "{}");

    let null_back: NullableFilter<f64> = wire::decode_str(r#"{"equals":null}"#).unwrap();
    let unset_back: NullableFilter<f64> = wire::decode_str("{}").unwrap();
    assert_eq!(null_back, null);
    assert_eq!(unset_back, unset);
    assert_ne!(null_back, unset_back);
}

#[test]
fn test_array_filter_end_to_end() {
    let filter = ArrayFilter::builder().has_every(vec![1i64, 2]).is_empty(false).build();
    assert_eq!(wire::encode_string(&filter).unwrap(), r#"{"hasEvery":[1,2],"isEmpty":false}"#);
    assert_eq!(wire::decode_str::<ArrayFilter<i64>>(r#"{"hasEvery":[1,2],"isEmpty":false}"#).unwrap(), filter);
}

#[test]
fn test_tri_state_round_trip_for_every_state() {
    let states = [
        NullableFilter::<i64>::default(),
        NullableFilter::builder().equals_null().build(),
        NullableFilter::builder().equals(7).build(),
    ];
    for state in states {
        let back: NullableFilter<i64> = wire::decode(&wire::encode(&state).unwrap()).unwrap();
        assert_eq!(back, state);
    }
}

#[test]
fn test_double_not_stays_structural() {
    let inner = Filter::from_literal(5i64);
    let double = Filter::builder()
        .not_filter(Filter::builder().not_filter(inner.clone()).build())
        .build();

    let decoded: Filter<i64> = wire::decode(&json!({ "not": { "not": { "equals": 5 } } })).unwrap();
    assert_eq!(decoded, double);
    assert_ne!(decoded, inner);

    let OneOf::Right(level_one) = decoded.not().unwrap() else {
        panic!("expected a nested filter");
    };
    assert!(level_one.not().unwrap().is_right());
}

#[test]
fn test_empty_in_is_preserved() {
    let filter: Filter<String> = wire::decode(&json!({ "in": [] })).unwrap();
    assert_eq!(filter.in_list(), Some(&[][..]));
    assert_eq!(wire::encode(&filter).unwrap(), json!({ "in": [] }));
    assert!(!filter.evaluate(&"anything".to_string()).unwrap());

    let filter: Filter<String> = wire::decode(&json!({ "notIn": [] })).unwrap();
    assert!(filter.evaluate(&"anything".to_string()).unwrap());
}

#[test]
fn test_datetime_and_object_id_filters() {
    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let filter = Filter::builder().gt(since).build();
    let encoded = wire::encode(&filter).unwrap();
    assert_eq!(encoded, json!({ "gt": "2024-01-01T00:00:00Z" }));
    assert_eq!(wire::decode::<Filter<chrono::DateTime<Utc>>>(&encoded).unwrap(), filter);

    let ids = Filter::builder()
        .in_list(vec![ObjectId::new("a1"), ObjectId::new("b2")])
        .build();
    assert_eq!(wire::encode(&ids).unwrap(), json!({ "in": ["a1", "b2"] }));
}

#[test]
fn test_enum_filters() {
    let filter = EnumFilter::builder().not_in(vec![Role::Guest]).build();
    assert_eq!(wire::encode(&filter).unwrap(), json!({ "notIn": ["guest"] }));
    assert!(filter.evaluate(&Role::Admin).unwrap());
    assert!(!filter.evaluate(&Role::Guest).unwrap());

    let nullable: NullableEnumFilter<Role> =
        wire::decode(&json!({ "in": ["member", null] })).unwrap();
    assert!(nullable.evaluate(&None).unwrap());
    assert!(nullable.evaluate(&Some(Role::Member)).unwrap());
    assert!(!nullable.evaluate(&Some(Role::Admin)).unwrap());

    let err = wire::decode::<EnumFilter<Role>>(&json!({ "equals": "owner" })).unwrap_err();
    assert_eq!(err.code, ErrorCode::DecodeError);
}

#[test]
fn test_strict_policy() {
    let cases = [
        json!({ "equals": 1, "unknown": 2 }),
        json!({ "equals": null }),
        json!({ "in": [1, null] }),
        json!({ "contains": 1 }),
        json!({ "not": "one" }),
    ];
    for payload in cases {
        let err = wire::decode::<Filter<i64>>(&payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError, "payload {payload}");
    }

    let err = wire::decode::<Filter<bool>>(&json!({ "in": [true] })).unwrap_err();
    assert_eq!(err.code, ErrorCode::DecodeError);
}

#[test]
fn test_nullable_filter_accepts_null_only_where_allowed() {
    let ok: NullableFilter<String> =
        wire::decode(&json!({ "in": ["x", null], "not": null })).unwrap();
    assert_eq!(ok.in_list().unwrap().len(), 2);
    assert!(ok.not().unwrap().try_left().unwrap().is_null());

    let err = wire::decode::<NullableFilter<String>>(&json!({ "startsWith": null })).unwrap_err();
    assert_eq!(err.code, ErrorCode::DecodeError);
}
