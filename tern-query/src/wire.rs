//! JSON wire codec.
//!
//! Every filter and update operation is a JSON object whose keys are exactly
//! its populated fields. The decoder is strict:
//!
//! - unknown keys are rejected
//! - `null` is only accepted in nullable slots
//! - operators the value kind does not support are rejected
//!
//! All of these are [`ErrorCode::DecodeError`]; an update object with zero or
//! several keys is [`ErrorCode::MalformedRequest`].
//!
//! ```rust
//! use serde_json::json;
//! use tern_query::{wire, Filter, ErrorCode};
//!
//! let filter: Filter<String> = wire::decode(&json!({ "in": ["a", "b"] })).unwrap();
//! assert_eq!(filter.in_list().unwrap().len(), 2);
//!
//! let err = wire::decode::<Filter<bool>>(&json!({ "gt": true })).unwrap_err();
//! assert_eq!(err.code, ErrorCode::DecodeError);
//! ```

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::array::{ArrayFilter, NullableArrayFilter};
use crate::enum_filter::{EnumFilter, NullableEnumFilter};
use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::filter::{Filter, NullableFilter};
use crate::nullable::Nullable;
use crate::update::{
    ArrayUpdateOperation, NullableArrayUpdateOperation, NullableUpdateOperation, UpdateInput,
    UpdateOperation,
};
use crate::value::{Enumerable, FilterValue};

/// A value with a JSON wire form.
pub trait WireFormat: Serialize + DeserializeOwned {
    /// Name used in logs and error context.
    const NAME: &'static str;

    /// Check invariants the type system cannot express.
    fn validate(&self) -> QueryResult<()>;

    /// Read the value from a parsed payload, before validation.
    fn from_wire(value: &Value) -> QueryResult<Self> {
        Self::deserialize(value).map_err(QueryError::from)
    }
}

/// Encode `value` to a JSON value.
pub fn encode<W: WireFormat>(value: &W) -> QueryResult<Value> {
    value.validate().map_err(|e| e.with_context(format!("encoding {}", W::NAME)))?;
    let json = serde_json::to_value(value)
        .map_err(|e| QueryError::encode(e.to_string()).with_source(e))?;
    trace!(kind = W::NAME, payload = %json, "encoded");
    Ok(json)
}

/// Encode `value` to a JSON string.
pub fn encode_string<W: WireFormat>(value: &W) -> QueryResult<String> {
    let json = encode(value)?;
    Ok(json.to_string())
}

/// Decode a value from a parsed payload.
pub fn decode<W: WireFormat>(payload: &Value) -> QueryResult<W> {
    let value = W::from_wire(payload).map_err(|e| {
        debug!(kind = W::NAME, error = %e, "rejected payload");
        e.with_context(format!("decoding {}", W::NAME))
    })?;
    value.validate().map_err(|e| {
        debug!(kind = W::NAME, error = %e, "rejected payload");
        as_decode_error(e).with_context(format!("decoding {}", W::NAME))
    })?;
    trace!(kind = W::NAME, "decoded");
    Ok(value)
}

/// Decode a value from a JSON string.
pub fn decode_str<W: WireFormat>(payload: &str) -> QueryResult<W> {
    let json: Value = serde_json::from_str(payload)?;
    decode(&json)
}

fn as_decode_error(err: QueryError) -> QueryError {
    match err.code {
        ErrorCode::DecodeError | ErrorCode::MalformedRequest => err,
        _ => {
            let message = err.message.clone();
            let field = err.context.field.clone();
            let mut decoded = QueryError::decode(message).with_source(err);
            if let Some(field) = field {
                decoded = decoded.with_field(field);
            }
            decoded
        }
    }
}

macro_rules! filter_wire {
    ($bound:ident => $($filter:ident),+) => {
        $(
            impl<T: $bound> WireFormat for $filter<T> {
                const NAME: &'static str = stringify!($filter);

                fn validate(&self) -> QueryResult<()> {
                    $filter::validate(self)
                }
            }
        )+
    };
}

filter_wire!(FilterValue => Filter, NullableFilter, ArrayFilter, NullableArrayFilter);
filter_wire!(Enumerable => EnumFilter, NullableEnumFilter);

macro_rules! update_wire {
    ($($op:ident => $set:ty),+ $(,)?) => {
        $(
            impl<T: FilterValue> WireFormat for $op<T> {
                const NAME: &'static str = stringify!($op);

                fn validate(&self) -> QueryResult<()> {
                    $op::validate(self)
                }

                fn from_wire(value: &Value) -> QueryResult<Self> {
                    let input = UpdateInput::<$set, T>::deserialize(value)?;
                    input.build().map_err(as_decode_error)
                }
            }
        )+
    };
}

update_wire!(
    UpdateOperation => T,
    NullableUpdateOperation => Nullable<T>,
    ArrayUpdateOperation => Vec<T>,
    NullableArrayUpdateOperation => Nullable<Vec<T>>,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::MAX_NOT_DEPTH;
    use crate::value::ObjectId;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_encode_string_field_filter() {
        let filter = Filter::builder()
            .in_list(vec!["a".to_string(), "b".to_string()])
            .not_filter(Filter::builder().contains("z".to_string()).build())
            .build();
        let wire = encode_string(&filter).unwrap();
        assert_eq!(wire, r#"{"in":["a","b"],"not":{"contains":"z"}}"#);
        assert_eq!(decode_str::<Filter<String>>(&wire).unwrap(), filter);
    }

    #[test]
    fn test_date_filter_wire_form() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let filter = Filter::builder().gte(day).build();
        assert_eq!(encode(&filter).unwrap(), json!({ "gte": "2024-02-29" }));
    }

    #[test]
    fn test_strict_rejections() {
        let unknown = decode::<Filter<i64>>(&json!({ "like": 1 })).unwrap_err();
        assert_eq!(unknown.code, ErrorCode::DecodeError);

        let null = decode::<Filter<ObjectId>>(&json!({ "equals": null })).unwrap_err();
        assert_eq!(null.code, ErrorCode::DecodeError);

        let wrong_type = decode::<ArrayFilter<i64>>(&json!({ "has": "one" })).unwrap_err();
        assert_eq!(wrong_type.code, ErrorCode::DecodeError);

        let operator = decode::<Filter<i64>>(&json!({ "startsWith": 1 })).unwrap_err();
        assert_eq!(operator.code, ErrorCode::DecodeError);
        assert_eq!(operator.context.field.as_deref(), Some("startsWith"));
    }

    #[test]
    fn test_update_decode_keeps_malformed_request() {
        let err = decode::<UpdateOperation<i64>>(&json!({ "set": 1, "divide": 2 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedRequest);

        let err = decode::<UpdateOperation<i64>>(&json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedRequest);

        let err = decode::<ArrayUpdateOperation<i64>>(&json!({ "decrement": 1 })).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError);
    }

    #[test]
    fn test_encode_refuses_invalid_arithmetic() {
        let err = encode(&UpdateOperation::Multiply("x".to_string())).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
        assert!(err.is_construction_error());

        let err = decode::<UpdateOperation<String>>(&json!({ "multiply": "x" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError);
        assert_eq!(err.context.field.as_deref(), Some("multiply"));
    }

    #[test]
    fn test_encode_refuses_non_finite_floats() {
        let err = encode(&NullableFilter::builder().equals(f64::NAN).build()).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodeError);

        let err = encode_string(&NullableUpdateOperation::set(f64::INFINITY)).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodeError);
        assert_eq!(err.context.field.as_deref(), Some("set"));

        let finite = NullableUpdateOperation::set(1.5f64);
        assert_eq!(decode_str::<NullableUpdateOperation<f64>>(&encode_string(&finite).unwrap()).unwrap(), finite);
    }

    fn not_chain(depth: usize) -> Filter<i64> {
        (0..depth).fold(Filter::builder().in_list(vec![1, 2]).build(), |inner, _| {
            Filter::builder().not_filter(inner).build()
        })
    }

    #[test]
    fn test_deepest_encodable_not_chain_decodes() {
        let filter = not_chain(MAX_NOT_DEPTH);
        let wire = encode_string(&filter).unwrap();
        assert_eq!(decode_str::<Filter<i64>>(&wire).unwrap(), filter);
    }

    #[test]
    fn test_too_deep_not_chain_is_refused_both_ways() {
        let err = encode_string(&not_chain(MAX_NOT_DEPTH + 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodeError);
        assert_eq!(err.context.field.as_deref(), Some("not"));

        let payload = (0..=MAX_NOT_DEPTH).fold(json!({ "equals": 1 }), |inner, _| json!({ "not": inner }));
        let err = decode::<Filter<i64>>(&payload).unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError);
        assert_eq!(err.context.field.as_deref(), Some("not"));

        let text = format!("{}{{}}{}", r#"{"not":"#.repeat(200), "}".repeat(200));
        assert_eq!(decode_str::<Filter<i64>>(&text).unwrap_err().code, ErrorCode::DecodeError);
    }

    #[test]
    fn test_malformed_json_text() {
        let err = decode_str::<Filter<i64>>("{not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::DecodeError);
    }
}
