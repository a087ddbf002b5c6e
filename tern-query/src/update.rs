//! Update operations.
//!
//! An update operation tells the server how to change one field. Each family
//! is an enum, so a built value carries exactly one operation:
//!
//! ```rust
//! use tern_query::{NullableUpdateOperation, UpdateOperation};
//!
//! let op = UpdateOperation::increment(5i64);
//! assert_eq!(op.to_string(), r#"{"increment":5}"#);
//!
//! let clear = NullableUpdateOperation::<i64>::set_null();
//! assert_eq!(clear.to_string(), r#"{"set":null}"#);
//! ```
//!
//! [`UpdateInput`] is the loose form with one optional slot per wire key. It
//! is what the decoder reads and what callers fill when the operation is
//! chosen at runtime; [`UpdateInput::build`] rejects anything but exactly
//! one populated slot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::nullable::{Nullable, present};
use crate::value::{FilterValue, Numeric, ensure_encodable};

/// Update of a non-nullable scalar field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue"),
    try_from = "UpdateInput<T, T>"
)]
pub enum UpdateOperation<T> {
    /// Replace the value.
    Set(T),
    /// Add to the value.
    Increment(T),
    /// Subtract from the value.
    Decrement(T),
    /// Multiply the value.
    Multiply(T),
    /// Divide the value.
    Divide(T),
}

/// Update of a nullable scalar field. Only `set` may carry null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue"),
    try_from = "UpdateInput<Nullable<T>, T>"
)]
pub enum NullableUpdateOperation<T> {
    /// Replace the value, possibly with null.
    Set(Nullable<T>),
    /// Add to the value.
    Increment(T),
    /// Subtract from the value.
    Decrement(T),
    /// Multiply the value.
    Multiply(T),
    /// Divide the value.
    Divide(T),
}

/// Update of a non-nullable array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue"),
    try_from = "UpdateInput<Vec<T>, T>"
)]
pub enum ArrayUpdateOperation<T> {
    /// Replace the array.
    Set(Vec<T>),
    /// Append one element.
    Push(T),
}

/// Update of a nullable array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue"),
    try_from = "UpdateInput<Nullable<Vec<T>>, T>"
)]
pub enum NullableArrayUpdateOperation<T> {
    /// Replace the array, possibly with null.
    Set(Nullable<Vec<T>>),
    /// Append one element.
    Push(T),
}

/// All-optional form of an update operation, one slot per wire key.
///
/// `S` is the type `set` takes, `V` the operand of the other operations.
///
/// ```rust
/// use tern_query::{ErrorCode, UpdateInput, UpdateOperation};
///
/// let input = UpdateInput::<i64, i64> { increment: Some(1), ..UpdateInput::default() };
/// let op: UpdateOperation<i64> = input.build().unwrap();
/// assert_eq!(op, UpdateOperation::increment(1));
///
/// let input = UpdateInput::<i64, i64> { set: Some(1), increment: Some(1), ..UpdateInput::default() };
/// let err = input.build::<UpdateOperation<i64>>().unwrap_err();
/// assert_eq!(err.code, ErrorCode::MalformedRequest);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(
        serialize = "S: Serialize, V: Serialize",
        deserialize = "S: Deserialize<'de>, V: Deserialize<'de>"
    )
)]
pub struct UpdateInput<S, V> {
    /// Replace.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub set: Option<S>,
    /// Add.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub increment: Option<V>,
    /// Subtract.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub decrement: Option<V>,
    /// Multiply.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub multiply: Option<V>,
    /// Divide.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub divide: Option<V>,
    /// Append.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub push: Option<V>,
}

impl<S, V> Default for UpdateInput<S, V> {
    fn default() -> Self {
        Self {
            set: None,
            increment: None,
            decrement: None,
            multiply: None,
            divide: None,
            push: None,
        }
    }
}

impl<S, V> UpdateInput<S, V> {
    /// Wire keys of the populated slots, in wire order.
    pub fn populated(&self) -> Vec<&'static str> {
        let keys = [
            ("set", self.set.is_some()),
            ("increment", self.increment.is_some()),
            ("decrement", self.decrement.is_some()),
            ("multiply", self.multiply.is_some()),
            ("divide", self.divide.is_some()),
            ("push", self.push.is_some()),
        ];
        keys.into_iter().filter(|(_, set)| *set).map(|(key, _)| key).collect()
    }

    /// Turn the loose form into a single operation.
    pub fn build<O>(self) -> QueryResult<O>
    where
        O: TryFrom<Self, Error = QueryError>,
    {
        O::try_from(self)
    }

    fn single(&self) -> QueryResult<&'static str> {
        match self.populated().as_slice() {
            [key] => Ok(*key),
            keys => Err(QueryError::malformed_request(keys)),
        }
    }
}

fn invalid_for(key: &str, target: &str) -> QueryError {
    QueryError::new(
        ErrorCode::UnsupportedOperator,
        format!("'{}' is not a valid operation for {}", key, target),
    )
    .with_field(key)
    .with_suggestion("Use 'set' to replace the value")
}

fn ensure_numeric<T: FilterValue>(key: &str) -> QueryResult<()> {
    if T::KIND.is_numeric() {
        Ok(())
    } else {
        Err(invalid_for(key, &format!("a {} field", T::KIND)))
    }
}

macro_rules! scalar_update {
    ($op:ident, $set:ty, $operand:path) => {
        impl<T: FilterValue> TryFrom<UpdateInput<$set, T>> for $op<T> {
            type Error = QueryError;

            fn try_from(input: UpdateInput<$set, T>) -> QueryResult<Self> {
                let key = input.single()?;
                if key != "set" && key != "push" {
                    ensure_numeric::<T>(key)?;
                }
                let op = match input {
                    UpdateInput { set: Some(v), .. } => Self::Set(v),
                    UpdateInput { increment: Some(v), .. } => Self::Increment(v),
                    UpdateInput { decrement: Some(v), .. } => Self::Decrement(v),
                    UpdateInput { multiply: Some(v), .. } => Self::Multiply(v),
                    UpdateInput { divide: Some(v), .. } => Self::Divide(v),
                    UpdateInput { push: Some(_), .. } => {
                        return Err(invalid_for("push", "a scalar field"));
                    }
                    _ => return Err(QueryError::malformed_request(&[])),
                };
                Ok(op)
            }
        }

        impl<T: FilterValue> $op<T> {
            /// Wire key of the operation.
            pub fn key(&self) -> &'static str {
                match self {
                    Self::Set(_) => "set",
                    Self::Increment(_) => "increment",
                    Self::Decrement(_) => "decrement",
                    Self::Multiply(_) => "multiply",
                    Self::Divide(_) => "divide",
                }
            }

            /// Check that arithmetic only targets numeric values and that the
            /// operand has a JSON form.
            pub fn validate(&self) -> QueryResult<()> {
                match self {
                    Self::Set(value) => ensure_encodable("set", $operand(value)),
                    Self::Increment(value)
                    | Self::Decrement(value)
                    | Self::Multiply(value)
                    | Self::Divide(value) => {
                        ensure_numeric::<T>(self.key())?;
                        ensure_encodable(self.key(), Some(value))
                    }
                }
            }
        }

        impl<T: Numeric> $op<T> {
            /// Add `value`.
            pub fn increment(value: T) -> Self {
                Self::Increment(value)
            }

            /// Subtract `value`.
            pub fn decrement(value: T) -> Self {
                Self::Decrement(value)
            }

            /// Multiply by `value`.
            pub fn multiply(value: T) -> Self {
                Self::Multiply(value)
            }

            /// Divide by `value`.
            pub fn divide(value: T) -> Self {
                Self::Divide(value)
            }
        }
    };
}

macro_rules! array_update {
    ($op:ident, $set:ty, $operand:path) => {
        impl<T: FilterValue> TryFrom<UpdateInput<$set, T>> for $op<T> {
            type Error = QueryError;

            fn try_from(input: UpdateInput<$set, T>) -> QueryResult<Self> {
                match input.single()? {
                    "set" | "push" => {}
                    key => return Err(invalid_for(key, "an array field")),
                }
                match input {
                    UpdateInput { set: Some(v), .. } => Ok(Self::Set(v)),
                    UpdateInput { push: Some(v), .. } => Ok(Self::Push(v)),
                    _ => Err(QueryError::malformed_request(&[])),
                }
            }
        }

        impl<T: FilterValue> $op<T> {
            /// Append `value`.
            pub fn push(value: T) -> Self {
                Self::Push(value)
            }

            /// Wire key of the operation.
            pub fn key(&self) -> &'static str {
                match self {
                    Self::Set(_) => "set",
                    Self::Push(_) => "push",
                }
            }

            /// Array operations are valid for every element kind; only the
            /// operands are checked.
            pub fn validate(&self) -> QueryResult<()> {
                match self {
                    Self::Set(values) => ensure_encodable("set", $operand(values).into_iter().flatten()),
                    Self::Push(value) => ensure_encodable("push", Some(value)),
                }
            }
        }
    };
}

scalar_update!(UpdateOperation, T, Some);
scalar_update!(NullableUpdateOperation, Nullable<T>, Nullable::as_option);
array_update!(ArrayUpdateOperation, Vec<T>, Some);
array_update!(NullableArrayUpdateOperation, Nullable<Vec<T>>, Nullable::as_option);

impl<T: FilterValue> UpdateOperation<T> {
    /// Replace with `value`.
    pub fn set(value: T) -> Self {
        Self::Set(value)
    }
}

impl<T: FilterValue> NullableUpdateOperation<T> {
    /// Replace with `value`.
    pub fn set(value: T) -> Self {
        Self::Set(Nullable::value(value))
    }

    /// Replace with null.
    pub fn set_null() -> Self {
        Self::Set(Nullable::null())
    }
}

impl<T: FilterValue> ArrayUpdateOperation<T> {
    /// Replace with `values`.
    pub fn set(values: Vec<T>) -> Self {
        Self::Set(values)
    }
}

impl<T: FilterValue> NullableArrayUpdateOperation<T> {
    /// Replace with `values`.
    pub fn set(values: Vec<T>) -> Self {
        Self::Set(Nullable::value(values))
    }

    /// Replace with null.
    pub fn set_null() -> Self {
        Self::Set(Nullable::null())
    }
}

macro_rules! display_as_json {
    ($($op:ident),+) => {
        $(
            impl<T: FilterValue> fmt::Display for $op<T> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                    f.write_str(&json)
                }
            }
        )+
    };
}

display_as_json!(
    UpdateOperation,
    NullableUpdateOperation,
    ArrayUpdateOperation,
    NullableArrayUpdateOperation
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_single_key_objects() {
        assert_eq!(serde_json::to_value(UpdateOperation::set(1i32)).unwrap(), json!({ "set": 1 }));
        assert_eq!(
            serde_json::to_value(UpdateOperation::divide(Decimal::new(25, 1))).unwrap(),
            json!({ "divide": "2.5" })
        );
        assert_eq!(
            serde_json::to_value(ArrayUpdateOperation::push("x".to_string())).unwrap(),
            json!({ "push": "x" })
        );
        assert_eq!(
            serde_json::to_value(NullableArrayUpdateOperation::<i64>::set_null()).unwrap(),
            json!({ "set": null })
        );
    }

    #[test]
    fn test_decode_one_key() {
        let op: UpdateOperation<i64> = serde_json::from_value(json!({ "multiply": 3 })).unwrap();
        assert_eq!(op, UpdateOperation::multiply(3));

        let op: NullableUpdateOperation<i64> = serde_json::from_value(json!({ "set": null })).unwrap();
        assert_eq!(op, NullableUpdateOperation::set_null());
    }

    #[test]
    fn test_two_keys_are_malformed() {
        let input: UpdateInput<i64, i64> =
            serde_json::from_value(json!({ "set": 1, "increment": 2 })).unwrap();
        assert_eq!(input.populated(), vec!["set", "increment"]);
        let err = input.build::<UpdateOperation<i64>>().unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedRequest);

        let err = serde_json::from_value::<UpdateOperation<i64>>(json!({ "set": 1, "increment": 2 }));
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_input_is_malformed() {
        let err = UpdateInput::<i64, i64>::default()
            .build::<UpdateOperation<i64>>()
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedRequest);
    }

    #[test]
    fn test_invalid_operation_for_target() {
        let push = UpdateInput::<i64, i64> { push: Some(1), ..UpdateInput::default() };
        let err = push.build::<UpdateOperation<i64>>().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
        assert!(err.is_construction_error());
        assert_eq!(err.context.field.as_deref(), Some("push"));

        let inc = UpdateInput::<String, String> {
            increment: Some("a".to_string()),
            ..UpdateInput::default()
        };
        let err = inc.build::<UpdateOperation<String>>().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);

        let inc = UpdateInput::<Vec<i64>, i64> { increment: Some(1), ..UpdateInput::default() };
        let err = inc.build::<ArrayUpdateOperation<i64>>().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
    }

    #[test]
    fn test_validate_catches_direct_variant_misuse() {
        let err = UpdateOperation::Increment(true).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedOperator);
        assert!(err.is_construction_error());
        assert!(UpdateOperation::Set(true).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_operands() {
        let err = NullableUpdateOperation::set(f64::INFINITY).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::EncodeError);
        assert_eq!(err.context.field.as_deref(), Some("set"));

        let err = UpdateOperation::multiply(f32::NAN).validate().unwrap_err();
        assert_eq!(err.context.field.as_deref(), Some("multiply"));

        let err = NullableArrayUpdateOperation::set(vec![1.0, f64::NAN]).validate().unwrap_err();
        assert_eq!(err.context.field.as_deref(), Some("set"));

        assert!(NullableUpdateOperation::<f64>::set_null().validate().is_ok());
        assert!(ArrayUpdateOperation::push(2.5f64).validate().is_ok());
    }
}
