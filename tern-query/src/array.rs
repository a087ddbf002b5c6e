//! Filters over array fields.
//!
//! Value arrays and reference arrays share one definition: the element type
//! decides what is compared.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::QueryResult;
use crate::nullable::{Nullable, present};
use crate::value::{FilterValue, ensure_encodable};

/// Filter over a non-nullable array field.
///
/// ```rust
/// use tern_query::ArrayFilter;
///
/// let filter = ArrayFilter::builder().has_every(vec![1i64, 2]).is_empty(false).build();
/// assert_eq!(filter.to_string(), r#"{"hasEvery":[1,2],"isEmpty":false}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct ArrayFilter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has_some: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has_every: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) is_empty: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) length: Option<usize>,
}

/// Filter over a nullable array field. Only `equals` sees the null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct NullableArrayFilter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<Nullable<Vec<T>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has_some: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) has_every: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) is_empty: Option<bool>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) length: Option<usize>,
}

/// Builds an [`ArrayFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayFilterBuilder<T> {
    inner: ArrayFilter<T>,
}

/// Builds a [`NullableArrayFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct NullableArrayFilterBuilder<T> {
    inner: NullableArrayFilter<T>,
}

macro_rules! array_filter_common {
    ($filter:ident, $builder:ident, $equals:ty, $operand:path) => {
        impl<T> Default for $filter<T> {
            fn default() -> Self {
                Self {
                    equals: None,
                    has: None,
                    has_some: None,
                    has_every: None,
                    is_empty: None,
                    length: None,
                }
            }
        }

        impl<T: FilterValue> $filter<T> {
            /// Start building a filter.
            pub fn builder() -> $builder<T> {
                $builder { inner: Self::default() }
            }

            /// Wire keys of the populated operators, in wire order.
            pub fn populated(&self) -> Vec<&'static str> {
                let keys = [
                    ("equals", self.equals.is_some()),
                    ("has", self.has.is_some()),
                    ("hasSome", self.has_some.is_some()),
                    ("hasEvery", self.has_every.is_some()),
                    ("isEmpty", self.is_empty.is_some()),
                    ("length", self.length.is_some()),
                ];
                keys.into_iter().filter(|(_, set)| *set).map(|(key, _)| key).collect()
            }

            /// Check if no operator is populated.
            pub fn is_unconstrained(&self) -> bool {
                self.populated().is_empty()
            }

            /// `equals` operand.
            pub fn equals(&self) -> Option<&$equals> {
                self.equals.as_ref()
            }

            /// `has` operand.
            pub fn has(&self) -> Option<&T> {
                self.has.as_ref()
            }

            /// `hasSome` operands.
            pub fn has_some(&self) -> Option<&[T]> {
                self.has_some.as_deref()
            }

            /// `hasEvery` operands.
            pub fn has_every(&self) -> Option<&[T]> {
                self.has_every.as_deref()
            }

            /// `isEmpty` flag.
            pub fn is_empty(&self) -> Option<bool> {
                self.is_empty
            }

            /// `length` operand.
            pub fn length(&self) -> Option<usize> {
                self.length
            }

            /// Array operators apply to every element kind; only the operands
            /// themselves are checked.
            pub fn validate(&self) -> QueryResult<()> {
                ensure_encodable("equals", self.equals.iter().filter_map($operand).flatten())?;
                ensure_encodable("has", &self.has)?;
                ensure_encodable("hasSome", self.has_some.iter().flatten())?;
                ensure_encodable("hasEvery", self.has_every.iter().flatten())
            }
        }

        impl<T: FilterValue> fmt::Display for $filter<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }

        impl<T: FilterValue> $builder<T> {
            /// `value` is an element.
            pub fn has(mut self, value: T) -> Self {
                self.inner.has = Some(value);
                self
            }

            /// At least one of `values` is an element.
            pub fn has_some(mut self, values: Vec<T>) -> Self {
                self.inner.has_some = Some(values);
                self
            }

            /// Every one of `values` is an element.
            pub fn has_every(mut self, values: Vec<T>) -> Self {
                self.inner.has_every = Some(values);
                self
            }

            /// The array is (or is not) empty.
            pub fn is_empty(mut self, empty: bool) -> Self {
                self.inner.is_empty = Some(empty);
                self
            }

            /// The array has exactly `length` elements.
            pub fn length(mut self, length: usize) -> Self {
                self.inner.length = Some(length);
                self
            }

            /// Finish building.
            pub fn build(self) -> $filter<T> {
                self.inner
            }
        }
    };
}

array_filter_common!(ArrayFilter, ArrayFilterBuilder, Vec<T>, Some);
array_filter_common!(NullableArrayFilter, NullableArrayFilterBuilder, Nullable<Vec<T>>, Nullable::as_option);

impl<T: FilterValue> ArrayFilterBuilder<T> {
    /// The array equals `values`, element by element and in order.
    pub fn equals(mut self, values: Vec<T>) -> Self {
        self.inner.equals = Some(values);
        self
    }
}

impl<T: FilterValue> NullableArrayFilter<T> {
    /// `{equals: null}`: the field is null.
    pub fn is_null() -> Self {
        Self::builder().equals_null().build()
    }
}

impl<T: FilterValue> NullableArrayFilterBuilder<T> {
    /// The array equals `values`, element by element and in order.
    pub fn equals(self, values: Vec<T>) -> Self {
        self.equals_nullable(Nullable::value(values))
    }

    /// The field is null.
    pub fn equals_null(self) -> Self {
        self.equals_nullable(Nullable::null())
    }

    /// The field equals `values`, which may be null.
    pub fn equals_nullable(mut self, values: Nullable<Vec<T>>) -> Self {
        self.inner.equals = Some(values);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectId;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_has_every_and_is_empty() {
        let filter = ArrayFilter::builder().has_every(vec![1i64, 2]).is_empty(false).build();
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "hasEvery": [1, 2], "isEmpty": false })
        );
        assert_eq!(filter.populated(), vec!["hasEvery", "isEmpty"]);
    }

    #[test]
    fn test_reference_array() {
        let filter = ArrayFilter::builder().has(ObjectId::new("a1")).length(3).build();
        assert_eq!(filter.to_string(), r#"{"has":"a1","length":3}"#);
    }

    #[test]
    fn test_nullable_equals_null_vs_array() {
        let null = NullableArrayFilter::<i64>::is_null();
        let array = NullableArrayFilter::builder().equals(vec![1i64]).build();
        assert_eq!(null.to_string(), r#"{"equals":null}"#);
        assert_eq!(array.to_string(), r#"{"equals":[1]}"#);
        assert_ne!(null, array);
    }

    #[test]
    fn test_validate_rejects_non_finite_elements() {
        let filter = NullableArrayFilter::builder().equals(vec![0.5, f64::NAN]).build();
        let err = filter.validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::EncodeError);
        assert_eq!(err.context.field.as_deref(), Some("equals"));

        let filter = ArrayFilter::builder().has_some(vec![f32::INFINITY]).build();
        assert_eq!(filter.validate().unwrap_err().context.field.as_deref(), Some("hasSome"));
        assert!(NullableArrayFilter::<f64>::is_null().validate().is_ok());
    }

    #[test]
    fn test_decode_rejects_negative_length_and_null_equals() {
        assert!(serde_json::from_value::<ArrayFilter<i64>>(json!({ "length": -1 })).is_err());
        assert!(serde_json::from_value::<ArrayFilter<i64>>(json!({ "equals": null })).is_err());

        let nullable: NullableArrayFilter<i64> =
            serde_json::from_value(json!({ "equals": null })).unwrap();
        assert_eq!(nullable, NullableArrayFilter::is_null());
    }
}
