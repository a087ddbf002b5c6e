//! Filters over enum fields.
//!
//! An enum's value set is closed and unordered, so only equality and
//! membership exist here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::filter::MAX_NOT_DEPTH;
use crate::nullable::{Nullable, present};
use crate::one_of::OneOf;
use crate::value::{Enumerable, FilterValue};

/// Filter over a non-nullable enum field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct EnumFilter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<T>,
    #[serde(rename = "in", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) in_list: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not_in: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not: Option<Box<OneOf<T, EnumFilter<T>>>>,
}

/// Filter over a nullable enum field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct NullableEnumFilter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<Nullable<T>>,
    #[serde(rename = "in", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) in_list: Option<Vec<Nullable<T>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not_in: Option<Vec<Nullable<T>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not: Option<Box<OneOf<Nullable<T>, NullableEnumFilter<T>>>>,
}

/// Builds an [`EnumFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnumFilterBuilder<T> {
    inner: EnumFilter<T>,
}

/// Builds a [`NullableEnumFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct NullableEnumFilterBuilder<T> {
    inner: NullableEnumFilter<T>,
}

macro_rules! enum_filter_common {
    ($filter:ident, $builder:ident, $literal:ty) => {
        impl<T> Default for $filter<T> {
            fn default() -> Self {
                Self {
                    equals: None,
                    in_list: None,
                    not_in: None,
                    not: None,
                }
            }
        }

        impl<T: Enumerable> $filter<T> {
            /// Start building a filter.
            pub fn builder() -> $builder<T> {
                $builder { inner: Self::default() }
            }

            /// Wire keys of the populated operators, in wire order.
            pub fn populated(&self) -> Vec<&'static str> {
                let keys = [
                    ("equals", self.equals.is_some()),
                    ("in", self.in_list.is_some()),
                    ("notIn", self.not_in.is_some()),
                    ("not", self.not.is_some()),
                ];
                keys.into_iter().filter(|(_, set)| *set).map(|(key, _)| key).collect()
            }

            /// Check if no operator is populated.
            pub fn is_unconstrained(&self) -> bool {
                self.populated().is_empty()
            }

            /// `equals` operand.
            pub fn equals(&self) -> Option<&$literal> {
                self.equals.as_ref()
            }

            /// `in` operands.
            pub fn in_list(&self) -> Option<&[$literal]> {
                self.in_list.as_deref()
            }

            /// `notIn` operands.
            pub fn not_in(&self) -> Option<&[$literal]> {
                self.not_in.as_deref()
            }

            /// Negated literal or nested filter.
            pub fn not(&self) -> Option<&OneOf<$literal, $filter<T>>> {
                self.not.as_deref()
            }

            /// Every enum operator applies to every enum; only the depth of
            /// nested `not` filters is left to check.
            pub fn validate(&self) -> QueryResult<()> {
                self.validate_at(0)
            }

            fn validate_at(&self, depth: usize) -> QueryResult<()> {
                match self.not.as_deref() {
                    Some(OneOf::Right(_)) if depth >= MAX_NOT_DEPTH => {
                        Err(QueryError::nesting_too_deep(MAX_NOT_DEPTH))
                    }
                    Some(OneOf::Right(nested)) => nested.validate_at(depth + 1),
                    _ => Ok(()),
                }
            }
        }

        impl<T: FilterValue> fmt::Display for $filter<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }

        impl<T: Enumerable> $builder<T> {
            /// Negate a nested filter.
            pub fn not_filter(mut self, filter: $filter<T>) -> Self {
                self.inner.not = Some(Box::new(OneOf::Right(filter)));
                self
            }

            /// Finish building.
            pub fn build(self) -> $filter<T> {
                self.inner
            }
        }
    };
}

enum_filter_common!(EnumFilter, EnumFilterBuilder, T);
enum_filter_common!(NullableEnumFilter, NullableEnumFilterBuilder, Nullable<T>);

impl<T: Enumerable> EnumFilter<T> {
    /// `{equals: value}`.
    pub fn from_literal(value: T) -> Self {
        Self::builder().equals(value).build()
    }
}

impl<T: Enumerable> EnumFilterBuilder<T> {
    /// Field equals `value`.
    pub fn equals(mut self, value: T) -> Self {
        self.inner.equals = Some(value);
        self
    }

    /// Field is one of `values`.
    pub fn in_list(mut self, values: Vec<T>) -> Self {
        self.inner.in_list = Some(values);
        self
    }

    /// Field is none of `values`.
    pub fn not_in(mut self, values: Vec<T>) -> Self {
        self.inner.not_in = Some(values);
        self
    }

    /// Field differs from `value`.
    pub fn not(mut self, value: T) -> Self {
        self.inner.not = Some(Box::new(OneOf::Left(value)));
        self
    }
}

impl<T: Enumerable> NullableEnumFilter<T> {
    /// `{equals: value}`.
    pub fn from_literal(value: Nullable<T>) -> Self {
        Self::builder().equals_nullable(value).build()
    }

    /// `{equals: null}`.
    pub fn is_null() -> Self {
        Self::builder().equals_nullable(Nullable::null()).build()
    }

    /// `{not: null}`.
    pub fn is_not_null() -> Self {
        Self::builder().not_nullable(Nullable::null()).build()
    }
}

impl<T: Enumerable> NullableEnumFilterBuilder<T> {
    /// Field equals `value`.
    pub fn equals(self, value: T) -> Self {
        self.equals_nullable(Nullable::value(value))
    }

    /// Field equals `value`, which may be null.
    pub fn equals_nullable(mut self, value: Nullable<T>) -> Self {
        self.inner.equals = Some(value);
        self
    }

    /// Field is one of `values`.
    pub fn in_list(mut self, values: Vec<Nullable<T>>) -> Self {
        self.inner.in_list = Some(values);
        self
    }

    /// Field is none of `values`.
    pub fn not_in(mut self, values: Vec<Nullable<T>>) -> Self {
        self.inner.not_in = Some(values);
        self
    }

    /// Field differs from `value`.
    pub fn not(self, value: T) -> Self {
        self.not_nullable(Nullable::value(value))
    }

    /// Field differs from `value`, which may be null.
    pub fn not_nullable(mut self, value: Nullable<T>) -> Self {
        self.inner.not = Some(Box::new(OneOf::Left(value)));
        self
    }
}
