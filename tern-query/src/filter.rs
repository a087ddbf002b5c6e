//! Scalar field filters.
//!
//! [`Filter<T>`] constrains a non-nullable field, [`NullableFilter<T>`] a
//! nullable one. All populated operators of one filter are AND-ed. `not`
//! holds either a literal (`field != literal`) or a nested filter
//! (`NOT nested`) and nests up to [`MAX_NOT_DEPTH`] levels; nothing here
//! simplifies it.
//!
//! Filters are immutable once built:
//!
//! ```rust
//! use tern_query::Filter;
//!
//! let filter = Filter::builder()
//!     .in_list(vec!["a".to_string(), "b".to_string()])
//!     .not_filter(Filter::builder().contains("z".to_string()).build())
//!     .build();
//!
//! assert_eq!(filter.to_string(), r#"{"in":["a","b"],"not":{"contains":"z"}}"#);
//! ```
//!
//! Operators only exist where the value supports them: `lt` needs
//! [`Orderable`], `contains` needs [`Textual`], so `Filter::<bool>::builder().lt(true)`
//! does not compile.
//!
//! The nullable variant separates "is null" from "no constraint":
//!
//! ```rust
//! use tern_query::NullableFilter;
//!
//! assert_eq!(NullableFilter::<f64>::is_null().to_string(), r#"{"equals":null}"#);
//! assert_eq!(NullableFilter::<f64>::default().to_string(), "{}");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{QueryError, QueryResult};
use crate::nullable::{Nullable, present};
use crate::one_of::OneOf;
use crate::value::{Comparable, FilterValue, Orderable, Textual, ensure_encodable};

/// Filter over a non-nullable field of type `T`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct Filter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<T>,
    #[serde(rename = "in", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) in_list: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not_in: Option<Vec<T>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) lt: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) lte: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) gt: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) gte: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) contains: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) starts_with: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) ends_with: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) matches: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not: Option<Box<OneOf<T, Filter<T>>>>,
}

/// Filter over a nullable field of type `T`.
///
/// `equals`, `in`, `notIn` and `not` accept [`Nullable<T>`]; the ordering and
/// text operators stay over bare `T` since null has no order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    deny_unknown_fields,
    bound(serialize = "T: FilterValue", deserialize = "T: FilterValue")
)]
pub struct NullableFilter<T> {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) equals: Option<Nullable<T>>,
    #[serde(rename = "in", default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) in_list: Option<Vec<Nullable<T>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not_in: Option<Vec<Nullable<T>>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) lt: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) lte: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) gt: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) gte: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) contains: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) starts_with: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) ends_with: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) matches: Option<T>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub(crate) not: Option<Box<OneOf<Nullable<T>, NullableFilter<T>>>>,
}

/// Builds a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBuilder<T> {
    inner: Filter<T>,
}

/// Builds a [`NullableFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct NullableFilterBuilder<T> {
    inner: NullableFilter<T>,
}

/// `{equals: value}` for a non-nullable field.
///
/// This is the explicit spelling of "a bare value stands for equality".
pub fn filter_from_literal<T: FilterValue>(value: T) -> Filter<T> {
    Filter::from_literal(value)
}

/// Deepest chain of nested `not` filters below the root that encodes.
///
/// `serde_json` stops parsing at 128 nested containers, so a deeper chain
/// could be written but never read back.
pub const MAX_NOT_DEPTH: usize = 100;

/// Reject `key` when it is populated but the value kind does not allow it.
pub(crate) fn ensure_operator<T: FilterValue>(key: &'static str, populated: bool, allowed: bool) -> QueryResult<()> {
    if populated && !allowed {
        Err(QueryError::unsupported_operator(key, T::KIND))
    } else {
        Ok(())
    }
}

macro_rules! scalar_filter_common {
    ($filter:ident, $builder:ident, $literal:ty, $operand:path) => {
        impl<T> Default for $filter<T> {
            fn default() -> Self {
                Self {
                    equals: None,
                    in_list: None,
                    not_in: None,
                    lt: None,
                    lte: None,
                    gt: None,
                    gte: None,
                    contains: None,
                    starts_with: None,
                    ends_with: None,
                    matches: None,
                    not: None,
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
                    ("in", self.in_list.is_some()),
                    ("notIn", self.not_in.is_some()),
                    ("lt", self.lt.is_some()),
                    ("lte", self.lte.is_some()),
                    ("gt", self.gt.is_some()),
                    ("gte", self.gte.is_some()),
                    ("contains", self.contains.is_some()),
                    ("startsWith", self.starts_with.is_some()),
                    ("endsWith", self.ends_with.is_some()),
                    ("matches", self.matches.is_some()),
                    ("not", self.not.is_some()),
                ];
                keys.into_iter().filter(|(_, set)| *set).map(|(key, _)| key).collect()
            }

            /// Check if no operator is populated (no constraint).
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

            /// `lt` operand.
            pub fn lt(&self) -> Option<&T> {
                self.lt.as_ref()
            }

            /// `lte` operand.
            pub fn lte(&self) -> Option<&T> {
                self.lte.as_ref()
            }

            /// `gt` operand.
            pub fn gt(&self) -> Option<&T> {
                self.gt.as_ref()
            }

            /// `gte` operand.
            pub fn gte(&self) -> Option<&T> {
                self.gte.as_ref()
            }

            /// `contains` operand.
            pub fn contains(&self) -> Option<&T> {
                self.contains.as_ref()
            }

            /// `startsWith` operand.
            pub fn starts_with(&self) -> Option<&T> {
                self.starts_with.as_ref()
            }

            /// `endsWith` operand.
            pub fn ends_with(&self) -> Option<&T> {
                self.ends_with.as_ref()
            }

            /// `matches` pattern.
            pub fn matches(&self) -> Option<&T> {
                self.matches.as_ref()
            }

            /// Negated literal or nested filter.
            pub fn not(&self) -> Option<&OneOf<$literal, $filter<T>>> {
                self.not.as_deref()
            }

            /// Check every populated operator against the capabilities of `T`,
            /// including nested `not` filters, and every operand for a JSON form.
            pub fn validate(&self) -> QueryResult<()> {
                self.validate_at(0)
            }

            fn validate_at(&self, depth: usize) -> QueryResult<()> {
                let kind = T::KIND;
                ensure_operator::<T>("in", self.in_list.is_some(), kind.supports_membership())?;
                ensure_operator::<T>("notIn", self.not_in.is_some(), kind.supports_membership())?;
                for (key, set) in [
                    ("lt", self.lt.is_some()),
                    ("lte", self.lte.is_some()),
                    ("gt", self.gt.is_some()),
                    ("gte", self.gte.is_some()),
                ] {
                    ensure_operator::<T>(key, set, kind.is_ordered())?;
                }
                for (key, set) in [
                    ("contains", self.contains.is_some()),
                    ("startsWith", self.starts_with.is_some()),
                    ("endsWith", self.ends_with.is_some()),
                    ("matches", self.matches.is_some()),
                ] {
                    ensure_operator::<T>(key, set, kind.is_textual())?;
                }
                ensure_encodable("equals", self.equals.iter().filter_map($operand))?;
                ensure_encodable("in", self.in_list.iter().flatten().filter_map($operand))?;
                ensure_encodable("notIn", self.not_in.iter().flatten().filter_map($operand))?;
                for (key, operand) in [
                    ("lt", &self.lt),
                    ("lte", &self.lte),
                    ("gt", &self.gt),
                    ("gte", &self.gte),
                ] {
                    ensure_encodable(key, operand)?;
                }
                match self.not.as_deref() {
                    None => Ok(()),
                    Some(OneOf::Left(literal)) => ensure_encodable("not", $operand(literal)),
                    Some(OneOf::Right(_)) if depth >= MAX_NOT_DEPTH => {
                        Err(QueryError::nesting_too_deep(MAX_NOT_DEPTH))
                    }
                    Some(OneOf::Right(nested)) => nested.validate_at(depth + 1),
                }
            }
        }

        impl<T: FilterValue> fmt::Display for $filter<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }

        impl<T: FilterValue> $builder<T> {
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

        impl<T: Orderable> $builder<T> {
            /// Field is less than `value`.
            pub fn lt(mut self, value: T) -> Self {
                self.inner.lt = Some(value);
                self
            }

            /// Field is less than or equal to `value`.
            pub fn lte(mut self, value: T) -> Self {
                self.inner.lte = Some(value);
                self
            }

            /// Field is greater than `value`.
            pub fn gt(mut self, value: T) -> Self {
                self.inner.gt = Some(value);
                self
            }

            /// Field is greater than or equal to `value`.
            pub fn gte(mut self, value: T) -> Self {
                self.inner.gte = Some(value);
                self
            }
        }

        impl<T: Textual> $builder<T> {
            /// Field contains `value`.
            pub fn contains(mut self, value: T) -> Self {
                self.inner.contains = Some(value);
                self
            }

            /// Field starts with `value`.
            pub fn starts_with(mut self, value: T) -> Self {
                self.inner.starts_with = Some(value);
                self
            }

            /// Field ends with `value`.
            pub fn ends_with(mut self, value: T) -> Self {
                self.inner.ends_with = Some(value);
                self
            }

            /// Field matches `pattern`. The dialect belongs to the evaluator.
            pub fn matches(mut self, pattern: T) -> Self {
                self.inner.matches = Some(pattern);
                self
            }
        }
    };
}

scalar_filter_common!(Filter, FilterBuilder, T, Some);
scalar_filter_common!(NullableFilter, NullableFilterBuilder, Nullable<T>, Nullable::as_option);

impl<T: FilterValue> Filter<T> {
    /// `{equals: value}`.
    pub fn from_literal(value: T) -> Self {
        Self::builder().equals(value).build()
    }
}

impl<T: FilterValue> FilterBuilder<T> {
    /// Field equals `value`.
    pub fn equals(mut self, value: T) -> Self {
        self.inner.equals = Some(value);
        self
    }

    /// Field differs from `value`.
    pub fn not(mut self, value: T) -> Self {
        self.inner.not = Some(Box::new(OneOf::Left(value)));
        self
    }
}

impl<T: Comparable> FilterBuilder<T> {
    /// Field is one of `values`. An empty list matches nothing.
    pub fn in_list(mut self, values: Vec<T>) -> Self {
        self.inner.in_list = Some(values);
        self
    }

    /// Field is none of `values`. An empty list matches everything.
    pub fn not_in(mut self, values: Vec<T>) -> Self {
        self.inner.not_in = Some(values);
        self
    }
}

impl<T: FilterValue> NullableFilter<T> {
    /// `{equals: value}`.
    pub fn from_literal(value: Nullable<T>) -> Self {
        Self::builder().equals_nullable(value).build()
    }

    /// `{equals: null}`: the field is null.
    pub fn is_null() -> Self {
        Self::builder().equals_null().build()
    }

    /// `{not: null}`: the field holds a value.
    pub fn is_not_null() -> Self {
        Self::builder().not_null().build()
    }
}

impl<T: FilterValue> NullableFilterBuilder<T> {
    /// Field equals `value`.
    pub fn equals(self, value: T) -> Self {
        self.equals_nullable(Nullable::value(value))
    }

    /// Field is null.
    pub fn equals_null(self) -> Self {
        self.equals_nullable(Nullable::null())
    }

    /// Field equals `value`, which may be null.
    pub fn equals_nullable(mut self, value: Nullable<T>) -> Self {
        self.inner.equals = Some(value);
        self
    }

    /// Field differs from `value`.
    pub fn not(self, value: T) -> Self {
        self.not_nullable(Nullable::value(value))
    }

    /// Field is not null.
    pub fn not_null(self) -> Self {
        self.not_nullable(Nullable::null())
    }

    /// Field differs from `value`, which may be null.
    pub fn not_nullable(mut self, value: Nullable<T>) -> Self {
        self.inner.not = Some(Box::new(OneOf::Left(value)));
        self
    }
}

impl<T: Comparable> NullableFilterBuilder<T> {
    /// Field is one of `values`; a null entry admits null fields.
    pub fn in_list(mut self, values: Vec<Nullable<T>>) -> Self {
        self.inner.in_list = Some(values);
        self
    }

    /// Field is none of `values`; a null entry excludes null fields.
    pub fn not_in(mut self, values: Vec<Nullable<T>>) -> Self {
        self.inner.not_in = Some(values);
        self
    }
}
