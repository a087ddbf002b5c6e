//! Value kinds and the capability traits that select filter operators.
//!
//! One generic filter type serves every scalar field. Which operators a
//! `Filter<T>` exposes is decided by the traits `T` implements:
//!
//! | Trait          | Unlocks                                     | Implemented by |
//! |----------------|---------------------------------------------|----------------|
//! | [`FilterValue`]| `equals`, `not`                             | every value    |
//! | [`Comparable`] | `in`, `notIn`                               | all but `bool` |
//! | [`Orderable`]  | `lt`, `lte`, `gt`, `gte`                    | ids, numbers, strings, dates |
//! | [`Textual`]    | `contains`, `startsWith`, `endsWith`, `matches` | `String`   |
//! | [`Numeric`]    | `increment`, `decrement`, `multiply`, `divide` updates | numbers, `Decimal` |
//! | [`Enumerable`] | use in `EnumFilter`                         | user enums     |
//!
//! The same information is available at runtime through [`FilterValue::KIND`],
//! which the strict decoder uses to reject operators a payload should not carry.
//!
//! User enums opt in like this:
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use tern_query::value::{Comparable, Enumerable, FilterValue, ValueKind};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! enum Role {
//!     Admin,
//!     Member,
//! }
//!
//! impl FilterValue for Role {
//!     const KIND: ValueKind = ValueKind::Enum;
//! }
//! impl Comparable for Role {}
//! impl Enumerable for Role {}
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::{QueryError, QueryResult};

/// Runtime description of a value's kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Object identifier, a string on the wire.
    ObjectId,
    /// Boolean.
    Bool,
    /// Integer of any width.
    Int,
    /// Floating point number.
    Float,
    /// Arbitrary precision decimal, a string on the wire.
    Decimal,
    /// UTF-8 string.
    String,
    /// Calendar date, `YYYY-MM-DD` on the wire.
    Date,
    /// UTC timestamp, RFC 3339 on the wire.
    DateTime,
    /// Member of a closed, unordered value set.
    Enum,
}

impl ValueKind {
    /// Kind name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectId => "ObjectId",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Float => "Float",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Enum => "Enum",
        }
    }

    /// Check if `in` and `notIn` apply.
    pub fn supports_membership(&self) -> bool {
        !matches!(self, Self::Bool)
    }

    /// Check if `lt`, `lte`, `gt` and `gte` apply.
    pub fn is_ordered(&self) -> bool {
        !matches!(self, Self::Bool | Self::Enum)
    }

    /// Check if arithmetic update operations apply.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float | Self::Decimal)
    }

    /// Check if substring and pattern operators apply.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can appear as the operand of a filter or update operation.
pub trait FilterValue:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// The kind of this value.
    const KIND: ValueKind;

    /// Order two values. `None` when the kind is unordered or the values are
    /// incomparable (`NaN`).
    fn compare(&self, _other: &Self) -> Option<Ordering> {
        None
    }

    /// Text view for substring operators.
    fn as_text(&self) -> Option<&str> {
        None
    }

    /// Check if the value has a faithful JSON form. `serde_json` writes
    /// non-finite floats as `null`, which would turn a value into a null.
    fn is_encodable(&self) -> bool {
        true
    }
}

/// Reject the first operand of `key` that has no faithful JSON form.
pub(crate) fn ensure_encodable<'a, T: FilterValue>(
    key: &str,
    operands: impl IntoIterator<Item = &'a T>,
) -> QueryResult<()> {
    match operands.into_iter().find(|v| !v.is_encodable()) {
        Some(value) => Err(QueryError::unrepresentable(key, value)),
        None => Ok(()),
    }
}

/// Values that support `in` / `notIn`.
pub trait Comparable: FilterValue {}

/// Values with a total or partial order.
pub trait Orderable: Comparable {}

/// Values that support arithmetic update operations.
pub trait Numeric: Orderable {}

/// Values that support substring and pattern operators.
pub trait Textual: Orderable {}

/// Members of a closed, unordered value set.
pub trait Enumerable: Comparable {}

/// Object identifier, transported as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

macro_rules! ordered_value {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl FilterValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                #[inline]
                fn compare(&self, other: &Self) -> Option<Ordering> {
                    self.partial_cmp(other)
                }
            }

            impl Comparable for $ty {}
            impl Orderable for $ty {}
        )+
    };
}

macro_rules! numeric_value {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        ordered_value!($kind => $($ty),+);
        $(impl Numeric for $ty {})+
    };
}

macro_rules! float_value {
    ($($ty:ty),+) => {
        $(
            impl FilterValue for $ty {
                const KIND: ValueKind = ValueKind::Float;

                #[inline]
                fn compare(&self, other: &Self) -> Option<Ordering> {
                    self.partial_cmp(other)
                }

                #[inline]
                fn is_encodable(&self) -> bool {
                    self.is_finite()
                }
            }

            impl Comparable for $ty {}
            impl Orderable for $ty {}
            impl Numeric for $ty {}
        )+
    };
}

numeric_value!(Int => i8, i16, i32, i64, u8, u16, u32, u64);
float_value!(f32, f64);
numeric_value!(Decimal => Decimal);
ordered_value!(ObjectId => ObjectId);
ordered_value!(Date => NaiveDate);
ordered_value!(DateTime => DateTime<Utc>);

impl FilterValue for bool {
    const KIND: ValueKind = ValueKind::Bool;
}

impl FilterValue for String {
    const KIND: ValueKind = ValueKind::String;

    #[inline]
    fn compare(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    #[inline]
    fn as_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl Comparable for String {}
impl Orderable for String {}
impl Textual for String {}
