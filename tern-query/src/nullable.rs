//! Tri-state optional values.
//!
//! A nullable field of a filter or update operation has three states:
//!
//! | State           | Rust value                         | Wire               |
//! |-----------------|------------------------------------|--------------------|
//! | absent          | `None`                             | key omitted        |
//! | present-null    | `Some(Nullable::null())`           | `"key": null`      |
//! | present-value   | `Some(Nullable::value(v))`         | `"key": <v>`       |
//!
//! [`Nullable`] covers the two present states. Absence lives one level up, in
//! the `Option` of the containing struct field. Serde's `Option` decoding
//! turns `null` into `None`, which would merge "null" into "absent", so every
//! such field is decoded with [`present`].
//!
//! ```rust
//! use tern_query::{Nullable, Presence, TriState};
//!
//! let field: Option<Nullable<i64>> = Some(Nullable::null());
//! assert_eq!(field.presence(), Presence::Null);
//!
//! let field: Option<Nullable<i64>> = None;
//! assert_eq!(field.presence(), Presence::Absent);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::one_of::OneOf;

/// The explicit null marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Null;

impl fmt::Display for Null {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Null")
    }
}

impl Serialize for Null {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl<'de> Deserialize<'de> for Null {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <()>::deserialize(deserializer).map(|()| Null)
    }
}

/// A value that is either present or explicitly null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nullable<T>(OneOf<T, Null>);

impl<T> Nullable<T> {
    /// A present value.
    #[inline]
    pub const fn value(value: T) -> Self {
        Self(OneOf::Left(value))
    }

    /// The explicit null.
    #[inline]
    pub const fn null() -> Self {
        Self(OneOf::Right(Null))
    }

    /// Check if this is the explicit null.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_right()
    }

    /// Borrow the value, `None` for null.
    pub fn as_option(&self) -> Option<&T> {
        match &self.0 {
            OneOf::Left(v) => Some(v),
            OneOf::Right(Null) => None,
        }
    }

    /// Take the value, `None` for null.
    pub fn into_option(self) -> Option<T> {
        match self.0 {
            OneOf::Left(v) => Some(v),
            OneOf::Right(Null) => None,
        }
    }

    /// The underlying union.
    pub fn as_one_of(&self) -> &OneOf<T, Null> {
        &self.0
    }

    /// Unwrap into the underlying union.
    pub fn into_one_of(self) -> OneOf<T, Null> {
        self.0
    }

    /// Map the present value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Nullable<U> {
        Nullable(self.0.map_left(f))
    }

    /// Compare against a plain optional record value.
    pub fn matches(&self, other: Option<&T>) -> bool
    where
        T: PartialEq,
    {
        self.as_option() == other
    }
}

impl<T> From<OneOf<T, Null>> for Nullable<T> {
    fn from(value: OneOf<T, Null>) -> Self {
        Self(value)
    }
}

impl<T> From<Null> for Nullable<T> {
    fn from(_: Null) -> Self {
        Self::null()
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::value)
    }
}

impl<T: fmt::Display> fmt::Display for Nullable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            OneOf::Left(v) => v.serialize(serializer),
            OneOf::Right(Null) => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

/// The observable state of an optional nullable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence<'a, T> {
    /// Key omitted: no constraint, no change.
    Absent,
    /// Key present with `null`.
    Null,
    /// Key present with a value.
    Value(&'a T),
}

/// Read the three states of an `Option<Nullable<T>>` field.
pub trait TriState<T> {
    /// The state of this field.
    fn presence(&self) -> Presence<'_, T>;

    /// Check if the key is omitted.
    fn is_absent(&self) -> bool {
        matches!(self.presence(), Presence::Absent)
    }

    /// Check if the key is present with `null`.
    fn is_present_null(&self) -> bool {
        matches!(self.presence(), Presence::Null)
    }
}

impl<T> TriState<T> for Option<Nullable<T>> {
    fn presence(&self) -> Presence<'_, T> {
        match self {
            None => Presence::Absent,
            Some(n) => match n.as_option() {
                None => Presence::Null,
                Some(v) => Presence::Value(v),
            },
        }
    }
}

/// Decode a field that is present in the payload as `Some`, even when its
/// value is `null`.
///
/// Use together with `#[serde(default)]`, which supplies `None` when the key
/// is missing. A JSON `null` then reaches `V`'s own decoder: [`Nullable`]
/// turns it into [`Nullable::null`], plain values reject it.
pub fn present<'de, D, V>(deserializer: D) -> Result<Option<V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    V::deserialize(deserializer).map(Some)
}
