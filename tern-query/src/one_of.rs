//! Two-variant tagged union.
//!
//! [`OneOf`] holds exactly one of two typed values. It backs the recursive
//! `not` operator of every filter (literal *or* nested filter) and
//! [`Nullable`](crate::nullable::Nullable) (value *or* [`Null`](crate::nullable::Null)).
//!
//! ```rust
//! use tern_query::OneOf;
//!
//! let value: OneOf<i64, String> = OneOf::left(5);
//! assert!(value.is_left());
//! assert_eq!(value.try_left().unwrap(), &5);
//! assert!(value.try_right().is_err());
//!
//! let doubled = value.fold(|n| n * 2, |s| s.len() as i64);
//! assert_eq!(doubled, 10);
//! ```
//!
//! On the wire the active value is written as-is. Decoding tries the left
//! slot first, then the right one.

use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::fmt;

use crate::error::{QueryError, QueryResult};

/// Exactly one of `A` or `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOf<A, B> {
    /// Variant 0.
    Left(A),
    /// Variant 1.
    Right(B),
}

impl<A, B> OneOf<A, B> {
    /// Occupy the left slot.
    #[inline]
    pub const fn left(value: A) -> Self {
        Self::Left(value)
    }

    /// Occupy the right slot.
    #[inline]
    pub const fn right(value: B) -> Self {
        Self::Right(value)
    }

    /// Index of the active slot: `0` for left, `1` for right.
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Self::Left(_) => 0,
            Self::Right(_) => 1,
        }
    }

    /// Check if the left slot is active.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    /// Check if the right slot is active.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Self::Right(_))
    }

    /// Borrow the left value, failing with `WrongVariant` otherwise.
    pub fn try_left(&self) -> QueryResult<&A> {
        match self {
            Self::Left(a) => Ok(a),
            Self::Right(_) => Err(QueryError::wrong_variant(0, 1)),
        }
    }

    /// Borrow the right value, failing with `WrongVariant` otherwise.
    pub fn try_right(&self) -> QueryResult<&B> {
        match self {
            Self::Right(b) => Ok(b),
            Self::Left(_) => Err(QueryError::wrong_variant(1, 0)),
        }
    }

    /// Take the left value, failing with `WrongVariant` otherwise.
    pub fn into_left(self) -> QueryResult<A> {
        match self {
            Self::Left(a) => Ok(a),
            Self::Right(_) => Err(QueryError::wrong_variant(0, 1)),
        }
    }

    /// Take the right value, failing with `WrongVariant` otherwise.
    pub fn into_right(self) -> QueryResult<B> {
        match self {
            Self::Right(b) => Ok(b),
            Self::Left(_) => Err(QueryError::wrong_variant(1, 0)),
        }
    }

    /// Consume the value with one function per variant.
    #[inline]
    pub fn fold<R>(self, on_left: impl FnOnce(A) -> R, on_right: impl FnOnce(B) -> R) -> R {
        match self {
            Self::Left(a) => on_left(a),
            Self::Right(b) => on_right(b),
        }
    }

    /// Borrow the active value.
    #[inline]
    pub fn as_ref(&self) -> OneOf<&A, &B> {
        match self {
            Self::Left(a) => OneOf::Left(a),
            Self::Right(b) => OneOf::Right(b),
        }
    }

    /// Map the left value, keeping a right value untouched.
    pub fn map_left<C>(self, f: impl FnOnce(A) -> C) -> OneOf<C, B> {
        match self {
            Self::Left(a) => OneOf::Left(f(a)),
            Self::Right(b) => OneOf::Right(b),
        }
    }

    /// Map the right value, keeping a left value untouched.
    pub fn map_right<C>(self, f: impl FnOnce(B) -> C) -> OneOf<A, C> {
        match self {
            Self::Left(a) => OneOf::Left(a),
            Self::Right(b) => OneOf::Right(f(b)),
        }
    }
}

/// Prefixes the value with the static type name of the active slot, so
/// `OneOf<i64, String>` renders `5` as `i64: 5` and `"5"` as `alloc::string::String: 5`.
impl<A: fmt::Display, B: fmt::Display> fmt::Display for OneOf<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left(a) => write!(f, "{}: {}", type_name::<A>(), a),
            Self::Right(b) => write!(f, "{}: {}", type_name::<B>(), b),
        }
    }
}
