//! Client-side evaluation of filters.
//!
//! The server stays authoritative; this is the reference meaning of each
//! operator, used to pre-filter cached records and to pin down semantics in
//! tests.
//!
//! ```rust
//! use tern_query::{Evaluate, Filter};
//!
//! let none = Filter::<i64>::builder().in_list(vec![]).build();
//! let all = Filter::<i64>::builder().not_in(vec![]).build();
//! assert!(!none.evaluate(&7).unwrap());
//! assert!(all.evaluate(&7).unwrap());
//! ```

use regex_lite::Regex;
use std::cmp::Ordering;

use crate::array::{ArrayFilter, NullableArrayFilter};
use crate::enum_filter::{EnumFilter, NullableEnumFilter};
use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, NullableFilter};
use crate::nullable::Nullable;
use crate::one_of::OneOf;
use crate::value::{Enumerable, FilterValue};

/// Evaluate a filter against a field value.
pub trait Evaluate<V: ?Sized> {
    /// Check if `value` satisfies every populated operator.
    fn evaluate(&self, value: &V) -> QueryResult<bool>;
}

fn ordered<T: FilterValue>(value: &T, bound: Option<&T>, accept: fn(Ordering) -> bool) -> bool {
    match bound {
        None => true,
        Some(bound) => value.compare(bound).is_some_and(accept),
    }
}

fn text<'a, T: FilterValue>(value: &'a T, operand: &'a T, op: &str) -> QueryResult<(&'a str, &'a str)> {
    match (value.as_text(), operand.as_text()) {
        (Some(v), Some(o)) => Ok((v, o)),
        _ => Err(QueryError::unsupported_operator(op, T::KIND)),
    }
}

/// Shared ordering and text operators of the scalar filters. `None` means
/// the field is null, which satisfies none of them.
#[allow(clippy::too_many_arguments)]
fn bounds_and_text<T: FilterValue>(
    value: Option<&T>,
    lt: Option<&T>,
    lte: Option<&T>,
    gt: Option<&T>,
    gte: Option<&T>,
    contains: Option<&T>,
    starts_with: Option<&T>,
    ends_with: Option<&T>,
    matches: Option<&T>,
) -> QueryResult<bool> {
    let constrained = [lt, lte, gt, gte, contains, starts_with, ends_with, matches]
        .iter()
        .any(Option::is_some);
    let Some(value) = value else {
        return Ok(!constrained);
    };

    let in_bounds = ordered(value, lt, |o| o == Ordering::Less)
        && ordered(value, lte, |o| o != Ordering::Greater)
        && ordered(value, gt, |o| o == Ordering::Greater)
        && ordered(value, gte, |o| o != Ordering::Less);
    if !in_bounds {
        return Ok(false);
    }

    if let Some(operand) = contains {
        let (v, o) = text(value, operand, "contains")?;
        if !v.contains(o) {
            return Ok(false);
        }
    }
    if let Some(operand) = starts_with {
        let (v, o) = text(value, operand, "startsWith")?;
        if !v.starts_with(o) {
            return Ok(false);
        }
    }
    if let Some(operand) = ends_with {
        let (v, o) = text(value, operand, "endsWith")?;
        if !v.ends_with(o) {
            return Ok(false);
        }
    }
    if let Some(pattern) = matches {
        let (v, p) = text(value, pattern, "matches")?;
        let regex = Regex::new(p).map_err(|e| QueryError::invalid_pattern(p, e))?;
        if !regex.is_match(v) {
            return Ok(false);
        }
    }
    Ok(true)
}

impl<T: FilterValue> Filter<T> {
    fn check(&self, value: &T) -> QueryResult<bool> {
        if self.equals.as_ref().is_some_and(|e| e != value) {
            return Ok(false);
        }
        if self.in_list.as_ref().is_some_and(|list| !list.contains(value)) {
            return Ok(false);
        }
        if self.not_in.as_ref().is_some_and(|list| list.contains(value)) {
            return Ok(false);
        }
        if !bounds_and_text(
            Some(value),
            self.lt.as_ref(),
            self.lte.as_ref(),
            self.gt.as_ref(),
            self.gte.as_ref(),
            self.contains.as_ref(),
            self.starts_with.as_ref(),
            self.ends_with.as_ref(),
            self.matches.as_ref(),
        )? {
            return Ok(false);
        }
        match self.not.as_deref() {
            None => Ok(true),
            Some(OneOf::Left(literal)) => Ok(literal != value),
            Some(OneOf::Right(nested)) => Ok(!nested.check(value)?),
        }
    }
}

impl<T: FilterValue> Evaluate<T> for Filter<T> {
    fn evaluate(&self, value: &T) -> QueryResult<bool> {
        self.validate()?;
        self.check(value)
    }
}

impl<T: FilterValue> NullableFilter<T> {
    fn check(&self, value: Option<&T>) -> QueryResult<bool> {
        if self.equals.as_ref().is_some_and(|e| !e.matches(value)) {
            return Ok(false);
        }
        if self.in_list.as_ref().is_some_and(|list| !list.iter().any(|n| n.matches(value))) {
            return Ok(false);
        }
        if self.not_in.as_ref().is_some_and(|list| list.iter().any(|n| n.matches(value))) {
            return Ok(false);
        }
        if !bounds_and_text(
            value,
            self.lt.as_ref(),
            self.lte.as_ref(),
            self.gt.as_ref(),
            self.gte.as_ref(),
            self.contains.as_ref(),
            self.starts_with.as_ref(),
            self.ends_with.as_ref(),
            self.matches.as_ref(),
        )? {
            return Ok(false);
        }
        match self.not.as_deref() {
            None => Ok(true),
            Some(OneOf::Left(literal)) => Ok(!literal.matches(value)),
            Some(OneOf::Right(nested)) => Ok(!nested.check(value)?),
        }
    }
}

impl<T: FilterValue> Evaluate<Option<T>> for NullableFilter<T> {
    fn evaluate(&self, value: &Option<T>) -> QueryResult<bool> {
        self.validate()?;
        self.check(value.as_ref())
    }
}

fn array_ops<T: FilterValue>(
    values: &[T],
    has: Option<&T>,
    has_some: Option<&[T]>,
    has_every: Option<&[T]>,
    is_empty: Option<bool>,
    length: Option<usize>,
) -> bool {
    has.is_none_or(|v| values.contains(v))
        && has_some.is_none_or(|list| list.iter().any(|v| values.contains(v)))
        && has_every.is_none_or(|list| list.iter().all(|v| values.contains(v)))
        && is_empty.is_none_or(|empty| values.is_empty() == empty)
        && length.is_none_or(|n| values.len() == n)
}

impl<T: FilterValue> Evaluate<[T]> for ArrayFilter<T> {
    fn evaluate(&self, values: &[T]) -> QueryResult<bool> {
        if self.equals.as_ref().is_some_and(|e| e.as_slice() != values) {
            return Ok(false);
        }
        Ok(array_ops(
            values,
            self.has.as_ref(),
            self.has_some.as_deref(),
            self.has_every.as_deref(),
            self.is_empty,
            self.length,
        ))
    }
}

impl<T: FilterValue> Evaluate<Vec<T>> for ArrayFilter<T> {
    fn evaluate(&self, values: &Vec<T>) -> QueryResult<bool> {
        Evaluate::<[T]>::evaluate(self, values.as_slice())
    }
}

impl<T: FilterValue> Evaluate<Option<Vec<T>>> for NullableArrayFilter<T> {
    fn evaluate(&self, values: &Option<Vec<T>>) -> QueryResult<bool> {
        if self.equals.as_ref().is_some_and(|e| !e.matches(values.as_ref())) {
            return Ok(false);
        }
        let constrained = self.populated().iter().any(|key| *key != "equals");
        match values {
            None => Ok(!constrained),
            Some(values) => Ok(array_ops(
                values,
                self.has.as_ref(),
                self.has_some.as_deref(),
                self.has_every.as_deref(),
                self.is_empty,
                self.length,
            )),
        }
    }
}

impl<T: Enumerable> EnumFilter<T> {
    fn check(&self, value: &T) -> bool {
        let base = self.equals.as_ref().is_none_or(|e| e == value)
            && self.in_list.as_ref().is_none_or(|list| list.contains(value))
            && self.not_in.as_ref().is_none_or(|list| !list.contains(value));
        base && match self.not.as_deref() {
            None => true,
            Some(OneOf::Left(literal)) => literal != value,
            Some(OneOf::Right(nested)) => !nested.check(value),
        }
    }
}

impl<T: Enumerable> Evaluate<T> for EnumFilter<T> {
    fn evaluate(&self, value: &T) -> QueryResult<bool> {
        Ok(self.check(value))
    }
}

impl<T: Enumerable> NullableEnumFilter<T> {
    fn check(&self, value: Option<&T>) -> bool {
        let any = |list: &Vec<Nullable<T>>| list.iter().any(|n| n.matches(value));
        let base = self.equals.as_ref().is_none_or(|e| e.matches(value))
            && self.in_list.as_ref().is_none_or(any)
            && self.not_in.as_ref().is_none_or(|list| !any(list));
        base && match self.not.as_deref() {
            None => true,
            Some(OneOf::Left(literal)) => !literal.matches(value),
            Some(OneOf::Right(nested)) => !nested.check(value),
        }
    }
}

impl<T: Enumerable> Evaluate<Option<T>> for NullableEnumFilter<T> {
    fn evaluate(&self, value: &Option<T>) -> QueryResult<bool> {
        Ok(self.check(value.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn s(v: &str) -> String {
        v.to_string()
    }

    #[test]
    fn test_in_and_nested_not() {
        let filter = Filter::builder()
            .in_list(vec![s("a"), s("b"), s("zz")])
            .not_filter(Filter::builder().contains(s("z")).build())
            .build();
        assert!(filter.evaluate(&s("a")).unwrap());
        assert!(!filter.evaluate(&s("zz")).unwrap());
        assert!(!filter.evaluate(&s("c")).unwrap());
    }

    #[test]
    fn test_double_not_is_equivalent_but_not_equal() {
        let inner = Filter::from_literal(5i64);
        let double = Filter::builder()
            .not_filter(Filter::builder().not_filter(inner.clone()).build())
            .build();
        assert_ne!(double, inner);
        for v in [4i64, 5, 6] {
            assert_eq!(double.evaluate(&v).unwrap(), inner.evaluate(&v).unwrap());
        }
    }

    #[test]
    fn test_ordering_bounds() {
        let filter = Filter::builder().gt(1.5f64).lte(3.0).build();
        assert!(filter.evaluate(&3.0).unwrap());
        assert!(!filter.evaluate(&1.5).unwrap());
        assert!(!filter.evaluate(&f64::NAN).unwrap());
    }

    #[test]
    fn test_matches_pattern() {
        let filter = Filter::builder().matches(s("^ab+c$")).build();
        assert!(filter.evaluate(&s("abbbc")).unwrap());
        assert!(!filter.evaluate(&s("ac")).unwrap());

        let bad = Filter::builder().matches(s("(unclosed")).build();
        assert_eq!(bad.evaluate(&s("x")).unwrap_err().code, ErrorCode::InvalidPattern);
    }

    #[test]
    fn test_decoded_filter_with_foreign_operator_is_rejected() {
        let filter: Filter<i64> = serde_json::from_value(json!({ "contains": 1 })).unwrap();
        assert_eq!(filter.evaluate(&1).unwrap_err().code, ErrorCode::UnsupportedOperator);
    }

    #[test]
    fn test_nullable_filter_on_null() {
        assert!(NullableFilter::<i64>::is_null().evaluate(&None).unwrap());
        assert!(!NullableFilter::<i64>::is_null().evaluate(&Some(1)).unwrap());
        assert!(NullableFilter::<i64>::is_not_null().evaluate(&Some(1)).unwrap());
        assert!(NullableFilter::<i64>::default().evaluate(&None).unwrap());

        let bounded = NullableFilter::builder().gte(0i64).build();
        assert!(!bounded.evaluate(&None).unwrap());

        let with_null = NullableFilter::builder()
            .in_list(vec![Nullable::value(1i64), Nullable::null()])
            .build();
        assert!(with_null.evaluate(&None).unwrap());
        assert!(!with_null.evaluate(&Some(2)).unwrap());
    }

    #[test]
    fn test_array_operators() {
        let values = vec![1i64, 2, 3];
        let every = ArrayFilter::builder().has_every(vec![1, 2]).is_empty(false).build();
        assert!(every.evaluate(&values).unwrap());
        assert!(!every.evaluate(&vec![1]).unwrap());

        let some_of_nothing = ArrayFilter::builder().has_some(vec![]).build();
        assert!(!some_of_nothing.evaluate(&values).unwrap());

        let exact = ArrayFilter::builder().equals(vec![3i64, 2, 1]).build();
        assert!(!exact.evaluate(&values).unwrap());
        assert!(ArrayFilter::builder().length(3).build().evaluate(&values).unwrap());
    }

    #[test]
    fn test_nullable_array() {
        let null = NullableArrayFilter::<i64>::is_null();
        assert!(null.evaluate(&None).unwrap());
        assert!(!null.evaluate(&Some(vec![])).unwrap());

        let has = NullableArrayFilter::builder().has(1i64).build();
        assert!(!has.evaluate(&None).unwrap());
        assert!(has.evaluate(&Some(vec![1])).unwrap());
    }
}
