//! # tern-query
//!
//! Typed filters, update operations and tri-state values for Tern clients.
//!
//! This crate holds the part of a generated client that has to agree with
//! the server byte for byte:
//! - [`OneOf`], a two-variant union, and [`Nullable`], a value-or-null
//! - Scalar, array and enum filters with recursive `not`
//! - Update operations (`set`, arithmetic, `push`)
//! - The strict JSON wire codec
//! - A client-side evaluator giving each operator its reference meaning
//!
//! ## Filters
//!
//! ```rust
//! use tern_query::{Filter, NullableFilter, wire};
//!
//! let name = Filter::builder()
//!     .in_list(vec!["a".to_string(), "b".to_string()])
//!     .not_filter(Filter::builder().contains("z".to_string()).build())
//!     .build();
//! assert_eq!(wire::encode_string(&name).unwrap(), r#"{"in":["a","b"],"not":{"contains":"z"}}"#);
//!
//! let score = NullableFilter::<f64>::is_null();
//! assert_eq!(wire::encode_string(&score).unwrap(), r#"{"equals":null}"#);
//! ```
//!
//! ## Update operations
//!
//! ```rust
//! use tern_query::{ErrorCode, UpdateOperation, wire};
//! use serde_json::json;
//!
//! let op = UpdateOperation::increment(2i32);
//! assert_eq!(wire::encode(&op).unwrap(), json!({ "increment": 2 }));
//!
//! let err = wire::decode::<UpdateOperation<i32>>(&json!({ "set": 1, "increment": 2 })).unwrap_err();
//! assert_eq!(err.code, ErrorCode::MalformedRequest);
//! ```
//!
//! ## Evaluating
//!
//! ```rust
//! use tern_query::{Evaluate, Filter};
//!
//! let adults = Filter::builder().gte(18u32).build();
//! assert!(adults.evaluate(&21).unwrap());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod array;
pub mod enum_filter;
pub mod error;
pub mod eval;
pub mod filter;
pub mod logging;
pub mod nullable;
pub mod one_of;
pub mod types;
pub mod update;
pub mod value;
pub mod wire;

pub use array::{ArrayFilter, ArrayFilterBuilder, NullableArrayFilter, NullableArrayFilterBuilder};
pub use enum_filter::{EnumFilter, EnumFilterBuilder, NullableEnumFilter, NullableEnumFilterBuilder};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult, RemoteError, Suggestion};
pub use eval::Evaluate;
pub use filter::{
    Filter, FilterBuilder, MAX_NOT_DEPTH, NullableFilter, NullableFilterBuilder, filter_from_literal,
};
pub use nullable::{Null, Nullable, Presence, TriState};
pub use one_of::OneOf;
pub use types::{OneOrMany, SortOrder};
pub use update::{
    ArrayUpdateOperation, NullableArrayUpdateOperation, NullableUpdateOperation, UpdateInput,
    UpdateOperation,
};
pub use value::{Comparable, Enumerable, FilterValue, Numeric, ObjectId, Orderable, Textual, ValueKind};
pub use wire::WireFormat;

// Re-export logging utilities
pub use logging::{
    get_log_format, get_log_level, init as init_logging, init_debug, init_with_level,
    is_debug_enabled,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::array::{ArrayFilter, NullableArrayFilter};
    pub use crate::enum_filter::{EnumFilter, NullableEnumFilter};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::eval::Evaluate;
    pub use crate::filter::{Filter, NullableFilter, filter_from_literal};
    pub use crate::nullable::{Null, Nullable, TriState};
    pub use crate::one_of::OneOf;
    pub use crate::types::{OneOrMany, SortOrder};
    pub use crate::update::{
        ArrayUpdateOperation, NullableArrayUpdateOperation, NullableUpdateOperation, UpdateInput,
        UpdateOperation,
    };
    pub use crate::value::{FilterValue, ObjectId};
    pub use crate::wire::WireFormat;
}
