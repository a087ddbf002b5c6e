//! # Tern
//!
//! Strongly typed filters, update operations and tri-state values for
//! clients of a JSON query API.
//!
//! Tern provides:
//! - One generic filter per family (scalar, array, enum), with operators
//!   selected by what the value type supports
//! - A value-or-null type that keeps "absent" and "null" apart on the wire
//! - Update operations that always carry exactly one operation
//! - A strict JSON codec and a reference evaluator
//! - A transport-agnostic client with explicit credentials
//!
//! ## Quick Start
//!
//! ```rust
//! use tern::prelude::*;
//! use serde_json::json;
//!
//! let filter = Filter::builder().gte(18u32).lt(65).build();
//! assert_eq!(tern::wire::encode(&filter).unwrap(), json!({ "lt": 65, "gte": 18 }));
//!
//! let update = NullableUpdateOperation::<String>::set_null();
//! assert_eq!(tern::wire::encode(&update).unwrap(), json!({ "set": null }));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The filter and update-operation model.
pub mod query {
    pub use tern_query::*;
}

/// Request plumbing, credentials and envelopes.
pub mod client {
    pub use tern_client::*;
}

/// JSON wire codec.
pub mod wire {
    pub use tern_query::wire::{WireFormat, decode, decode_str, encode, encode_string};
}

/// Logging setup.
pub mod logging {
    pub use tern_query::logging::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tern_client::{
        Action, Client, ClientConfig, CredentialStore, MemoryCredentials, MetaResponse, PagingInfo,
        Response, TokenInfo, Transport,
    };
    pub use tern_query::prelude::*;
}

// Re-export key types at the crate root
pub use tern_client::{Client, ClientConfig};
pub use tern_query::{ErrorCode, QueryError, QueryResult};
