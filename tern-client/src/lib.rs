//! # tern-client
//!
//! Request plumbing for Tern clients.
//!
//! - [`Action`] and [`ActionRequest`]: what is sent, to `/{model}/action/{action}`
//! - [`Transport`]: the seam where the application plugs in its HTTP stack
//! - [`CredentialStore`]: the bearer token, always passed explicitly
//! - [`Client`]: builds requests and turns responses into envelopes or errors
//! - [`ClientConfig`]: `tern.toml`
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use tern_client::{Action, ActionRequest, Client, MemoryCredentials, RawResponse, Response, Transport, TransportError};
//!
//! struct MyHttp;
//!
//! #[async_trait]
//! impl Transport for MyHttp {
//!     async fn send(&self, request: ActionRequest) -> Result<RawResponse, TransportError> {
//!         // POST request.url() with request.authorization() and request.body
//!         # let _ = request;
//!         Ok(RawResponse::ok(json!({ "data": [] })))
//!     }
//! }
//!
//! # async fn run() -> tern_query::QueryResult<()> {
//! let client = Client::new(MyHttp, Arc::new(MemoryCredentials::new()));
//! let users: Response<Vec<Value>> = client
//!     .action("users", Action::FindMany, &json!({ "where": { "age": { "gte": 18 } } }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub mod action;
pub mod client;
pub mod config;
pub mod credentials;
pub mod envelope;
pub mod transport;

pub use action::{Action, ActionRequest};
pub use client::{Client, classify};
pub use config::{ClientConfig, ConnectionConfig, DebugConfig};
pub use credentials::{CredentialStore, MemoryCredentials, NoCredentials, StaticToken};
pub use envelope::{ErrorEnvelope, MetaResponse, PagingInfo, Response, TokenInfo};
pub use transport::{RawResponse, Transport, TransportError};
