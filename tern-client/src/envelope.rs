//! Response envelopes.
//!
//! Success: `{"data": D}` or `{"meta": M, "data": D}`.
//! Failure: `{"error": {"type", "message", "errors"?}}`; a bare
//! `{"type", "message", "errors"?}` body is accepted as well.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tern_query::RemoteError;

/// `{"data": D}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<D> {
    /// Payload.
    pub data: D,
}

/// `{"meta": M, "data": D}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaResponse<M, D> {
    /// Metadata, such as [`PagingInfo`] or [`TokenInfo`].
    pub meta: M,
    /// Payload.
    pub data: D,
}

/// Paging metadata of a `find-many` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    /// Records matching the query.
    pub count: u64,
    /// Pages at the requested page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_pages: Option<u64>,
}

/// Metadata of a `sign-in` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The bearer token.
    pub token: String,
}

/// `{"error": RemoteError}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The server's error.
    pub error: RemoteError,
}

impl ErrorEnvelope {
    /// Extract a server error from a response body, in either accepted shape.
    pub fn extract(body: &Value) -> Option<RemoteError> {
        let object = body.as_object()?;
        if object.contains_key("error") {
            return serde_json::from_value::<ErrorEnvelope>(body.clone())
                .ok()
                .map(|envelope| envelope.error);
        }
        if object.contains_key("type") && object.contains_key("message") && !object.contains_key("data") {
            return serde_json::from_value::<RemoteError>(body.clone()).ok();
        }
        None
    }
}
