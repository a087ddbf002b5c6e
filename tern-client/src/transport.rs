//! The transport seam.
//!
//! Tern does not ship an HTTP stack. The application implements
//! [`Transport`] over whatever client it already uses; the [`Client`](crate::Client)
//! builds the request and classifies what comes back.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::action::ActionRequest;

/// Status and parsed JSON body of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed body.
    pub body: Value,
}

impl RawResponse {
    /// Create a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// `200` with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Check if the status is 400 or above.
    pub fn is_error_status(&self) -> bool {
        self.status >= 400
    }
}

/// Failures below the protocol: nothing usable came back.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The connection could not be established or broke.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The deadline passed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The body was not JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// Anything else the transport reports.
    #[error("{0}")]
    Other(String),
}

/// Sends one request and returns the raw response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`.
    async fn send(&self, request: ActionRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ActionRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Box<T> {
    async fn send(&self, request: ActionRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}
