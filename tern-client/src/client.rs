//! The client: request building and response classification.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tern_query::{QueryError, QueryResult, RemoteError, tern_debug};
use tracing::{debug, warn};
use url::Url;

use crate::action::{Action, ActionRequest};
use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, NoCredentials};
use crate::envelope::{ErrorEnvelope, MetaResponse, Response, TokenInfo};
use crate::transport::{RawResponse, Transport};

/// Sends actions over a [`Transport`] and decodes the envelopes.
///
/// The credential store given to [`Client::new`] supplies the bearer token
/// for [`action`](Client::action); the `*_with` variants take the store per
/// call instead.
pub struct Client<T> {
    transport: T,
    credentials: Arc<dyn CredentialStore>,
    host: Option<Url>,
    timeout: Option<Duration>,
    log_requests: bool,
    log_responses: bool,
}

impl<T: Transport> Client<T> {
    /// Create a client with the default configuration.
    pub fn new(transport: T, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
            host: None,
            timeout: None,
            log_requests: false,
            log_responses: false,
        }
    }

    /// Create a client that never sends a token.
    pub fn anonymous(transport: T) -> Self {
        Self::new(transport, Arc::new(NoCredentials))
    }

    /// Apply a configuration.
    pub fn with_config(mut self, config: &ClientConfig) -> QueryResult<Self> {
        self.host = config.host_url()?;
        self.timeout = config.timeout()?;
        self.log_requests = config.debug.log_requests;
        self.log_responses = config.debug.log_responses;
        Ok(self)
    }

    /// The default credential store.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Run `action` on `model` and decode `{"data": D}`.
    pub async fn action<I, D>(&self, model: &str, action: Action, input: &I) -> QueryResult<Response<D>>
    where
        I: Serialize + ?Sized + Sync,
        D: DeserializeOwned,
    {
        self.action_with(model, action, input, self.credentials.as_ref()).await
    }

    /// Like [`action`](Self::action) with an explicit credential store.
    pub async fn action_with<I, D>(
        &self,
        model: &str,
        action: Action,
        input: &I,
        credentials: &dyn CredentialStore,
    ) -> QueryResult<Response<D>>
    where
        I: Serialize + ?Sized + Sync,
        D: DeserializeOwned,
    {
        let body = self.send(model, action, input, credentials).await?;
        decode_envelope(model, action, body)
    }

    /// Run `action` on `model` and decode `{"meta": M, "data": D}`.
    pub async fn action_with_meta<I, M, D>(
        &self,
        model: &str,
        action: Action,
        input: &I,
    ) -> QueryResult<MetaResponse<M, D>>
    where
        I: Serialize + ?Sized + Sync,
        M: DeserializeOwned,
        D: DeserializeOwned,
    {
        self.action_with_meta_with(model, action, input, self.credentials.as_ref()).await
    }

    /// Like [`action_with_meta`](Self::action_with_meta) with an explicit
    /// credential store.
    pub async fn action_with_meta_with<I, M, D>(
        &self,
        model: &str,
        action: Action,
        input: &I,
        credentials: &dyn CredentialStore,
    ) -> QueryResult<MetaResponse<M, D>>
    where
        I: Serialize + ?Sized + Sync,
        M: DeserializeOwned,
        D: DeserializeOwned,
    {
        let body = self.send(model, action, input, credentials).await?;
        decode_envelope(model, action, body)
    }

    /// Sign in and store the returned token in the default store.
    pub async fn sign_in<I, D>(&self, model: &str, input: &I) -> QueryResult<MetaResponse<TokenInfo, D>>
    where
        I: Serialize + ?Sized + Sync,
        D: DeserializeOwned,
    {
        self.sign_in_with(model, input, self.credentials.as_ref()).await
    }

    /// Sign in and store the returned token in `credentials`.
    pub async fn sign_in_with<I, D>(
        &self,
        model: &str,
        input: &I,
        credentials: &dyn CredentialStore,
    ) -> QueryResult<MetaResponse<TokenInfo, D>>
    where
        I: Serialize + ?Sized + Sync,
        D: DeserializeOwned,
    {
        let body = self.send(model, Action::SignIn, input, credentials).await?;
        let response: MetaResponse<TokenInfo, D> = decode_envelope(model, Action::SignIn, body)?;
        if response.meta.token.is_empty() {
            return Err(QueryError::missing_credential(Action::SignIn.as_url_segment()).with_model(model));
        }
        credentials.set_token(Some(response.meta.token.clone()));
        debug!(model, "signed in");
        Ok(response)
    }

    async fn send<I>(
        &self,
        model: &str,
        action: Action,
        input: &I,
        credentials: &dyn CredentialStore,
    ) -> QueryResult<Value>
    where
        I: Serialize + ?Sized + Sync,
    {
        let body = serde_json::to_value(input).map_err(|e| {
            QueryError::encode(e.to_string())
                .with_source(e)
                .with_model(model)
                .with_context(action.as_url_segment())
        })?;

        let request = ActionRequest::new(model, action, body)
            .with_bearer(credentials.token())
            .with_host(self.host.clone())
            .with_timeout(self.timeout);

        if self.log_requests {
            debug!(path = %request.path(), body = %request.body, "sending action");
        } else {
            tern_debug!(path = %request.path(), authorized = request.bearer.is_some(), "sending action");
        }

        let raw = self.transport.send(request).await.map_err(|e| {
            warn!(model, action = %action, error = %e, "transport failed");
            QueryError::transport(e.to_string())
                .with_source(e)
                .with_model(model)
                .with_context(action.as_url_segment())
        })?;

        if self.log_responses {
            debug!(status = raw.status, body = %raw.body, "received response");
        }

        classify(raw).map_err(|e| e.with_model(model).with_context(action.as_url_segment()))
    }
}

/// Split a raw response into a success body or a server error.
///
/// A status of 400 or above is always an error. A body carrying an error
/// envelope is an error whatever the status.
pub fn classify(raw: RawResponse) -> QueryResult<Value> {
    match ErrorEnvelope::extract(&raw.body) {
        Some(remote) => {
            warn!(status = raw.status, kind = %remote.kind, "server error");
            Err(QueryError::server(remote))
        }
        None if raw.is_error_status() => {
            warn!(status = raw.status, "error status without envelope");
            Err(QueryError::server(RemoteError::new(
                "HttpError",
                format!("server answered with status {}", raw.status),
            )))
        }
        None => Ok(raw.body),
    }
}

fn decode_envelope<E: DeserializeOwned>(model: &str, action: Action, body: Value) -> QueryResult<E> {
    serde_json::from_value(body).map_err(|e| {
        debug!(model, action = %action, error = %e, "unexpected response shape");
        QueryError::decode(e.to_string())
            .with_source(e)
            .with_model(model)
            .with_context(action.as_url_segment())
    })
}
