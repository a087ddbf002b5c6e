//! Actions and the request sent for one of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tern_query::{QueryError, QueryResult};
use url::Url;

/// An action a model exposes. The URL segment is kebab-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Fetch one record by a unique key.
    FindUnique,
    /// Fetch the first matching record.
    FindFirst,
    /// Fetch every matching record.
    FindMany,
    /// Create one record.
    Create,
    /// Update one record.
    Update,
    /// Update or create one record.
    Upsert,
    /// Delete one record.
    Delete,
    /// Create several records.
    CreateMany,
    /// Update every matching record.
    UpdateMany,
    /// Delete every matching record.
    DeleteMany,
    /// Count matching records.
    Count,
    /// Aggregate over matching records.
    Aggregate,
    /// Group matching records.
    GroupBy,
    /// Exchange credentials for a bearer token.
    SignIn,
    /// Resolve the identity behind the current token.
    Identity,
}

impl Action {
    /// Every action, in declaration order.
    pub const ALL: [Action; 15] = [
        Self::FindUnique,
        Self::FindFirst,
        Self::FindMany,
        Self::Create,
        Self::Update,
        Self::Upsert,
        Self::Delete,
        Self::CreateMany,
        Self::UpdateMany,
        Self::DeleteMany,
        Self::Count,
        Self::Aggregate,
        Self::GroupBy,
        Self::SignIn,
        Self::Identity,
    ];

    /// URL segment of the action.
    pub fn as_url_segment(&self) -> &'static str {
        match self {
            Self::FindUnique => "find-unique",
            Self::FindFirst => "find-first",
            Self::FindMany => "find-many",
            Self::Create => "create",
            Self::Update => "update",
            Self::Upsert => "upsert",
            Self::Delete => "delete",
            Self::CreateMany => "create-many",
            Self::UpdateMany => "update-many",
            Self::DeleteMany => "delete-many",
            Self::Count => "count",
            Self::Aggregate => "aggregate",
            Self::GroupBy => "group-by",
            Self::SignIn => "sign-in",
            Self::Identity => "identity",
        }
    }

    /// Check if the action changes data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Create
                | Self::Update
                | Self::Upsert
                | Self::Delete
                | Self::CreateMany
                | Self::UpdateMany
                | Self::DeleteMany
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_url_segment())
    }
}

impl FromStr for Action {
    type Err = QueryError;

    fn from_str(segment: &str) -> QueryResult<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.as_url_segment() == segment)
            .ok_or_else(|| QueryError::decode(format!("unknown action `{}`", segment)))
    }
}

/// One request for the transport: `POST {host}/{model}/action/{action}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    /// URL segment of the model.
    pub model: String,
    /// The action.
    pub action: Action,
    /// JSON body.
    pub body: Value,
    /// Bearer token, when the credential store holds one.
    pub bearer: Option<String>,
    /// Base URL from the configuration.
    pub host: Option<Url>,
    /// Deadline the transport should apply.
    pub timeout: Option<Duration>,
}

impl ActionRequest {
    /// Create a request without token, host or timeout.
    pub fn new(model: impl Into<String>, action: Action, body: Value) -> Self {
        Self {
            model: model.into(),
            action,
            body,
            bearer: None,
            host: None,
            timeout: None,
        }
    }

    /// Set the bearer token.
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    /// Set the base URL.
    pub fn with_host(mut self, host: Option<Url>) -> Self {
        self.host = host;
        self
    }

    /// Set the deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// `/{model}/action/{action}`.
    pub fn path(&self) -> String {
        format!("/{}/action/{}", self.model, self.action.as_url_segment())
    }

    /// `Authorization` header value.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {}", token))
    }

    /// Full URL. Any path on the host is kept as a prefix.
    pub fn url(&self) -> QueryResult<Option<Url>> {
        let Some(host) = &self.host else {
            return Ok(None);
        };
        let joined = format!("{}{}", host.as_str().trim_end_matches('/'), self.path());
        Url::parse(&joined)
            .map(Some)
            .map_err(|e| QueryError::configuration(format!("invalid request url `{}`: {}", joined, e)))
    }
}
