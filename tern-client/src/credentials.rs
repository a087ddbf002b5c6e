//! Bearer token storage.
//!
//! The store is always handed to the client by the caller; there is no
//! process-wide token.

use parking_lot::RwLock;
use tracing::debug;

/// Holds the bearer token attached to requests.
pub trait CredentialStore: Send + Sync {
    /// The current token.
    fn token(&self) -> Option<String>;

    /// Replace the token.
    fn set_token(&self, token: Option<String>);

    /// Forget the token.
    fn clear(&self) {
        self.set_token(None);
    }
}

/// In-memory token, shared between tasks.
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: RwLock<Option<String>>,
}

impl MemoryCredentials {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentials {
    fn token(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set_token(&self, token: Option<String>) {
        debug!(present = token.is_some(), "bearer token updated");
        *self.token.write() = token;
    }
}

/// A fixed token. Updates are ignored.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialStore for StaticToken {
    fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn set_token(&self, _token: Option<String>) {
        debug!("ignoring token update on a static credential");
    }
}

/// Never sends a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialStore for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }

    fn set_token(&self, _token: Option<String>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentials::new();
        assert_eq!(store.token(), None);
        store.set_token(Some("t1".to_string()));
        assert_eq!(store.token().as_deref(), Some("t1"));
        store.clear();
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_static_and_none() {
        let fixed = StaticToken::new("k");
        fixed.clear();
        assert_eq!(fixed.token().as_deref(), Some("k"));
        assert_eq!(NoCredentials.token(), None);
    }
}
