//! Error types for the filter and update-operation model.
//!
//! Every failure in this crate, and in `tern-client`, is a [`QueryError`]
//! carrying an [`ErrorCode`]. Codes follow the pattern `T{category}{number}`:
//!
//! - 1xxx: Construction errors (wrong variant, malformed request, operator misuse)
//! - 2xxx: Wire errors (encode, decode)
//! - 3xxx: Errors reported by the remote server
//! - 4xxx: Transport and credential errors
//! - 5xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use tern_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::malformed_request(&["set", "increment"]);
//! assert_eq!(err.code, ErrorCode::MalformedRequest);
//! assert!(err.is_construction_error());
//! assert!(err.to_string().contains("T1002"));
//! ```
//!
//! Server failures keep the decoded envelope:
//!
//! ```rust
//! use tern_query::{QueryError, RemoteError};
//!
//! let err = QueryError::server(RemoteError::new("ValidationError", "Invalid input"));
//! assert!(err.is_server_error());
//! assert_eq!(err.remote.as_ref().unwrap().kind, "ValidationError");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result type for filter, codec and client operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Construction errors (1xxx)
    /// Read of the inactive slot of a `OneOf` (T1001).
    WrongVariant = 1001,
    /// Zero or several mutually exclusive operations populated (T1002).
    MalformedRequest = 1002,
    /// Operator not supported by the value kind (T1003).
    UnsupportedOperator = 1003,
    /// `matches` pattern failed to compile (T1004).
    InvalidPattern = 1004,

    // Wire errors (2xxx)
    /// Value could not be encoded (T2001).
    EncodeError = 2001,
    /// JSON did not match the expected grammar (T2002).
    DecodeError = 2002,

    // Remote errors (3xxx)
    /// The server answered with an error envelope (T3001).
    ServerError = 3001,

    // Transport errors (4xxx)
    /// The transport failed before a response was decoded (T4001).
    Transport = 4001,
    /// An action that must yield a credential produced none (T4002).
    MissingCredential = 4002,

    // Configuration errors (5xxx)
    /// Invalid configuration (T5001).
    InvalidConfiguration = 5001,

    // Internal errors (9xxx)
    /// Internal error (T9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "T1001").
    pub fn code(&self) -> String {
        format!("T{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::WrongVariant => "Wrong OneOf variant",
            Self::MalformedRequest => "Malformed request",
            Self::UnsupportedOperator => "Unsupported operator",
            Self::InvalidPattern => "Invalid pattern",
            Self::EncodeError => "Encode error",
            Self::DecodeError => "Decode error",
            Self::ServerError => "Server error",
            Self::Transport => "Transport error",
            Self::MissingCredential => "Missing credential",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The model involved.
    pub model: Option<String>,
    /// The field or wire key involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// The error payload a server returns for a failed action.
///
/// Wire shape: `{"type": string, "message": string, "errors": {field: message}?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Server-side error type, e.g. `"ValidationError"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Human readable message.
    pub message: String,
    /// Per-field messages, when the server reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl RemoteError {
    /// Create a remote error without field messages.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            errors: None,
        }
    }

    /// Attach a message for one field.
    pub fn with_field_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), message.into());
        self
    }

    /// Message reported for `field`, if any.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.as_ref()?.get(field).map(String::as_str)
    }
}

/// Errors produced while building, encoding, decoding or sending queries.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The server envelope, for [`ErrorCode::ServerError`].
    pub remote: Option<RemoteError>,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            remote: None,
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.context.model = Some(model.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Reading slot `requested` of a `OneOf` whose active slot is `active`.
    pub fn wrong_variant(requested: usize, active: usize) -> Self {
        Self::new(
            ErrorCode::WrongVariant,
            format!("Cannot read variant {} of OneOf: variant {} is active", requested, active),
        )
        .with_code_suggestion(
            "Consume both variants exhaustively",
            "value.fold(|left| ..., |right| ...)",
        )
    }

    /// An update descriptor with zero or several populated operations.
    pub fn malformed_request(populated: &[&str]) -> Self {
        let message = if populated.is_empty() {
            "Update operation has no populated field".to_string()
        } else {
            format!(
                "Update operation has {} populated fields ({}), expected exactly one",
                populated.len(),
                populated.join(", ")
            )
        };
        Self::new(ErrorCode::MalformedRequest, message)
            .with_suggestion("Populate exactly one of set, increment, decrement, multiply, divide or push")
    }

    /// An operator used on a value kind that does not support it.
    pub fn unsupported_operator(operator: &str, kind: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedOperator,
            format!("Operator `{}` is not supported for {} values", operator, kind),
        )
        .with_field(operator)
    }

    /// A `matches` pattern that does not compile.
    pub fn invalid_pattern(pattern: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidPattern,
            format!("Invalid pattern `{}`: {}", pattern, reason),
        )
        .with_field("matches")
    }

    /// Serialization failure.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EncodeError, message.into())
    }

    /// An operand that JSON cannot carry, such as a non-finite float.
    pub fn unrepresentable(operator: &str, value: impl fmt::Debug) -> Self {
        Self::new(
            ErrorCode::EncodeError,
            format!("Operand {:?} of `{}` has no JSON representation", value, operator),
        )
        .with_field(operator)
        .with_suggestion("Filter out NaN and infinite values before building the filter")
    }

    /// A `not` chain deeper than the wire format carries.
    pub fn nesting_too_deep(max_depth: usize) -> Self {
        Self::new(
            ErrorCode::EncodeError,
            format!("`not` nests deeper than {} levels", max_depth),
        )
        .with_field("not")
        .with_help("JSON parsers stop at a fixed nesting depth; flatten the negations")
    }

    /// The payload does not match the expected grammar.
    pub fn decode(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::DecodeError, format!("Failed to decode payload: {}", message))
            .with_suggestion("Check that client and server agree on the wire schema version")
    }

    /// The server answered with an error envelope.
    pub fn server(remote: RemoteError) -> Self {
        let mut err = Self::new(
            ErrorCode::ServerError,
            format!("{}: {}", remote.kind, remote.message),
        );
        err.remote = Some(remote);
        err
    }

    /// The transport failed.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Transport, format!("Transport error: {}", message))
    }

    /// An action that should have produced a bearer token did not.
    pub fn missing_credential(action: impl Into<String>) -> Self {
        let action = action.into();
        Self::new(
            ErrorCode::MissingCredential,
            format!("Action `{}` returned no token", action),
        )
        .with_context(action)
    }

    /// Configuration could not be loaded.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Local programmer errors. These should fail fast and never be retried.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::WrongVariant
                | ErrorCode::MalformedRequest
                | ErrorCode::UnsupportedOperator
                | ErrorCode::InvalidPattern
        )
    }

    /// Check if the payload did not match the wire grammar.
    pub fn is_decode_error(&self) -> bool {
        self.code == ErrorCode::DecodeError
    }

    /// Check if this is an error reported by the server.
    pub fn is_server_error(&self) -> bool {
        self.code == ErrorCode::ServerError
    }

    /// Check if the transport failed.
    pub fn is_transport_error(&self) -> bool {
        self.code == ErrorCode::Transport
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref model) = self.context.model {
            output.push_str(&format!("  → Model: {}\n", model));
        }
        if let Some(ref field) = self.context.field {
            output.push_str(&format!("  → Field: {}\n", field));
        }
        if let Some(errors) = self.remote.as_ref().and_then(|r| r.errors.as_ref()) {
            for (field, message) in errors {
                output.push_str(&format!("  → {}: {}\n", field, message));
            }
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     ```\n     {}\n     ```\n", code.replace('\n', "\n     ")));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        if err.is_io() {
            Self::encode(message).with_source(err)
        } else {
            Self::decode(message).with_source(err)
        }
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! query_error {
    ($code:expr, $msg:expr) => {
        $crate::error::QueryError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::QueryError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::WrongVariant.code(), "T1001");
        assert_eq!(ErrorCode::DecodeError.code(), "T2002");
        assert_eq!(ErrorCode::ServerError.code(), "T3001");
    }

    #[test]
    fn test_malformed_request_lists_fields() {
        let err = QueryError::malformed_request(&["set", "increment"]);
        assert!(err.is_construction_error());
        assert!(err.message.contains("set, increment"));

        let empty = QueryError::malformed_request(&[]);
        assert!(empty.message.contains("no populated field"));
    }

    #[test]
    fn test_server_error_keeps_envelope() {
        let remote = RemoteError::new("ValidationError", "Invalid input")
            .with_field_error("email", "is taken");
        let err = QueryError::server(remote);

        assert!(err.is_server_error());
        assert!(!err.is_transport_error());
        assert_eq!(err.remote.as_ref().unwrap().field_error("email"), Some("is taken"));
        assert!(err.display_full().contains("email: is taken"));
    }

    #[test]
    fn test_transport_is_not_server_error() {
        let err = QueryError::transport("connection refused");
        assert!(err.is_transport_error());
        assert!(!err.is_server_error());
        assert!(!err.is_construction_error());
    }

    #[test]
    fn test_remote_error_wire_shape() {
        let remote: RemoteError =
            serde_json::from_str(r#"{"type":"NotFound","message":"no user","errors":null}"#).unwrap();
        assert_eq!(remote.kind, "NotFound");
        assert!(remote.errors.is_none());
    }

    #[test]
    fn test_error_macro() {
        let err = query_error!(
            ErrorCode::DecodeError,
            "bad key",
            with_field = "foo",
            with_suggestion = "remove it"
        );

        assert_eq!(err.code, ErrorCode::DecodeError);
        assert_eq!(err.context.field, Some("foo".to_string()));
    }

    #[test]
    fn test_wrong_variant_suggests_fold() {
        let err = QueryError::wrong_variant(1, 0);
        let suggestion = err.context.suggestions.last().unwrap();
        assert!(suggestion.code.as_deref().unwrap().contains("fold"));
    }
}
