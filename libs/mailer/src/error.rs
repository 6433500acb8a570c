//! Error types for the mailer library.

use thiserror::Error;

/// Result type for mailer operations.
pub type MailerResult<T> = Result<T, MailerError>;

/// Maximum number of characters of a provider response body carried inside
/// an error for diagnosis.
pub const RESPONSE_PREVIEW_LEN: usize = 256;

/// Truncate a raw response body to a diagnosable preview.
pub(crate) fn response_preview(body: &str) -> String {
    if body.chars().count() > RESPONSE_PREVIEW_LEN {
        body.chars().take(RESPONSE_PREVIEW_LEN).collect()
    } else {
        body.to_string()
    }
}

/// A signing key that could not be turned into a usable RS256 key.
///
/// The three cases stay separate so an operator can tell a mis-pasted env
/// var apart from a corrupted or wrong-type key file.
#[derive(Debug, Error)]
pub enum KeyFormatError {
    /// Nothing left once the PEM armor and whitespace are removed.
    #[error("key material is empty after stripping PEM armor")]
    Empty,

    /// The armored content contains characters outside the base64 alphabet.
    #[error("key material is not valid base64")]
    InvalidBase64,

    /// The decoded bytes were rejected on import (wrong key type, corrupted
    /// key, or not PKCS#8).
    #[error("key import rejected: {0}")]
    Rejected(String),
}

/// Errors that can occur while composing, authenticating, or sending mail.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The signing key is malformed. Fatal, not retriable.
    #[error("invalid signing key: {0}")]
    KeyFormat(#[from] KeyFormatError),

    /// The cryptographic signing operation itself failed. Fatal.
    #[error("failed to sign JWT: {0}")]
    Signing(String),

    /// The token endpoint rejected the assertion or was unreachable.
    /// Transient; callers may retry with backoff.
    #[error("token exchange failed: {body}")]
    TokenExchange {
        /// HTTP status when the endpoint answered, `None` when unreachable.
        status: Option<u16>,
        body: String,
    },

    /// The provider send call failed.
    #[error("provider send failed: {body}")]
    Transport {
        /// HTTP status when the provider answered, `None` when unreachable.
        status: Option<u16>,
        body: String,
    },

    /// The provider answered with an empty body where a JSON document was
    /// required.
    #[error("provider returned an empty response body")]
    EmptyResponse,

    /// The provider's response violates the expected contract.
    #[error("invalid provider response: {reason} (body: {preview:?})")]
    InvalidResponse { reason: String, preview: String },

    /// The selected provider does not implement the requested capability.
    #[error("provider '{provider}' does not support {operation}")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    /// A network call exceeded its deadline. Transient.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Base64URL input could not be decoded.
    #[error("base64url decode failed: {0}")]
    Decode(String),

    /// The request handed to the service is unusable.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token cache store error.
    #[error("token store error: {0}")]
    Store(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl MailerError {
    /// Build an `InvalidResponse` with the raw body truncated to the
    /// preview limit.
    pub fn invalid_response(reason: impl Into<String>, raw_body: &str) -> Self {
        MailerError::InvalidResponse {
            reason: reason.into(),
            preview: response_preview(raw_body),
        }
    }

    /// HTTP status of the upstream failure, when one was observed.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            MailerError::TokenExchange { status, .. } => *status,
            MailerError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<base64::DecodeError> for MailerError {
    fn from(err: base64::DecodeError) -> Self {
        MailerError::Decode(err.to_string())
    }
}

impl From<redis::RedisError> for MailerError {
    fn from(err: redis::RedisError) -> Self {
        MailerError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for MailerError {
    fn from(err: serde_json::Error) -> Self {
        MailerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format_errors_are_distinguishable() {
        let empty = MailerError::from(KeyFormatError::Empty).to_string();
        let bad64 = MailerError::from(KeyFormatError::InvalidBase64).to_string();
        let rejected =
            MailerError::from(KeyFormatError::Rejected("bad modulus".into())).to_string();

        assert!(empty.contains("empty"));
        assert!(bad64.contains("base64"));
        assert!(rejected.contains("rejected"));
        assert_ne!(empty, bad64);
        assert_ne!(bad64, rejected);
    }

    #[test]
    fn test_invalid_response_preview_is_bounded() {
        let long_body = "x".repeat(RESPONSE_PREVIEW_LEN * 4);
        let err = MailerError::invalid_response("not JSON", &long_body);
        match err {
            MailerError::InvalidResponse { preview, .. } => {
                assert_eq!(preview.chars().count(), RESPONSE_PREVIEW_LEN);
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[test]
    fn test_upstream_status() {
        let err = MailerError::TokenExchange {
            status: Some(401),
            body: "invalid_grant".into(),
        };
        assert_eq!(err.upstream_status(), Some(401));
        assert_eq!(MailerError::EmptyResponse.upstream_status(), None);
    }
}
