//! Error types for the Intelligence Center client.
//!
//! # Design
//! Every failure surfaces to the immediate caller as a distinct variant;
//! nothing is retried or swallowed here. Transport failures and JSON decode
//! failures are kept apart so callers can tell "the network broke" from
//! "the server answered with something that isn't JSON". HTTP status codes
//! are deliberately not mapped to errors: the router parses whatever body
//! comes back.

use thiserror::Error;

/// Errors returned by the router, the identifier deriver and the entity
/// shortener.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP round-trip itself failed (connection, TLS, timeout).
    #[error("transport failed: {0}")]
    TransportError(String),

    /// The response body was not valid JSON.
    #[error("response is not valid JSON: {0}")]
    DecodeError(String),

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// An entity did not have the shape `shorten_entity` requires.
    #[error("invalid entity: {0}")]
    ValidationError(String),

    /// Identifier components were not valid UTF-8.
    #[error("invalid encoding in {0}")]
    EncodingError(&'static str),

    /// A base URL or request URL could not be parsed or rewritten.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A required configuration variable is not set.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl ApiError {
    pub(crate) fn invalid_url(url: &str, reason: impl ToString) -> Self {
        ApiError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
