//! Error types for streaming predict calls.
//!
//! The taxonomy here drives the retry orchestration: only [`Error::Overloaded`]
//! and [`Error::NoHealthyBackend`] are retry-eligible, and both can only be
//! raised before an attempt has produced any stream fragment. Everything else
//! is terminal and surfaces to callers as a single `FAILURE` envelope.

use http::StatusCode;

/// The main error type for streaming predict calls.
///
/// Errors never cross the public API boundary of [`Client::streaming_predict`]
/// (they are absorbed into [`ResponseEnvelope::Failure`]), but they are the
/// currency of the internal transport and retry layers and of
/// [`PredictRequest`] construction.
///
/// [`Client::streaming_predict`]: crate::Client::streaming_predict
/// [`ResponseEnvelope::Failure`]: crate::ResponseEnvelope
/// [`PredictRequest`]: crate::PredictRequest
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The upstream signaled rate limiting (HTTP 429) before any fragment
    /// was produced. Retry-eligible.
    #[error("upstream overloaded (429 returned)")]
    Overloaded,

    /// The upstream signaled that no backend was available to serve the
    /// request (HTTP 503). Retry-eligible.
    #[error("no healthy backend (503 returned)")]
    NoHealthyBackend,

    /// The upstream returned any other non-success status.
    ///
    /// Carries the status code and the raw error body, which downstream
    /// translation mines for an embedded diagnostic.
    #[error("upstream service error (status {status})")]
    Upstream {
        /// The HTTP status code of the response.
        status: StatusCode,
        /// The raw error body, read in full before this error was raised.
        body: Vec<u8>,
    },

    /// A stream fragment could not be parsed as JSON.
    ///
    /// Decode failures are terminal, never retried: by the time a fragment
    /// is being decoded, earlier fragments of the same attempt may already
    /// have been delivered downstream.
    #[error("failed to decode stream fragment: {source}")]
    Decode {
        /// The undecodable fragment, verbatim.
        fragment: String,
        /// The underlying parse error.
        source: serde_json::Error,
    },

    /// A network-level error (connection failed, stream reset mid-read).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to serialize the request payload to JSON.
    #[error("failed to serialize request payload: {0}")]
    Serialization(String),

    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target URL could not be parsed.
    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns `true` if this failure is transient and another attempt is
    /// permitted within policy bounds.
    ///
    /// Only the two explicit upstream signals qualify. Other upstream
    /// statuses, decode failures, and network errors are terminal.
    ///
    /// # Examples
    ///
    /// ```
    /// use everstream::Error;
    /// use http::StatusCode;
    ///
    /// assert!(Error::Overloaded.is_retryable());
    /// assert!(Error::NoHealthyBackend.is_retryable());
    ///
    /// let err = Error::Upstream {
    ///     status: StatusCode::INTERNAL_SERVER_ERROR,
    ///     body: b"boom".to_vec(),
    /// };
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Overloaded | Error::NoHealthyBackend)
    }

    /// Returns the upstream HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Overloaded => Some(StatusCode::TOO_MANY_REQUESTS),
            Error::NoHealthyBackend => Some(StatusCode::SERVICE_UNAVAILABLE),
            Error::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw upstream error body, if this error carries one.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Error::Upstream { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A specialized `Result` type for streaming predict calls.
pub type Result<T> = std::result::Result<T, Error>;
