//! Transport failures when talking to the remote catalogue.
//!
//! A `TransportError` preserves the HTTP status (when there was one) so the
//! retry loop can tell transient failures from permanent ones.

use std::fmt;

/// Network or HTTP failure reaching the remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    /// HTTP status code, if a response was received
    pub status: Option<reqwest::StatusCode>,
    /// Human-readable error message
    pub message: String,
    /// Request URL, if known
    pub url: Option<String>,
    kind: TransportErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransportErrorKind {
    /// The request never produced a response (connect, timeout, reset).
    Network,
    /// The server answered with a non-success status.
    Status,
    /// The response body could not be decoded.
    Decode,
}

impl TransportError {
    /// A failure that happened before any response arrived.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            url: None,
            kind: TransportErrorKind::Network,
        }
    }

    /// A non-success HTTP response.
    pub fn with_status(message: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            url: None,
            kind: TransportErrorKind::Status,
        }
    }

    /// A response whose body did not match the expected envelope.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            url: None,
            kind: TransportErrorKind::Decode,
        }
    }

    /// Attach the request URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether retrying the same request might succeed.
    ///
    /// Server errors, rate limiting and network failures are transient;
    /// client errors and undecodable bodies are not.
    pub fn is_transient(&self) -> bool {
        match self.kind {
            TransportErrorKind::Network => true,
            TransportErrorKind::Decode => false,
            TransportErrorKind::Status => self
                .status
                .is_some_and(|s| s.is_server_error() || s.as_u16() == 429),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "transport error ({}): {}", status.as_u16(), self.message)?,
            None => write!(f, "transport error: {}", self.message)?,
        }
        if let Some(url) = &self.url {
            write!(f, " [{url}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());
        let mut error = if err.is_decode() {
            Self::decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::with_status(err.to_string(), status)
        } else {
            Self::network(err.to_string())
        };
        error.url = url;
        error
    }
}
