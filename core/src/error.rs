//! Error types for the job API client.
//!
//! # Design
//! Every operation fails in exactly one of three ways, kept apart so callers
//! can tell "the request never completed" from "the service said no" from
//! "the service said yes in a shape we do not understand":
//!
//! - [`Error::Transport`]: building or dispatching the request failed.
//! - [`Error::Api`]: the service answered with a status >= 400.
//! - [`Error::Decode`]: a success body did not match the expected type.

use serde::Deserialize;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure returned by every `JobClient` operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be built or the round trip failed.
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: TransportError,
    },

    /// The service returned a status >= 400.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A success response body did not match the expected shape.
    #[error("failed to unmarshal response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// The API error, if the service rejected the call.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of an API error, `None` for the other kinds.
    pub fn status_code(&self) -> Option<u16> {
        self.as_api().map(ApiError::status_code)
    }

    pub(crate) fn transport(context: &'static str) -> impl FnOnce(TransportError) -> Error {
        move |source| Error::Transport { context, source }
    }
}

/// Non-2xx outcome reported by the job service.
///
/// Only the response decoder creates these. `status_code` always carries the
/// real HTTP status, whatever the body claimed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("API Error {status_code}: {message}")]
pub struct ApiError {
    status_code: u16,
    message: String,
}

/// Wire shape of a service error body. Only the message is read; the status
/// always comes from the response.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    message: String,
}

impl ApiError {
    /// Parse a service error body, falling back to the raw text as message.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => envelope.message,
            Err(_) => body.to_string(),
        };
        ApiError {
            status_code: status,
            message,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }
}

/// Reasons a request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to marshal request body: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to parse URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[source] ureq::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] ureq::Error),

    /// Failure raised by a caller-supplied transport.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}
