//! Error type returned by every network-facing operation

use super::query::RowDecodeError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received
    #[error("cannot reach server at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{method} {path} failed with HTTP {status}")]
    Http {
        method: String,
        path: String,
        status: StatusCode,
        /// Business error code from the `{ code, message }` payload
        code: Option<i64>,
        /// Server-supplied message from the same payload
        message: Option<String>,
        /// Raw response body
        body: String,
    },

    /// A 2xx response whose body is not the JSON we expected
    #[error("invalid response body from {path}: {source}")]
    InvalidBody {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A row failed schema validation
    #[error("unexpected row in {entity_set}: {source}")]
    Decode {
        entity_set: String,
        #[source]
        source: RowDecodeError,
    },

    #[error("server did not return a token")]
    MissingToken,

    /// Token decoding or session persistence failed
    #[error("session error: {0:#}")]
    Session(#[source] anyhow::Error),

    #[error("{0} has no selection query configured")]
    SelectionUnavailable(String),
}

impl ApiError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True when the failure happened before any response arrived
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Business error code carried by the response, if any
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Http { code, .. } => *code,
            _ => None,
        }
    }

    /// Server-supplied message carried by the response, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
