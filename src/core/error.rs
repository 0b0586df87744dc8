//! Failure taxonomy for calls against the rates API.

use thiserror::Error;

/// Coarse classification of a [`FetchError`], for callers that only need to branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    Http,
    Parse,
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Network unreachable, connection reset or timed out.
    #[error("Request error: {message} for endpoint: {endpoint}")]
    Transport { endpoint: String, message: String },
    /// Non-2xx status code.
    #[error("HTTP error: {status} for endpoint: {endpoint}")]
    Http { endpoint: String, status: u16 },
    /// Malformed or unreadable response body.
    #[error("Failed to parse JSON response for {endpoint}: {message}")]
    Parse { endpoint: String, message: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport { .. } => FetchErrorKind::Transport,
            FetchError::Http { .. } => FetchErrorKind::Http,
            FetchError::Parse { .. } => FetchErrorKind::Parse,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Http { endpoint, .. }
            | FetchError::Parse { endpoint, .. } => endpoint,
        }
    }

    pub(crate) fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(endpoint: &str, err: impl std::fmt::Display) -> Self {
        FetchError::Parse {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}
