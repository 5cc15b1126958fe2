//! Error taxonomy shared by the proxy, the browser adapters, and the runtime.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failure surfaced by gallery services and navigation.
pub enum GalleryError {
    /// Non-success upstream or proxy response other than an auth failure.
    #[error("upstream request failed with status {status}: {message}")]
    Upstream {
        /// HTTP status code reported by the failing call.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
    /// Access credential rejected (403-class); never retried automatically.
    #[error("storage credential expired: {message}")]
    AuthExpired {
        /// Message extracted from the response body.
        message: String,
    },
    /// Navigation target outside the current collection.
    #[error("item index {index} is out of range for a collection of {len}")]
    Index {
        /// Requested index.
        index: usize,
        /// Collection length at request time.
        len: usize,
    },
    /// Credential refresh call failed.
    #[error("credential refresh failed: {message}")]
    Refresh {
        /// Failure description.
        message: String,
    },
    /// Network or decoding failure before a status could be interpreted.
    #[error("transport failure: {message}")]
    Transport {
        /// Failure description.
        message: String,
    },
}

impl GalleryError {
    /// Maps a non-success HTTP status and message into the matching error variant.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == 403 {
            Self::AuthExpired { message }
        } else {
            Self::Upstream { status, message }
        }
    }

    /// Builds a transport error from any displayable failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: err.to_string(),
        }
    }

    /// Returns `true` for auth-class failures routed to credential handling.
    pub const fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired { .. })
    }

    /// Returns `true` when an automatic retry may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Transport { .. })
    }

    /// HTTP status this error maps to when returned by the proxy.
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::AuthExpired { .. } => 403,
            Self::Index { .. } => 400,
            Self::Upstream { .. } | Self::Refresh { .. } | Self::Transport { .. } => 502,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Invalid or missing configuration; fatal at proxy startup.
pub enum ConfigError {
    /// A required key was absent or blank.
    #[error("missing required configuration `{key}`")]
    Missing {
        /// Configuration key name.
        key: &'static str,
    },
    /// A key was present but failed validation.
    #[error("invalid configuration `{key}`: {reason}")]
    Invalid {
        /// Configuration key name.
        key: &'static str,
        /// Validation failure description.
        reason: String,
    },
}
