/// Convenience result type used across regionfill.
pub type RegionFillResult<T> = Result<T, RegionFillError>;

/// Top-level error taxonomy.
///
/// Per-region failures (missing images, failed probes) never surface here; they degrade to the
/// fallback fill. Only document-level failures are reported through this type.
#[derive(thiserror::Error, Debug)]
pub enum RegionFillError {
    /// The resource answered with a non-2xx status.
    #[error("not found: '{url}' (HTTP {status})")]
    NotFound {
        /// Attempted URL or path.
        url: String,
        /// HTTP (or emulated) status code.
        status: u16,
    },

    /// The transport failed before a status was received.
    #[error("network error: '{url}': {message}")]
    Network {
        /// Attempted URL or path.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// The payload is not a well-formed document of the expected format.
    #[error("parse error: '{url}': {message}")]
    Parse {
        /// URL or label of the payload.
        url: String,
        /// Parser message.
        message: String,
    },

    /// Invalid user-provided options or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Persisted state could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RegionFillError {
    /// Build a [`RegionFillError::NotFound`] value.
    pub fn not_found(url: impl Into<String>, status: u16) -> Self {
        Self::NotFound {
            url: url.into(),
            status,
        }
    }

    /// Build a [`RegionFillError::Network`] value.
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Build a [`RegionFillError::Parse`] value.
    pub fn parse(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Build a [`RegionFillError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RegionFillError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// URL the failing operation attempted, if known.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::NotFound { url, .. } | Self::Network { url, .. } | Self::Parse { url, .. } => {
                Some(url)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
