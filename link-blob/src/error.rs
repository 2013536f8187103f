use thiserror::Error;

/// Result type for upload pipeline operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur while building or sending an upload
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Length must be provided for streamed uploads")]
    MissingLength,

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload to {provider} failed: {status} {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse {
        provider: &'static str,
        reason: String,
    },

    #[error("HTTP client error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

impl BlobError {
    /// Create a missing-length contract violation
    pub fn missing_length() -> Self {
        Self::MissingLength
    }

    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create an upstream status error
    pub fn upstream<S: Into<String>>(provider: &'static str, status: u16, message: S) -> Self {
        Self::Upstream {
            provider,
            status,
            message: message.into(),
        }
    }

    /// Create an unexpected-reply error
    pub fn invalid_response<S: Into<String>>(provider: &'static str, reason: S) -> Self {
        Self::InvalidResponse {
            provider,
            reason: reason.into(),
        }
    }

    /// Whether the failure was raised before any network I/O
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::MissingLength | Self::Invalid { .. })
    }
}
