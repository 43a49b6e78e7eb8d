//! Error types for flipbook loading and rendering.

use thiserror::Error;

/// Main error type for the flipbook library.
#[derive(Error, Debug)]
pub enum FlipbookError {
    /// Flipbook id is missing, non-numeric, or not positive.
    #[error("Invalid flipbook identifier")]
    InvalidIdentifier,

    /// The rasterization or page-flip library is not available.
    #[error("{library} is not available: {message}")]
    MissingDependency { library: String, message: String },

    /// The document fetch did not settle within the timeout budget.
    #[error("Timed out loading PDF from '{url}' after {timeout_secs} seconds")]
    FetchTimeout { url: String, timeout_secs: u64 },

    /// Network or parse failure while loading the document.
    #[error("Failed to load PDF: {0}")]
    FetchError(String),

    /// A single page failed to render.
    #[error("Failed to render page {page}: {message}")]
    PageRenderError { page: usize, message: String },

    /// The host has no container to render into.
    #[error("Flipbook container not found")]
    ContainerNotFound,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncodingError(String),

    /// Internal channel closed.
    #[error("Internal channel error: {0}")]
    ChannelError(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlipbookError {
    /// Whether a user-triggered retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlipbookError::FetchTimeout { .. } | FlipbookError::FetchError(_)
        )
    }

    pub(crate) fn missing(library: &str, message: impl Into<String>) -> Self {
        FlipbookError::MissingDependency {
            library: library.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, FlipbookError>;

impl From<async_channel::RecvError> for FlipbookError {
    fn from(_: async_channel::RecvError) -> Self {
        FlipbookError::ChannelError("Channel closed".to_string())
    }
}

impl<T> From<async_channel::SendError<T>> for FlipbookError {
    fn from(_: async_channel::SendError<T>) -> Self {
        FlipbookError::ChannelError("Channel closed".to_string())
    }
}
