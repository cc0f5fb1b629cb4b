//! Error types for image synthesis.

use std::path::PathBuf;

/// Errors that can occur during intake, submission, or synthesis.
#[derive(Debug, thiserror::Error)]
pub enum PixsynthError {
    /// No API key was provided and none was found in the environment.
    /// Fatal at construction time: the client refuses to build.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// A submission precondition was violated (blank prompt, no images,
    /// out-of-range index, submission already in flight).
    #[error("invalid submission: {0}")]
    Validation(String),

    /// A selected file could not be read or encoded. Aborts the whole
    /// submission; the underlying cause is preserved.
    #[error("failed to encode {path}: {source}")]
    Encoding {
        /// Path of the file that failed to read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The remote call failed (network, auth, server error). The original
    /// cause is logged at the call site; only a human-readable message
    /// crosses this boundary.
    #[error("synthesis request failed: {0}")]
    Transport(String),

    /// The call succeeded but returned no usable content, e.g. the request
    /// was content-filtered or the response had no candidates.
    #[error("no content returned: {0}")]
    EmptyResponse(String),

    /// Failed to decode base64 payload data.
    #[error("failed to decode: {0}")]
    Decode(String),
}

impl PixsynthError {
    /// Returns true if the error is recoverable at the submission boundary,
    /// i.e. the session returns to idle and the user may resubmit.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingCredential(_))
    }
}

/// Result type alias for synthesis operations.
pub type Result<T> = std::result::Result<T, PixsynthError>;
