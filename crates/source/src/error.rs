//! Source Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, following the workspace-wide error design.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A source error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong
/// internally. [`Exhausted`](ErrorKind::Exhausted) is the only kind with
/// pipeline-level meaning: it signals normal end-of-stream and terminates the
/// image stage cleanly. Everything else indicates a source that can no longer
/// honour its contract.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No further image is, or will become, available from this source.
    #[display("no image available")]
    Exhausted,
    /// A network request failed (DNS, connect, timeout, non-success status).
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The gallery page was fetched but carried no resolvable image element.
    #[display("no image reference found on gallery page for id {_0:?}")]
    MissingImage(#[error(not(source))] String),
    /// Downloaded or on-disk bytes could not be decoded as an image.
    #[display("failed to decode image data for {_0:?}")]
    Decode(#[error(not(source))] String),
    /// Underlying I/O error.
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }
}
