//! Result Sink Error Types
//!
//! Structured errors using `exn`, following the workspace-wide error design.
//! Only sink *construction* can fail; once a sink exists, persistence
//! problems are absorbed and logged rather than surfaced.

use derive_more::{Display, Error};
use std::io::Error as IoError;

/// A result-sink error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sink construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Underlying I/O error (creating the image directory or CSV file).
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// The CSV header could not be written.
    #[display("failed to write CSV header")]
    Header,
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}
