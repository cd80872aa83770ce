//! Scavenger Error Types
//!
//! Structured errors using `exn`, following the workspace-wide error design.
//! In line with the pipeline's propagation policy, everything recoverable is
//! absorbed at the component boundary; only construction failures and client
//! programming errors surface here.

use derive_more::{Display, Error};

/// A scavenger error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scavenger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// `load_next_result` was called with nothing buffered. Gate calls with
    /// `has_next_result()`.
    #[display("no result buffered; gate calls with has_next_result()")]
    NoBufferedResult,
    /// The default image source could not be initialised.
    #[display("failed to initialise the image source")]
    Source,
    /// The default result sink could not be initialised.
    #[display("failed to initialise the result sink")]
    Sink,
}
