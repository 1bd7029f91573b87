//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur while building or decoding LUTs.
#[derive(Debug, Error)]
pub enum LutError {
    /// Invalid LUT size.
    #[error("invalid LUT size: {0}")]
    InvalidSize(String),

    /// Blob length does not match the record or sample layout.
    #[error("invalid blob length {len}: expected a nonzero multiple of {record}")]
    InvalidBlobLength {
        /// Length of the rejected blob in bytes
        len: usize,
        /// Size of one record in bytes
        record: usize,
    },

    /// A multi-segment range record is malformed.
    #[error("invalid LUT range {index}: {reason}")]
    InvalidRange {
        /// Index of the offending record
        index: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Curve type id outside the known set.
    #[error("unknown curve type id: {0}")]
    UnknownCurve(u32),
}
