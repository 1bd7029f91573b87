//! Error types for color operation management.
//!
//! Every failure is deterministic and local: validation errors, an exhausted
//! registry, or an operation on a node without state. Nothing here is
//! transient, so callers should never retry.
//!
//! # Categories
//!
//! - **Invalid argument**: [`InvalidArgument`](ColorOpError::InvalidArgument),
//!   [`NotFound`](ColorOpError::NotFound), [`Lut`](ColorOpError::Lut)
//! - **Resource exhausted**: [`ResourceExhausted`](ColorOpError::ResourceExhausted)
//! - **Invalid state**: [`InvalidState`](ColorOpError::InvalidState)
//! - **Configuration**: [`Yaml`](ColorOpError::Yaml), [`Io`](ColorOpError::Io)

use thiserror::Error;

use crate::colorop::ColorOpId;

/// Result type for color operation management.
pub type ColorOpResult<T> = Result<T, ColorOpError>;

/// Coarse classification of a [`ColorOpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something malformed or unknown.
    InvalidArgument,
    /// The registry has no room for another node.
    ResourceExhausted,
    /// The operation needs state that is absent.
    InvalidState,
}

/// Errors raised while building pipelines or managing their state.
#[derive(Debug, Error)]
pub enum ColorOpError {
    /// Malformed argument: empty capability set, zero LUT size, bad blob.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No live color operation with this id.
    #[error("color operation {0} not found")]
    NotFound(ColorOpId),

    /// The registry cannot hold another color operation.
    #[error("color operation registry exhausted (capacity {capacity})")]
    ResourceExhausted {
        /// Maximum number of live color operations
        capacity: usize,
    },

    /// The operation needs a committed state that is not present.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// LUT descriptor or sample data rejected.
    #[error("LUT error: {0}")]
    Lut(#[from] colorop_lut::LutError),

    /// Pipeline configuration could not be parsed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Pipeline configuration could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ColorOpError {
    /// Classifies the error.
    ///
    /// Configuration read and parse failures count as invalid arguments.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::InvalidArgument(_)
            | Self::NotFound(_)
            | Self::Lut(_)
            | Self::Yaml(_)
            | Self::Io(_) => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
