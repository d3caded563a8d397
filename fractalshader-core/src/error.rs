//! Error types shared by the core crate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FractalError {
    /// A viewport or render value was non-finite or out of range.
    /// The rejected operation leaves state unchanged.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Malformed input to an operation, e.g. starting playback without keyframes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The shader compiler rejected a generated program.
    /// The previous program and parameters remain current.
    #[error("shader compilation failed: {0}")]
    CompileFailure(String),
}

/// Errors raised while importing a GIMP gradient file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GgrError {
    #[error("not a GIMP Gradient file")]
    NotGimpGradient,

    #[error("illegal GIMP Gradient file: {0}")]
    IllegalHeader(String),

    #[error("malformed segment on line {line}: {reason}")]
    BadSegment { line: usize, reason: String },

    #[error("unsupported color space: {0}")]
    UnsupportedColorSpace(i64),
}

pub type Result<T, E = FractalError> = std::result::Result<T, E>;
