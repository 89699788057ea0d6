//! Error types for ltn.

use thiserror::Error;

/// The main error type for knowledge-base operations.
#[derive(Debug, Error)]
pub enum LtnError {
    /// Candle tensor operation failed
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// Formula parse error
    #[error("parse error in `{source_text}`: {message}")]
    Parse { source_text: String, message: String },

    /// Unknown predicate, variable, or constant symbol
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Feature width of an atom's terms does not match the predicate
    #[error("predicate {predicate} expects input width {expected}, got {got}")]
    InputWidthMismatch {
        predicate: String,
        expected: usize,
        got: usize,
    },

    /// Invalid binding (bad variable name, wrong tensor rank, ...)
    #[error("invalid binding: {0}")]
    Binding(String),

    /// Runtime error
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Plot rendering failed
    #[error("plot error: {0}")]
    Plot(String),
}

/// Result type for ltn operations.
pub type Result<T> = std::result::Result<T, LtnError>;
