//! Errors raised by the signature algebra.
//!
//! Every variant is a caller contract violation: the operation that produced
//! it is abandoned and nothing is retried. False positives from hash
//! collisions are not errors and never show up here.

/// A specialized Result type for signature operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree engine asked for a strategy this index does not implement.
    #[error("unsupported strategy number: {0}")]
    UnsupportedStrategy(u16),

    /// PickSplit needs at least two entries to form two non-empty groups.
    #[error("cannot split fewer than 2 entries (got {got})")]
    SplitTooSmall {
        /// Number of entries supplied.
        got: usize,
    },

    /// An encoded entry could not be decoded.
    #[error("malformed entry: {reason}")]
    MalformedEntry {
        /// What was wrong with the buffer.
        reason: String,
    },

    /// The query operand does not have the shape the strategy expects.
    #[error("strategy {strategy} cannot be evaluated against a {operand} operand")]
    OperandMismatch {
        strategy: &'static str,
        operand: &'static str,
    },

    /// A query cache was reused for a different strategy than the one it was built for.
    #[error("query cache built for {cached} cannot serve {requested}")]
    CacheMismatch {
        cached: &'static str,
        requested: &'static str,
    },

    #[error("unknown hash method: {0:?}")]
    UnknownHashMethod(String),

    #[error("invalid balance factor: {0} (must be finite and >= 0)")]
    InvalidBalanceFactor(f64),

    #[error("invalid numeric literal: {0:?}")]
    InvalidNumeric(String),

    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedEntry {
            reason: reason.into(),
        }
    }
}
