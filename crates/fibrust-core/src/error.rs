//! Error type for the core engine.
//!
//! The core favours infallibility: almost every internal failure mode
//! (pool exhaustion, arena overflow) degrades gracefully instead of
//! surfacing. Only the two kinds below ever reach a caller.

use thiserror::Error;

/// Failure modes of [`crate::calculate`] and the individual drivers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FibError {
    /// The cancellation token was observed between loop iterations.
    /// No partial numeric result is produced.
    #[error("calculation cancelled")]
    Cancelled,

    /// `n`, or a threshold, is outside what the configured parameter
    /// tables can serve.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type FibResult<T> = Result<T, FibError>;
