//! Engine error taxonomy
//!
//! Expected business failures never cross an engine boundary as panics:
//! every public engine operation returns `Result<T, EngineError>` and the
//! variant tells the caller which class of failure occurred.
//!
//! - `Validation`: malformed input, rejected before any state is touched
//! - `Rule`: a business rule blocked the operation (insufficient balance,
//!   wrong status, gate not unlocked, duplicate vote) - no partial effect
//! - `NotFound`: the referenced actor / alliance / contract does not exist
//! - `Fault`: unexpected storage failure; callers may retry idempotent
//!   sweeps on the next cycle

use thiserror::Error;

/// Uniform failure type for all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed input (negative amount, self-target, empty text).
    #[error("{0}")]
    Validation(String),

    /// Business rule violated; the reason string is shown verbatim to the
    /// originator of the action.
    #[error("{0}")]
    Rule(String),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Unexpected storage-layer failure.
    #[error("storage fault: {0}")]
    Fault(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        EngineError::Rule(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        EngineError::NotFound(what.into())
    }
}

/// Shorthand used across every engine.
pub type EngineResult<T> = Result<T, EngineError>;
