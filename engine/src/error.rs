//! Engine error types.

use std::fmt;

/// Errors raised by the matching core.
///
/// Every variant here is fatal in the sense of §7 of the system
/// specification: none of them is the "cancel of an unknown id" case, which
/// is deliberately *not* an error (see [`crate::MatchingEngine::process_cancel`]).
#[derive(Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// An insert named an `id` that is already live in the validity index.
    DuplicateOrderId {
        /// The id that was already live.
        id: u64,
    },

    /// An insert carried a non-positive price or size.
    InvalidOrder {
        /// The id of the rejected order.
        id: u64,
        /// Which field failed validation and why.
        reason: &'static str,
    },

    /// An internal invariant (§3) was found to be violated. This indicates a
    /// bug in the matching core, not a malformed input.
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::DuplicateOrderId { id } => {
                write!(f, "duplicate live order id on insert: {id}")
            }
            EngineError::InvalidOrder { id, reason } => {
                write!(f, "invalid order {id}: {reason}")
            }
            EngineError::InvariantViolation { message } => {
                write!(f, "invariant violation: {message}")
            }
        }
    }
}

impl std::error::Error for EngineError {}
