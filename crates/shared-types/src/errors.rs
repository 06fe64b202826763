//! # Error Types
//!
//! Errors raised while validating shared state values.

use thiserror::Error;

/// Violations detected when validating a projection or aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateValidationError {
    /// Player level must be at least 1.
    #[error("Invalid player level: {level} (must be >= 1)")]
    InvalidLevel { level: u32 },

    /// Session identifier is missing.
    #[error("Session identifier is empty")]
    EmptySessionId,
}
