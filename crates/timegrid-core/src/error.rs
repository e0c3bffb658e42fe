//! Error types for timegrid-core operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimegridError {
    /// The recurrence text could not be parsed as an RFC 5545 rule.
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// The rule parsed, but its frequency is not supported by the engine.
    #[error("unsupported recurrence frequency: {0}")]
    UnsupportedFrequency(String),

    /// The recurrence anchor time-of-day is out of range.
    #[error("invalid anchor time {hour:02}:{minute:02}")]
    InvalidAnchor { hour: u32, minute: u32 },

    /// Canonical interval text did not match the `start/end` form.
    #[error("invalid interval text: {0}")]
    InvalidInterval(String),
}

/// Convenience alias used throughout timegrid-core.
pub type Result<T> = std::result::Result<T, TimegridError>;
