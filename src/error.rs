//! Error type shared by every fallible operation in the crate.
//!
//! Only malformed input, invalid configuration, unknown identifiers and
//! I/O failures are errors. An algorithm that cannot place somebody
//! (no partner, no 9-pair cluster, no successor) is a normal outcome and
//! shows up in the successor pools instead.

use thiserror::Error;

use crate::model::{GroupId, PairId, ParticipantId};

/// Errors raised by the engine.
#[derive(Debug, Error)]
pub enum SpinfoodError {
    /// A registration field could not be interpreted.
    #[error("invalid input in row {row}, field {field}: {reason}")]
    InvalidInput {
        /// Zero-based row index within the imported batch.
        row: usize,
        /// Zero-based column index within the row.
        field: usize,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The participant id does not exist in the event.
    #[error("unknown participant {0}")]
    UnknownParticipant(ParticipantId),

    /// The pair id does not exist in the event.
    #[error("unknown pair {0}")]
    UnknownPair(PairId),

    /// The group id does not exist in the event.
    #[error("unknown group {0}")]
    UnknownGroup(GroupId),

    /// Two participants cannot form a pair.
    #[error("participants cannot be paired: {0}")]
    IncompatiblePair(String),

    /// Reading or writing the external record format failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl SpinfoodError {
    pub(crate) fn invalid_input(row: usize, field: usize, reason: impl Into<String>) -> Self {
        SpinfoodError::InvalidInput {
            row,
            field,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for SpinfoodError {
    fn from(err: csv::Error) -> Self {
        SpinfoodError::Io(err.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SpinfoodError>;
