//! Error types for the coach engine

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoachError {
    /// No categories or no transactions to derive metrics from.
    #[error("empty dataset: no transactions to derive metrics from")]
    EmptyDataset,

    /// Goal target must be a finite positive amount.
    #[error("invalid saving goal: target must be > 0 (got {target})")]
    InvalidGoal { target: f64 },

    #[error("invalid transition: cannot {event} while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

pub type Result<T> = std::result::Result<T, CoachError>;
