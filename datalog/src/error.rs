//! Error types for the reasoner

use shared::{ModelError, Predicate, SourceError};
use thiserror::Error;
use crate::reasoning::state::ReasonerState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReasonerError {
    /// The operation is not allowed in the reasoner's current state
    #[error("Cannot {operation} while the reasoner is in state {state}")]
    State {
        operation: &'static str,
        state: ReasonerState,
    },

    /// A source produced tuples whose width does not match the declared predicate
    #[error("Predicate {predicate} is declared with arity {expected} but its source yields tuples of arity {observed}")]
    IncompatibleArity {
        predicate: Predicate,
        expected: usize,
        observed: usize,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Negation through recursion
    #[error("Rules are not stratifiable: {predicate} depends negatively on itself")]
    NotStratifiable { predicate: Predicate },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for reasoner operations
pub type ReasonerResult<T> = Result<T, ReasonerError>;

impl From<serde_json::Error> for ReasonerError {
    fn from(err: serde_json::Error) -> Self {
        ReasonerError::Configuration(err.to_string())
    }
}

impl From<std::io::Error> for ReasonerError {
    fn from(err: std::io::Error) -> Self {
        ReasonerError::Configuration(err.to_string())
    }
}
