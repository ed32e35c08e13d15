//! Errors raised while constructing model values.

use thiserror::Error;

/// A model value could not be constructed because it would break one of its invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Predicate name must not be blank")]
    BlankPredicateName,

    #[error("Predicate {name:?} must have arity of at least 1")]
    ZeroArity { name: String },

    #[error("Term name must not be blank")]
    BlankTermName,

    #[error("Literal over {predicate} expects {expected} arguments, got {actual}")]
    ArityMismatch {
        predicate: String,
        expected: usize,
        actual: usize,
    },

    #[error("Fact over {predicate} contains variable {variable}")]
    NonGroundFact { predicate: String, variable: String },

    #[error("Conjunction must contain at least one literal")]
    EmptyConjunction,

    #[error("Rule body contains existential variable {variable}")]
    ExistentialInBody { variable: String },

    #[error("Head variable {variable} does not occur in the rule body")]
    UnsafeRule { variable: String },

    #[error("Negative literal over {predicate} cannot be used here")]
    NegativeLiteral { predicate: String },
}

pub type ModelResult<T> = Result<T, ModelError>;

/// A data source could not produce its tuples.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Data source {identity} failed: {message}")]
pub struct SourceError {
    pub identity: String,
    pub message: String,
}
