use std::fmt;
use serde::Serialize;
use crate::error::{ModelError, ModelResult};
use crate::terms::{Predicate, Term};

/// A predicate applied to a list of terms, with a polarity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Literal {
    predicate: Predicate,
    arguments: Vec<Term>,
    negated: bool,
}

impl Literal {
    pub fn new(predicate: Predicate, arguments: Vec<Term>, negated: bool) -> ModelResult<Self> {
        if arguments.len() != predicate.arity() {
            return Err(ModelError::ArityMismatch {
                predicate: predicate.name().to_string(),
                expected: predicate.arity(),
                actual: arguments.len(),
            });
        }
        Ok(Self {
            predicate,
            arguments,
            negated,
        })
    }

    /// Caller guarantees `arguments.len() == predicate.arity()`.
    pub(crate) fn from_parts(predicate: Predicate, arguments: Vec<Term>, negated: bool) -> Self {
        debug_assert_eq!(arguments.len(), predicate.arity());
        Self {
            predicate,
            arguments,
            negated,
        }
    }

    pub fn positive(predicate: Predicate, arguments: Vec<Term>) -> ModelResult<Self> {
        Self::new(predicate, arguments, false)
    }

    pub fn negative(predicate: Predicate, arguments: Vec<Term>) -> ModelResult<Self> {
        Self::new(predicate, arguments, true)
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn universal_variables(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter_map(|term| match term {
            Term::UniversalVariable(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn existential_variables(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().filter_map(|term| match term {
            Term::ExistentialVariable(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "~")?;
        }
        write!(f, "{}(", self.predicate.name())?;
        for (i, term) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ")")
    }
}

/// A literal that is known to be positive. Rule heads and queries are built from these.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PositiveLiteral(pub(crate) Literal);

impl PositiveLiteral {
    pub fn new(predicate: Predicate, arguments: Vec<Term>) -> ModelResult<Self> {
        Literal::positive(predicate, arguments).map(PositiveLiteral)
    }

    pub fn predicate(&self) -> &Predicate {
        self.0.predicate()
    }

    pub fn arguments(&self) -> &[Term] {
        self.0.arguments()
    }
}

impl TryFrom<Literal> for PositiveLiteral {
    type Error = ModelError;

    fn try_from(literal: Literal) -> ModelResult<Self> {
        if literal.is_negated() {
            return Err(ModelError::NegativeLiteral {
                predicate: literal.predicate().name().to_string(),
            });
        }
        Ok(PositiveLiteral(literal))
    }
}

impl From<PositiveLiteral> for Literal {
    fn from(literal: PositiveLiteral) -> Self {
        literal.0
    }
}

impl fmt::Display for PositiveLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kinds of literal a `Conjunction` may be built from.
pub trait LiteralKind: Clone + fmt::Debug + Eq + std::hash::Hash {
    fn as_literal(&self) -> &Literal;
}

impl LiteralKind for Literal {
    fn as_literal(&self) -> &Literal {
        self
    }
}

impl LiteralKind for PositiveLiteral {
    fn as_literal(&self) -> &Literal {
        &self.0
    }
}

/// A ground positive literal: every argument is a constant or a fresh individual.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Fact {
    predicate: Predicate,
    arguments: Vec<Term>,
}

impl Fact {
    pub fn new(predicate: Predicate, arguments: Vec<Term>) -> ModelResult<Self> {
        if arguments.len() != predicate.arity() {
            return Err(ModelError::ArityMismatch {
                predicate: predicate.name().to_string(),
                expected: predicate.arity(),
                actual: arguments.len(),
            });
        }
        if let Some(variable) = arguments.iter().find(|term| term.is_variable()) {
            return Err(ModelError::NonGroundFact {
                predicate: predicate.name().to_string(),
                variable: variable.to_string(),
            });
        }
        Ok(Self {
            predicate,
            arguments,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }
}

impl From<Fact> for PositiveLiteral {
    fn from(fact: Fact) -> Self {
        PositiveLiteral(Literal {
            predicate: fact.predicate,
            arguments: fact.arguments,
            negated: false,
        })
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate.name())?;
        for (i, term) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", term)?;
        }
        write!(f, ") .")
    }
}
