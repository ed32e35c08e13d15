use std::collections::BTreeSet;
use std::fmt;
use serde::Serialize;
use crate::error::{ModelError, ModelResult};
use crate::literal::{Literal, LiteralKind, PositiveLiteral};
use crate::terms::{Predicate, Term};

/// A non-empty, ordered sequence of literals.
///
/// Equality is order-sensitive; a single-literal conjunction has only one order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Conjunction<T: LiteralKind> {
    literals: Vec<T>,
}

impl<T: LiteralKind> Conjunction<T> {
    pub fn new(literals: Vec<T>) -> ModelResult<Self> {
        if literals.is_empty() {
            return Err(ModelError::EmptyConjunction);
        }
        Ok(Self { literals })
    }

    pub fn literals(&self) -> &[T] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.literals.iter()
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.literals.iter().map(|literal| literal.as_literal().predicate())
    }
}

impl<T: LiteralKind + fmt::Display> fmt::Display for Conjunction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", literal)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Rule {
    head: Conjunction<PositiveLiteral>,
    body: Conjunction<Literal>,
}

impl Rule {
    /// Builds a rule, checking that the body has no existential variables and that
    /// every universal variable of the head is bound by the body.
    pub fn new(head: Conjunction<PositiveLiteral>, body: Conjunction<Literal>) -> ModelResult<Self> {
        if let Some(variable) = body.iter().flat_map(|l| l.existential_variables()).next() {
            return Err(ModelError::ExistentialInBody {
                variable: variable.to_string(),
            });
        }

        let body_variables: BTreeSet<&str> = body.iter().flat_map(|l| l.universal_variables()).collect();
        for literal in head.iter() {
            if let Some(variable) = literal
                .as_literal()
                .universal_variables()
                .find(|v| !body_variables.contains(v))
            {
                return Err(ModelError::UnsafeRule {
                    variable: variable.to_string(),
                });
            }
        }

        Ok(Self { head, body })
    }

    pub fn from_literals(head: Vec<PositiveLiteral>, body: Vec<Literal>) -> ModelResult<Self> {
        Self::new(Conjunction::new(head)?, Conjunction::new(body)?)
    }

    /// `origin(?X1, ..., ?Xn) :- alias(?X1, ..., ?Xn)`, routing every tuple of `alias` into `origin`.
    /// Both predicates must have the same arity.
    pub fn bridging(origin: &Predicate, alias: &Predicate) -> Rule {
        debug_assert_eq!(origin.arity(), alias.arity());
        let variables: Vec<Term> = (1..=origin.arity())
            .map(|i| Term::UniversalVariable(format!("X{}", i)))
            .collect();
        let head = PositiveLiteral(Literal::from_parts(origin.clone(), variables.clone(), false));
        let body = Literal::from_parts(alias.clone(), variables, false);
        Rule {
            head: Conjunction { literals: vec![head] },
            body: Conjunction { literals: vec![body] },
        }
    }

    pub fn head(&self) -> &Conjunction<PositiveLiteral> {
        &self.head
    }

    pub fn body(&self) -> &Conjunction<Literal> {
        &self.body
    }

    /// Distinct head predicates, in order of first occurrence.
    pub fn head_predicates(&self) -> Vec<&Predicate> {
        let mut seen = Vec::new();
        for predicate in self.head.predicates() {
            if !seen.contains(&predicate) {
                seen.push(predicate);
            }
        }
        seen
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.head.predicates().chain(self.body.predicates())
    }

    pub fn has_existential_head(&self) -> bool {
        self.head
            .iter()
            .any(|l| l.as_literal().existential_variables().next().is_some())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :- {} .", self.head, self.body)
    }
}
