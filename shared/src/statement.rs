use std::fmt;
use serde::Serialize;
use crate::literal::Fact;
use crate::rule::Rule;
use crate::source::SourceDeclaration;
use crate::terms::Predicate;

/// Anything that can be stored in a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Statement {
    Fact(Fact),
    Rule(Rule),
    SourceDeclaration(SourceDeclaration),
}

impl Statement {
    /// All predicates the statement mentions.
    pub fn predicates(&self) -> Vec<&Predicate> {
        match self {
            Statement::Fact(fact) => vec![fact.predicate()],
            Statement::Rule(rule) => rule.predicates().collect(),
            Statement::SourceDeclaration(declaration) => vec![declaration.predicate()],
        }
    }
}

impl From<Fact> for Statement {
    fn from(fact: Fact) -> Self {
        Statement::Fact(fact)
    }
}

impl From<Rule> for Statement {
    fn from(rule: Rule) -> Self {
        Statement::Rule(rule)
    }
}

impl From<SourceDeclaration> for Statement {
    fn from(declaration: SourceDeclaration) -> Self {
        Statement::SourceDeclaration(declaration)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Fact(fact) => fact.fmt(f),
            Statement::Rule(rule) => rule.fmt(f),
            Statement::SourceDeclaration(declaration) => declaration.fmt(f),
        }
    }
}
