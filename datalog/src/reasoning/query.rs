use serde::Serialize;
use shared::{Fact, PositiveLiteral, Term};
use crate::reasoning::rules::{matches_pattern, Bindings};
use crate::reasoning::state::Correctness;

/// Answers to an atomic query, with the correctness the reasoner had when they were computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswers {
    answers: Vec<Vec<Term>>,
    correctness: Correctness,
}

impl QueryAnswers {
    pub(crate) fn new(answers: Vec<Vec<Term>>, correctness: Correctness) -> Self {
        Self { answers, correctness }
    }

    /// One tuple per matching fact, as wide as the query predicate.
    pub fn answers(&self) -> &[Vec<Term>] {
        &self.answers
    }

    pub fn correctness(&self) -> Correctness {
        self.correctness
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn contains(&self, tuple: &[Term]) -> bool {
        self.answers.iter().any(|answer| answer.as_slice() == tuple)
    }

    pub fn into_answers(self) -> Vec<Vec<Term>> {
        self.answers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryAnswerCount {
    pub count: usize,
    pub correctness: Correctness,
}

/// Every fact the reasoner holds for the predicates of a knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inferences {
    facts: Vec<Fact>,
    correctness: Correctness,
}

impl Inferences {
    pub(crate) fn new(facts: Vec<Fact>, correctness: Correctness) -> Self {
        Self { facts, correctness }
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn correctness(&self) -> Correctness {
        self.correctness
    }

    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
    }
}

/// The tuples of `candidates` matching `query`.
///
/// Constants must match exactly, a variable repeated in the query must bind equal terms.
/// Tuples containing fresh individuals are dropped unless `include_fresh_individuals` is set.
pub fn matching_tuples(
    query: &PositiveLiteral,
    candidates: Vec<Vec<Term>>,
    include_fresh_individuals: bool,
) -> Vec<Vec<Term>> {
    candidates
        .into_iter()
        .filter(|tuple| include_fresh_individuals || !tuple.iter().any(Term::is_fresh_individual))
        .filter(|tuple| matches_pattern(query.arguments(), tuple, &mut Bindings::new()))
        .collect()
}
