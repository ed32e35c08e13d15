use std::collections::HashMap;
use indexmap::IndexSet;
use shared::{Literal, Predicate, Rule, Term};

/// Single solution mapping: variable term -> bound value
pub type Bindings = HashMap<Term, Term>;

pub type Tuple = Vec<Term>;

/// Tuples per predicate, in insertion order.
pub type Relations = HashMap<Predicate, IndexSet<Tuple>>;

pub fn matches_pattern(pattern: &[Term], tuple: &[Term], variable_bindings: &mut Bindings) -> bool {
    if pattern.len() != tuple.len() {
        return false;
    }
    // Create a copy of bindings to test against (rollback on failure)
    let mut temp_bindings = variable_bindings.clone();
    for (term, value) in pattern.iter().zip(tuple) {
        if term.is_variable() {
            match temp_bindings.get(term) {
                Some(bound) if bound != value => return false,
                Some(_) => {}
                None => {
                    temp_bindings.insert(term.clone(), value.clone());
                }
            }
        } else if term != value {
            return false;
        }
    }
    *variable_bindings = temp_bindings;
    true
}

/// Extends every binding in `current` with each tuple that matches `pattern`.
pub fn join_pattern<'a>(
    pattern: &[Term],
    tuples: impl Iterator<Item = &'a Tuple> + Clone,
    current: Vec<Bindings>,
) -> Vec<Bindings> {
    let mut results = Vec::new();
    for partial_binding in current {
        for tuple in tuples.clone() {
            let mut b = partial_binding.clone();
            if matches_pattern(pattern, tuple, &mut b) {
                results.push(b);
            }
        }
    }
    results
}

fn tuples_of<'a>(relations: &'a Relations, predicate: &Predicate) -> impl Iterator<Item = &'a Tuple> + Clone {
    relations
        .get(predicate)
        .into_iter()
        .flat_map(|tuples| tuples.iter())
}

fn holds_nowhere(literal: &Literal, relations: &Relations, binding: &Bindings) -> bool {
    !tuples_of(relations, literal.predicate()).any(|tuple| {
        let mut b = binding.clone();
        matches_pattern(literal.arguments(), tuple, &mut b)
    })
}

/// All bindings satisfying the body of `rule`.
///
/// With a delta `(i, tuples)`, the i-th positive body literal is matched against `tuples` only
/// and all other literals against `relations`.
pub fn join_rule(rule: &Rule, relations: &Relations, delta: Option<(usize, &IndexSet<Tuple>)>) -> Vec<Bindings> {
    let mut current = vec![Bindings::new()];

    for (i, literal) in rule.body().iter().filter(|l| !l.is_negated()).enumerate() {
        current = match delta {
            Some((delta_idx, delta_tuples)) if delta_idx == i => {
                join_pattern(literal.arguments(), delta_tuples.iter(), current)
            }
            _ => join_pattern(literal.arguments(), tuples_of(relations, literal.predicate()), current),
        };
        if current.is_empty() {
            return current;
        }
    }

    let negative: Vec<&Literal> = rule.body().iter().filter(|l| l.is_negated()).collect();
    if !negative.is_empty() {
        current.retain(|binding| negative.iter().all(|l| holds_nowhere(l, relations, binding)));
    }
    current
}

/// Whether some extension of `binding` makes every pattern hold in `relations`.
pub fn is_satisfied(patterns: &[(&Predicate, &[Term])], relations: &Relations, binding: &Bindings) -> bool {
    let mut current = vec![binding.clone()];
    for (predicate, arguments) in patterns {
        current = join_pattern(arguments, tuples_of(relations, predicate), current);
        if current.is_empty() {
            return false;
        }
    }
    true
}
