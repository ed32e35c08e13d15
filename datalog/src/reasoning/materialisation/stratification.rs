use std::collections::HashMap;
use shared::rule_index::RuleId;
use shared::{Predicate, Rule};
use crate::error::{ReasonerError, ReasonerResult};

/// Groups rules into strata so that every predicate used under negation is complete before
/// any rule reading it negatively fires.
///
/// All head predicates of a rule share its stratum. Fails when a predicate depends negatively
/// on itself through recursion.
pub fn stratify(rules: &[Rule]) -> ReasonerResult<Vec<Vec<RuleId>>> {
    let mut stratum: HashMap<&Predicate, usize> = HashMap::new();
    for predicate in rules.iter().flat_map(|rule| rule.predicates()) {
        stratum.entry(predicate).or_insert(0);
    }
    // a stratum above the number of predicates means a negative cycle
    let limit = stratum.len();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in rules {
            let heads = rule.head_predicates();
            let mut required = heads.iter().map(|p| stratum[p]).max().unwrap_or(0);
            for literal in rule.body().iter() {
                let lower = stratum[literal.predicate()] + usize::from(literal.is_negated());
                required = required.max(lower);
            }
            for predicate in heads {
                if stratum[predicate] < required {
                    if required > limit {
                        return Err(ReasonerError::NotStratifiable {
                            predicate: predicate.clone(),
                        });
                    }
                    stratum.insert(predicate, required);
                    changed = true;
                }
            }
        }
    }

    let mut strata: Vec<Vec<RuleId>> = Vec::new();
    for (rule_id, rule) in rules.iter().enumerate() {
        let level = rule
            .head_predicates()
            .iter()
            .map(|p| stratum[p])
            .max()
            .unwrap_or(0);
        if strata.len() <= level {
            strata.resize_with(level + 1, Vec::new);
        }
        strata[level].push(rule_id);
    }
    strata.retain(|rules| !rules.is_empty());
    Ok(strata)
}
