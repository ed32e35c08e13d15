use shared::Rule;
use crate::reasoning::materialisation::infer_generic::InferenceStrategy;
use crate::reasoning::rules::{join_rule, Bindings, Relations};

pub struct SemiNaiveStrategy;

/// Evaluates one rule, joining each positive body literal in turn against the delta.
///
/// Without a delta the rule is evaluated over all facts.
pub(crate) fn evaluate_with_delta(rule: &Rule, relations: &Relations, delta: Option<&Relations>) -> Vec<Bindings> {
    let delta = match delta {
        None => return join_rule(rule, relations, None),
        Some(delta) => delta,
    };

    let mut results = Vec::new();
    for (i, literal) in rule.body().iter().filter(|l| !l.is_negated()).enumerate() {
        if let Some(delta_facts) = delta.get(literal.predicate()) {
            results.extend(join_rule(rule, relations, Some((i, delta_facts))));
        }
    }
    results
}

impl InferenceStrategy for SemiNaiveStrategy {
    fn evaluate_rules(&self, rules: &[&Rule], relations: &Relations, delta: Option<&Relations>) -> Vec<Vec<Bindings>> {
        rules
            .iter()
            .map(|rule| evaluate_with_delta(rule, relations, delta))
            .collect()
    }
}
