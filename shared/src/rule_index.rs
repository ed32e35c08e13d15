use std::collections::{BTreeSet, HashMap};
use crate::rule::Rule;
use crate::terms::Predicate;

pub type RuleId = usize;

/// Maps each predicate to the rules that use it in a positive body literal.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    by_body_predicate: HashMap<Predicate, BTreeSet<RuleId>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self {
            by_body_predicate: HashMap::new(),
        }
    }

    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a Rule>) -> Self {
        let mut index = Self::new();
        for (rule_id, rule) in rules.into_iter().enumerate() {
            index.insert_rule(rule, rule_id);
        }
        index
    }

    pub fn clear(&mut self) {
        self.by_body_predicate.clear();
    }

    pub fn insert_rule(&mut self, rule: &Rule, rule_id: RuleId) {
        for literal in rule.body().iter().filter(|l| !l.is_negated()) {
            self.by_body_predicate
                .entry(literal.predicate().clone())
                .or_default()
                .insert(rule_id);
        }
    }

    /// Rules that may fire when facts over any of `predicates` change. Sorted by id.
    pub fn query_candidate_rules<'a>(
        &self,
        predicates: impl IntoIterator<Item = &'a Predicate>,
    ) -> BTreeSet<RuleId> {
        let mut results = BTreeSet::new();
        for predicate in predicates {
            if let Some(rule_set) = self.by_body_predicate.get(predicate) {
                results.extend(rule_set);
            }
        }
        results
    }
}
