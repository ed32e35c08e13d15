use std::time::Instant;
use log::{debug, trace};
use shared::Rule;
use crate::config::Algorithm;
use crate::reasoning::materialisation::{FactStore, MemoryBackend, Program};
use crate::reasoning::rules::{Bindings, Relations};

pub trait InferenceStrategy {
    /// All bindings that satisfy the bodies of `rules`, one vector per rule in the same order.
    ///
    /// Without a delta every rule is evaluated over all facts; with one, only bindings using at
    /// least one delta fact are required.
    fn evaluate_rules(&self, rules: &[&Rule], relations: &Relations, delta: Option<&Relations>) -> Vec<Vec<Bindings>>;
}

/// Where an evaluation has to stop even if the fixpoint is not reached.
pub struct RoundBudget {
    deadline: Option<Instant>,
    max_rounds: Option<usize>,
    rounds: usize,
}

impl RoundBudget {
    pub fn new(deadline: Option<Instant>, max_rounds: Option<usize>) -> Self {
        Self {
            deadline,
            max_rounds,
            rounds: 0,
        }
    }

    fn record_round(&mut self) {
        self.rounds += 1;
    }

    fn exhausted(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
            || self.max_rounds.map_or(false, |max| self.rounds >= max)
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}

impl MemoryBackend {
    /// Runs every stratum to its fixpoint, lowest first.
    ///
    /// Returns `false` as soon as the budget runs out after a round that derived new facts.
    pub(crate) fn infer_with_strategy<S: InferenceStrategy>(
        &mut self,
        strat: &S,
        algorithm: Algorithm,
        budget: &mut RoundBudget,
    ) -> bool {
        let Self { program, store, .. } = self;

        for (level, stratum) in program.strata.iter().enumerate() {
            trace!("Evaluating stratum {} with {} rules", level, stratum.len());
            if !infer_stratum(strat, program, stratum, store, algorithm, budget) {
                return false;
            }
        }
        true
    }
}

fn infer_stratum<S: InferenceStrategy>(
    strat: &S,
    program: &Program,
    stratum: &[usize],
    store: &mut FactStore,
    algorithm: Algorithm,
    budget: &mut RoundBudget,
) -> bool {
    let mut delta: Option<Relations> = None;

    loop {
        let candidates: Vec<usize> = match &delta {
            None => stratum.to_vec(),
            Some(delta) => program
                .rule_index
                .query_candidate_rules(delta.keys())
                .into_iter()
                .filter(|rule_id| stratum.contains(rule_id))
                .collect(),
        };
        if candidates.is_empty() {
            return true;
        }

        let rules: Vec<&Rule> = candidates.iter().map(|&rule_id| &program.rules[rule_id]).collect();
        let bindings = strat.evaluate_rules(&rules, &store.relations, delta.as_ref());

        // Instantiate heads in rule order; facts become visible to later instantiations at once
        let mut inferred_this_round = Relations::new();
        for ((&rule_id, rule), rule_bindings) in candidates.iter().zip(&rules).zip(&bindings) {
            for binding in rule_bindings {
                store.fire(rule_id, rule, binding, algorithm, &mut inferred_this_round);
            }
        }
        budget.record_round();

        let inferred: usize = inferred_this_round.values().map(|tuples| tuples.len()).sum();
        if inferred == 0 {
            return true;
        }
        debug!("Round {} inferred {} facts", budget.rounds(), inferred);

        if budget.exhausted() {
            return false;
        }
        delta = Some(inferred_this_round);
    }
}
