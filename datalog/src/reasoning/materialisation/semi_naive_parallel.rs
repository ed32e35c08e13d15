use rayon::prelude::*;
use shared::Rule;
use crate::reasoning::materialisation::infer_generic::InferenceStrategy;
use crate::reasoning::materialisation::semi_naive::evaluate_with_delta;
use crate::reasoning::rules::{Bindings, Relations};

/// Semi-naive evaluation with the rules of a round spread over the rayon pool.
///
/// Only the joins run in parallel; heads are instantiated afterwards in rule order, which keeps
/// the names of fresh individuals independent of scheduling.
pub struct SemiNaiveParallelStrategy;

impl InferenceStrategy for SemiNaiveParallelStrategy {
    fn evaluate_rules(&self, rules: &[&Rule], relations: &Relations, delta: Option<&Relations>) -> Vec<Vec<Bindings>> {
        rules
            .par_iter()
            .map(|rule| evaluate_with_delta(rule, relations, delta))
            .collect()
    }
}
