/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! In-memory bottom-up evaluation.
//!
//! Rules are evaluated semi-naively, stratum by stratum. Existential head variables are
//! satisfied with fresh individuals, either only when the head does not already hold
//! (restricted chase) or once per rule and frontier binding (Skolem chase).

use std::collections::HashSet;
use std::time::Instant;
use log::{debug, info};
use shared::rule_index::{RuleId, RuleIndex};
use shared::{Predicate, Rule, Term};
use crate::config::{Algorithm, ReasonerConfiguration};
use crate::error::{ReasonerError, ReasonerResult};
use crate::reasoning::backend::Backend;
use crate::reasoning::classification::{ClassificationResult, FactSource};
use crate::reasoning::rules::{is_satisfied, Bindings, Relations, Tuple};

pub mod infer_generic;
pub mod semi_naive;
pub mod semi_naive_parallel;
pub mod stratification;

use infer_generic::RoundBudget;
use semi_naive::SemiNaiveStrategy;
use semi_naive_parallel::SemiNaiveParallelStrategy;

#[derive(Debug, Default)]
pub(crate) struct Program {
    pub(crate) rules: Vec<Rule>,
    pub(crate) rule_index: RuleIndex,
    pub(crate) strata: Vec<Vec<RuleId>>,
}

#[derive(Debug, Default)]
pub(crate) struct FactStore {
    pub(crate) relations: Relations,
    next_individual: usize,
    // fresh individuals that came with the loaded data; generated names must avoid them
    reserved: HashSet<String>,
}

/// Reference [`Backend`] keeping every relation in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub(crate) program: Program,
    pub(crate) store: FactStore,
    loaded: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tuples over all predicates, aliases included.
    pub fn fact_count(&self) -> usize {
        self.store.relations.values().map(|tuples| tuples.len()).sum()
    }

    fn load_source(&mut self, source: &FactSource, target: &Predicate, classification: &ClassificationResult) -> ReasonerResult<()> {
        match source {
            FactSource::LocalFacts(predicate) => {
                let facts = classification.direct_facts().get(predicate).into_iter().flatten();
                for fact in facts {
                    self.store.insert(target, fact.arguments().to_vec());
                }
            }
            FactSource::Declared(declaration) => {
                let tuples = declaration.source().read_tuples()?;
                let expected = declaration.predicate().arity();
                if let Some(tuple) = tuples.iter().find(|tuple| tuple.len() != expected) {
                    return Err(ReasonerError::IncompatibleArity {
                        predicate: declaration.predicate().clone(),
                        expected,
                        observed: tuple.len(),
                    });
                }
                debug!("Loaded {} tuples from <{}> into {}", tuples.len(), declaration.source_identity(), target);
                for tuple in tuples {
                    self.store.insert(target, tuple);
                }
            }
        }
        Ok(())
    }
}

impl FactStore {
    fn insert(&mut self, predicate: &Predicate, tuple: Tuple) -> bool {
        self.relations.entry(predicate.clone()).or_default().insert(tuple)
    }

    /// Records the fresh individuals already named by loaded facts or by rule constants.
    fn reserve_individuals(&mut self, rules: &[Rule]) {
        let in_facts = self.relations.values().flat_map(|tuples| tuples.iter().flatten());
        let in_rules = rules.iter().flat_map(|rule| {
            let head = rule.head().iter().flat_map(|l| l.arguments());
            head.chain(rule.body().iter().flat_map(|l| l.arguments()))
        });
        let names: Vec<String> = in_facts
            .chain(in_rules)
            .filter(|term| term.is_fresh_individual())
            .map(|term| term.name().to_string())
            .collect();
        self.reserved.extend(names);
    }

    fn fresh_individual(&mut self) -> Term {
        loop {
            let name = format!("n{}", self.next_individual);
            self.next_individual += 1;
            if !self.reserved.contains(&name) {
                return Term::FreshIndividual(name);
            }
        }
    }

    fn skolem_individual(&self, mut name: String) -> Term {
        while self.reserved.contains(&name) {
            name.push('\'');
        }
        Term::FreshIndividual(name)
    }

    /// Instantiates the head of `rule` under `binding`, recording every new tuple in `inferred`.
    pub(crate) fn fire(
        &mut self,
        rule_id: RuleId,
        rule: &Rule,
        binding: &Bindings,
        algorithm: Algorithm,
        inferred: &mut Relations,
    ) {
        let mut existentials: Vec<&Term> = Vec::new();
        for literal in rule.head().iter() {
            for term in literal.arguments() {
                if matches!(term, Term::ExistentialVariable(_)) && !existentials.contains(&term) {
                    existentials.push(term);
                }
            }
        }

        let mut binding = binding.clone();
        if !existentials.is_empty() {
            match algorithm {
                Algorithm::RestrictedChase => {
                    let patterns: Vec<(&Predicate, &[Term])> = rule
                        .head()
                        .iter()
                        .map(|l| (l.predicate(), l.arguments()))
                        .collect();
                    if is_satisfied(&patterns, &self.relations, &binding) {
                        return;
                    }
                    for variable in existentials {
                        let individual = self.fresh_individual();
                        binding.insert(variable.clone(), individual);
                    }
                }
                Algorithm::SkolemChase => {
                    let frontier = skolem_frontier(rule, &binding);
                    for variable in existentials {
                        let name = format!("sk{}_{}{}", rule_id, variable.name(), frontier);
                        let individual = self.skolem_individual(name);
                        binding.insert(variable.clone(), individual);
                    }
                }
            }
        }

        for literal in rule.head().iter() {
            let tuple: Option<Tuple> = literal
                .arguments()
                .iter()
                .map(|term| {
                    if term.is_variable() {
                        binding.get(term).cloned()
                    } else {
                        Some(term.clone())
                    }
                })
                .collect();
            // head variable only bound under negation: nothing to derive
            let Some(tuple) = tuple else { continue };
            if self.insert(literal.predicate(), tuple.clone()) {
                inferred.entry(literal.predicate().clone()).or_default().insert(tuple);
            }
        }
    }
}

/// The values of the universal head variables, in variable order.
///
/// Encoded with `Debug`, which quotes every term, so distinct bindings never share a key.
fn skolem_frontier(rule: &Rule, binding: &Bindings) -> String {
    let mut variables: Vec<&Term> = rule
        .head()
        .iter()
        .flat_map(|l| l.arguments())
        .filter(|t| matches!(t, Term::UniversalVariable(_)))
        .collect();
    variables.sort();
    variables.dedup();
    let values: Vec<&Term> = variables.iter().filter_map(|v| binding.get(*v)).collect();
    format!("{:?}", values)
}

impl Backend for MemoryBackend {
    fn load(&mut self, classification: &ClassificationResult) -> ReasonerResult<()> {
        self.reset();

        for (predicate, source) in classification.edb() {
            self.load_source(source, predicate, classification)?;
        }
        for (source, alias) in classification.aliased_sources() {
            self.load_source(source, alias, classification)?;
        }

        // bridging rules first, so aliased facts are in place before existential heads are checked
        let rules: Vec<Rule> = classification
            .bridging_rules()
            .iter()
            .chain(classification.rules())
            .cloned()
            .collect();
        let strata = stratification::stratify(&rules)?;
        self.store.reserve_individuals(&rules);
        self.program = Program {
            rule_index: RuleIndex::from_rules(&rules),
            rules,
            strata,
        };
        self.loaded = true;

        info!(
            "Loaded {} facts and {} rules in {} strata",
            self.fact_count(),
            self.program.rules.len(),
            self.program.strata.len()
        );
        Ok(())
    }

    fn materialise(&mut self, configuration: &ReasonerConfiguration, deadline: Option<Instant>) -> ReasonerResult<bool> {
        let before = self.fact_count();
        let mut budget = RoundBudget::new(deadline, configuration.max_rounds);

        let completed = if configuration.parallel {
            self.infer_with_strategy(&SemiNaiveParallelStrategy, configuration.algorithm, &mut budget)
        } else {
            self.infer_with_strategy(&SemiNaiveStrategy, configuration.algorithm, &mut budget)
        };

        info!(
            "Materialisation {} after {} rounds, {} facts inferred",
            if completed { "reached fixpoint" } else { "interrupted" },
            budget.rounds(),
            self.fact_count() - before
        );
        Ok(completed)
    }

    fn facts_of(&self, predicate: &Predicate) -> Vec<Vec<Term>> {
        self.store
            .relations
            .get(predicate)
            .map(|tuples| tuples.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn reset(&mut self) {
        self.program = Program::default();
        self.store = FactStore::default();
        self.loaded = false;
    }

    fn close(&mut self) {
        if self.loaded {
            debug!("Releasing {} facts", self.fact_count());
        }
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use shared::{Fact, InMemoryDataSource, Literal, PositiveLiteral, SourceDeclaration, Statement};
    use crate::reasoning::classification::classify;

    fn c(name: &str) -> Term {
        Term::constant(name).unwrap()
    }

    fn v(name: &str) -> Term {
        Term::universal(name).unwrap()
    }

    fn pred(name: &str, arity: usize) -> Predicate {
        Predicate::new(name, arity).unwrap()
    }

    fn fact(name: &str, args: &[&str]) -> Statement {
        Fact::new(pred(name, args.len()), args.iter().map(|a| c(a)).collect()).unwrap().into()
    }

    fn transitive_closure() -> Vec<Statement> {
        let path = pred("path", 2);
        let edge = pred("edge", 2);
        vec![
            fact("edge", &["a", "b"]),
            fact("edge", &["b", "c"]),
            fact("edge", &["c", "d"]),
            Rule::from_literals(
                vec![PositiveLiteral::new(path.clone(), vec![v("X"), v("Y")]).unwrap()],
                vec![Literal::positive(edge.clone(), vec![v("X"), v("Y")]).unwrap()],
            )
            .unwrap()
            .into(),
            Rule::from_literals(
                vec![PositiveLiteral::new(path.clone(), vec![v("X"), v("Z")]).unwrap()],
                vec![
                    Literal::positive(path, vec![v("X"), v("Y")]).unwrap(),
                    Literal::positive(edge, vec![v("Y"), v("Z")]).unwrap(),
                ],
            )
            .unwrap()
            .into(),
        ]
    }

    fn materialise(statements: &[Statement], configuration: &ReasonerConfiguration) -> MemoryBackend {
        let mut backend = MemoryBackend::new();
        backend.load(&classify(statements)).unwrap();
        assert!(backend.materialise(configuration, None).unwrap());
        backend
    }

    #[test]
    fn computes_transitive_closure() {
        let backend = materialise(&transitive_closure(), &ReasonerConfiguration::default());
        assert_eq!(backend.facts_of(&pred("path", 2)).len(), 6);
    }

    #[test]
    fn parallel_strategy_derives_the_same_facts() {
        let configuration = ReasonerConfiguration {
            parallel: true,
            ..Default::default()
        };
        let parallel = materialise(&transitive_closure(), &configuration);
        let sequential = materialise(&transitive_closure(), &ReasonerConfiguration::default());

        let mut a = parallel.facts_of(&pred("path", 2));
        let mut b = sequential.facts_of(&pred("path", 2));
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn aliased_source_is_loaded_under_the_alias() {
        let p = pred("p", 1);
        let source = Arc::new(InMemoryDataSource::new("p", vec![vec![c("s")]]).unwrap());
        let statements = vec![
            fact("p", &["local"]),
            SourceDeclaration::new(p.clone(), source).into(),
        ];
        let classification = classify(&statements);
        let mut backend = MemoryBackend::new();
        backend.load(&classification).unwrap();

        assert!(backend.facts_of(&p).is_empty());
        assert_eq!(backend.facts_of(&pred("p#local", 1)), vec![vec![c("local")]]);
        assert_eq!(backend.facts_of(&pred("p#source0", 1)), vec![vec![c("s")]]);

        backend.materialise(&ReasonerConfiguration::default(), None).unwrap();
        assert_eq!(backend.facts_of(&p).len(), 2);
    }

    #[test]
    fn wrong_source_arity_is_reported() {
        let p = pred("p", 2);
        let source = Arc::new(InMemoryDataSource::new("short", vec![vec![c("a")]]).unwrap());
        let statements = vec![Statement::from(SourceDeclaration::new(p.clone(), source))];
        let err = MemoryBackend::new().load(&classify(&statements)).unwrap_err();
        assert_eq!(
            err,
            ReasonerError::IncompatibleArity {
                predicate: p,
                expected: 2,
                observed: 1
            }
        );
    }

    fn existential_statements() -> Vec<Statement> {
        let person = pred("person", 1);
        let parent = pred("hasParent", 2);
        vec![
            fact("person", &["alice"]),
            fact("hasParent", &["bob", "carol"]),
            fact("person", &["bob"]),
            Rule::from_literals(
                vec![PositiveLiteral::new(parent, vec![v("X"), Term::existential("Y").unwrap()]).unwrap()],
                vec![Literal::positive(person, vec![v("X")]).unwrap()],
            )
            .unwrap()
            .into(),
        ]
    }

    #[test]
    fn restricted_chase_skips_satisfied_heads() {
        let backend = materialise(&existential_statements(), &ReasonerConfiguration::default());
        let parents = backend.facts_of(&pred("hasParent", 2));
        assert_eq!(parents.len(), 2);
        assert!(parents.iter().any(|t| t[0] == c("alice") && t[1].is_fresh_individual()));
    }

    #[test]
    fn skolem_chase_fires_for_every_binding() {
        let configuration = ReasonerConfiguration {
            algorithm: Algorithm::SkolemChase,
            ..Default::default()
        };
        let backend = materialise(&existential_statements(), &configuration);
        let parents = backend.facts_of(&pred("hasParent", 2));
        assert_eq!(parents.len(), 3);
        assert_eq!(parents.iter().filter(|t| t[1].is_fresh_individual()).count(), 2);
    }

    #[test]
    fn restricted_chase_avoids_loaded_fresh_individuals() {
        let person = pred("person", 1);
        let parent = pred("hasParent", 2);
        let knows = pred("knows", 2);
        let bad = pred("bad", 1);
        let loaded = Term::fresh_individual("n0").unwrap();
        let statements = vec![
            fact("person", &["alice"]),
            Fact::new(knows.clone(), vec![c("bob"), loaded.clone()]).unwrap().into(),
            Rule::from_literals(
                vec![PositiveLiteral::new(parent.clone(), vec![v("X"), Term::existential("Y").unwrap()]).unwrap()],
                vec![Literal::positive(person, vec![v("X")]).unwrap()],
            )
            .unwrap()
            .into(),
            Rule::from_literals(
                vec![PositiveLiteral::new(bad.clone(), vec![v("X")]).unwrap()],
                vec![
                    Literal::positive(parent.clone(), vec![v("X"), v("Y")]).unwrap(),
                    Literal::positive(knows, vec![v("Z"), v("Y")]).unwrap(),
                ],
            )
            .unwrap()
            .into(),
        ];

        let backend = materialise(&statements, &ReasonerConfiguration::default());
        let parents = backend.facts_of(&parent);
        assert_eq!(parents.len(), 1);
        assert!(parents[0][1].is_fresh_individual());
        assert_ne!(parents[0][1], loaded);
        assert!(backend.facts_of(&bad).is_empty());
    }

    #[test]
    fn skolem_names_keep_bindings_apart() {
        let input = pred("in", 2);
        let output = pred("f", 3);
        let statements = vec![
            fact("in", &["a,b", "c"]),
            fact("in", &["a", "b,c"]),
            Rule::from_literals(
                vec![PositiveLiteral::new(output.clone(), vec![v("X"), v("Y"), Term::existential("Z").unwrap()]).unwrap()],
                vec![Literal::positive(input, vec![v("X"), v("Y")]).unwrap()],
            )
            .unwrap()
            .into(),
        ];
        let configuration = ReasonerConfiguration {
            algorithm: Algorithm::SkolemChase,
            ..Default::default()
        };

        let backend = materialise(&statements, &configuration);
        let outputs = backend.facts_of(&output);
        assert_eq!(outputs.len(), 2);
        assert!(outputs.iter().all(|t| t[2].is_fresh_individual()));
        assert_ne!(outputs[0][2], outputs[1][2]);
    }

    #[test]
    fn max_rounds_interrupts_evaluation() {
        let mut backend = MemoryBackend::new();
        backend.load(&classify(&transitive_closure())).unwrap();
        let configuration = ReasonerConfiguration {
            max_rounds: Some(1),
            ..Default::default()
        };
        assert!(!backend.materialise(&configuration, None).unwrap());
        // resuming reaches the same fixpoint
        assert!(backend.materialise(&ReasonerConfiguration::default(), None).unwrap());
        assert_eq!(backend.facts_of(&pred("path", 2)).len(), 6);
    }

    #[test]
    fn reset_drops_everything() {
        let mut backend = materialise(&transitive_closure(), &ReasonerConfiguration::default());
        backend.reset();
        assert_eq!(backend.fact_count(), 0);
        assert!(backend.facts_of(&pred("edge", 2)).is_empty());
    }
}
