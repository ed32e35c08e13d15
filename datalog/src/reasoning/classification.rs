/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Splits the predicates of a knowledge base into given (EDB) and derived (IDB) ones.
//!
//! A bottom-up evaluator needs every predicate to be one or the other. Knowledge bases are free
//! to mix local facts, several source declarations and rule heads over one predicate, so every
//! source that cannot stay the single primary source of its predicate is moved to a fresh alias
//! predicate and routed back through a bridging rule `p(X1..Xn) :- alias(X1..Xn)`.
//!
//! Classification is a fold over the statements in insertion order. A rule seen late can demote
//! a primary source registered earlier; the fold keeps that registration in `edb` until then.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use log::debug;
use serde::{Serialize, Serializer};
use shared::{Fact, Predicate, Rule, SourceDeclaration, Statement};

/// Where the tuples of a predicate come from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FactSource {
    /// The facts stated directly in the knowledge base for this predicate.
    LocalFacts(Predicate),
    Declared(SourceDeclaration),
}

impl FactSource {
    pub fn predicate(&self) -> &Predicate {
        match self {
            FactSource::LocalFacts(predicate) => predicate,
            FactSource::Declared(declaration) => declaration.predicate(),
        }
    }
}

impl fmt::Display for FactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactSource::LocalFacts(predicate) => write!(f, "local facts of {}", predicate),
            FactSource::Declared(declaration) => {
                write!(f, "<{}> for {}", declaration.source_identity(), declaration.predicate())
            }
        }
    }
}

fn as_pairs<K, V, S>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    K: Serialize,
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.iter())
}

/// What the backend is handed on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Primary source of each predicate that kept exactly one clean source.
    #[serde(serialize_with = "as_pairs")]
    edb: BTreeMap<Predicate, FactSource>,
    idb: BTreeSet<Predicate>,
    /// Predicates forced out of single-source status.
    aliased_predicates: BTreeSet<Predicate>,
    #[serde(serialize_with = "as_pairs")]
    aliased_sources: BTreeMap<FactSource, Predicate>,
    bridging_rules: Vec<Rule>,
    /// Facts stated directly in the knowledge base, kept whatever name they are routed through.
    #[serde(serialize_with = "as_pairs")]
    direct_facts: BTreeMap<Predicate, Vec<Fact>>,
    rules: Vec<Rule>,
}

impl ClassificationResult {
    pub fn edb(&self) -> &BTreeMap<Predicate, FactSource> {
        &self.edb
    }

    pub fn idb(&self) -> &BTreeSet<Predicate> {
        &self.idb
    }

    pub fn aliased_predicates(&self) -> &BTreeSet<Predicate> {
        &self.aliased_predicates
    }

    pub fn aliased_sources(&self) -> &BTreeMap<FactSource, Predicate> {
        &self.aliased_sources
    }

    pub fn direct_facts(&self) -> &BTreeMap<Predicate, Vec<Fact>> {
        &self.direct_facts
    }

    pub fn bridging_rules(&self) -> &[Rule] {
        &self.bridging_rules
    }

    /// The rules of the knowledge base, in insertion order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Knowledge base rules followed by bridging rules.
    pub fn all_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().chain(self.bridging_rules.iter())
    }

    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty() || !self.bridging_rules.is_empty()
    }

    pub fn is_edb(&self, predicate: &Predicate) -> bool {
        self.edb.contains_key(predicate)
    }

    pub fn is_idb(&self, predicate: &Predicate) -> bool {
        self.idb.contains(predicate)
    }

    pub fn is_alias(&self, predicate: &Predicate) -> bool {
        self.aliased_sources.values().any(|alias| alias == predicate)
    }

    pub fn primary_source(&self, predicate: &Predicate) -> Option<&FactSource> {
        self.edb.get(predicate)
    }

    pub fn alias_of_source(&self, declaration: &SourceDeclaration) -> Option<&Predicate> {
        self.aliased_sources
            .get(&FactSource::Declared(declaration.clone()))
    }

    pub fn alias_of_local_facts(&self, predicate: &Predicate) -> Option<&Predicate> {
        self.aliased_sources
            .get(&FactSource::LocalFacts(predicate.clone()))
    }

    /// The name under which the backend accepts the direct facts of `predicate`.
    ///
    /// That is the predicate itself while it keeps a primary source, and the alias of its local
    /// facts otherwise. `None` when neither exists.
    pub fn get_alias<'a>(&'a self, predicate: &'a Predicate) -> Option<&'a Predicate> {
        if self.edb.contains_key(predicate) {
            Some(predicate)
        } else {
            self.alias_of_local_facts(predicate)
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Classifies the statements of a knowledge base, in the given order.
///
/// Never fails: every combination of facts, sources and rule heads over a predicate is resolved
/// through aliasing.
pub fn classify<'a>(statements: impl IntoIterator<Item = &'a Statement>) -> ClassificationResult {
    let statements: Vec<&Statement> = statements.into_iter().collect();
    let mut classifier = Classifier::new(&statements);
    for statement in statements {
        classifier.process(statement);
    }
    debug!(
        "Classified {} EDB, {} IDB predicates with {} bridging rules",
        classifier.result.edb.len(),
        classifier.result.idb.len(),
        classifier.result.bridging_rules.len()
    );
    classifier.result
}

struct Classifier {
    result: ClassificationResult,
    // alias names must not clash with anything the knowledge base or this run already uses
    taken_names: HashSet<String>,
    declared_alias_counts: HashMap<Predicate, usize>,
}

impl Classifier {
    fn new(statements: &[&Statement]) -> Self {
        let taken_names = statements
            .iter()
            .flat_map(|statement| statement.predicates())
            .map(|predicate| predicate.name().to_string())
            .collect();
        Self {
            result: ClassificationResult::default(),
            taken_names,
            declared_alias_counts: HashMap::new(),
        }
    }

    fn process(&mut self, statement: &Statement) {
        match statement {
            Statement::Fact(fact) => {
                let predicate = fact.predicate().clone();
                self.register_source(FactSource::LocalFacts(predicate.clone()));
                self.result
                    .direct_facts
                    .entry(predicate)
                    .or_default()
                    .push(fact.clone());
            }
            Statement::SourceDeclaration(declaration) => {
                self.register_source(FactSource::Declared(declaration.clone()));
            }
            Statement::Rule(rule) => {
                for predicate in rule.head_predicates() {
                    if self.result.idb.contains(predicate) {
                        continue;
                    }
                    if let Some(primary) = self.result.edb.remove(predicate) {
                        debug!("Rule head demotes primary source {}", primary);
                        self.add_alias(primary);
                    }
                    self.result.idb.insert(predicate.clone());
                }
                self.result.rules.push(rule.clone());
            }
        }
    }

    fn register_source(&mut self, source: FactSource) {
        let predicate = source.predicate().clone();
        if self.result.idb.contains(&predicate) || self.result.aliased_predicates.contains(&predicate) {
            self.add_alias(source);
            return;
        }

        let same_as_primary = self.result.edb.get(&predicate).map(|primary| *primary == source);
        match same_as_primary {
            None => {
                debug!("Registering {} as primary source", source);
                self.result.edb.insert(predicate, source);
            }
            Some(true) => {}
            Some(false) => {
                if let Some(primary) = self.result.edb.remove(&predicate) {
                    self.add_alias(primary);
                }
                self.add_alias(source);
                self.result.aliased_predicates.insert(predicate);
            }
        }
    }

    fn add_alias(&mut self, source: FactSource) {
        if self.result.aliased_sources.contains_key(&source) {
            return;
        }
        let origin = source.predicate().clone();
        let alias = self.fresh_alias(&source);
        debug!("Aliasing {} as {}", source, alias);

        self.result.bridging_rules.push(Rule::bridging(&origin, &alias));
        self.result.aliased_predicates.insert(origin);
        self.result.aliased_sources.insert(source, alias);
    }

    fn fresh_alias(&mut self, source: &FactSource) -> Predicate {
        let origin = source.predicate();
        let suffix = match source {
            FactSource::LocalFacts(_) => "#local".to_string(),
            FactSource::Declared(_) => {
                let count = self.declared_alias_counts.entry(origin.clone()).or_insert(0);
                let suffix = format!("#source{}", count);
                *count += 1;
                suffix
            }
        };

        let mut candidate = suffix.clone();
        let mut attempt = 1;
        while self.taken_names.contains(&format!("{}{}", origin.name(), candidate)) {
            candidate = format!("{}_{}", suffix, attempt);
            attempt += 1;
        }

        let alias = origin.with_suffix(&candidate);
        self.taken_names.insert(alias.name().to_string());
        alias
    }
}
