/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use indexmap::IndexSet;
use log::trace;
use shared::{Fact, Predicate, Rule, SourceDeclaration, Statement};

/// Receives change notifications from a `KnowledgeBase`.
///
/// Callbacks run synchronously, before the mutating call returns. A listener must not mutate the
/// knowledge base it is registered with; when the knowledge base is shared through a `RefCell`
/// (as the reasoner does) such an attempt fails the borrow instead of corrupting the store.
pub trait KnowledgeBaseListener {
    fn on_statement_added(&self, statement: &Statement);

    /// Only called for non-empty batches.
    fn on_statements_added(&self, statements: &[Statement]);

    fn on_statement_removed(&self, statement: &Statement);

    /// Only called for non-empty batches.
    fn on_statements_removed(&self, statements: &[Statement]);
}

/// An insertion-ordered, deduplicated set of statements with a per-predicate fact index.
#[derive(Default)]
pub struct KnowledgeBase {
    statements: IndexSet<Statement>,
    facts_by_predicate: HashMap<Predicate, IndexSet<Fact>>,
    listeners: Vec<Rc<dyn KnowledgeBaseListener>>,
}

fn same_listener(a: &Rc<dyn KnowledgeBaseListener>, b: &Rc<dyn KnowledgeBaseListener>) -> bool {
    // compare data addresses only, vtable pointers are not guaranteed unique
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Rc<dyn KnowledgeBaseListener>) {
        if !self.listeners.iter().any(|l| same_listener(l, &listener)) {
            self.listeners.push(listener);
        }
    }

    pub fn remove_listener(&mut self, listener: &Rc<dyn KnowledgeBaseListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !same_listener(l, listener));
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Adds a statement. Returns false, and notifies nobody, if it was already present.
    pub fn add_statement(&mut self, statement: impl Into<Statement>) -> bool {
        let statement = statement.into();
        if !self.insert(statement.clone()) {
            return false;
        }
        for listener in &self.listeners {
            listener.on_statement_added(&statement);
        }
        true
    }

    /// Adds several statements and fires one batch event for those that were new.
    /// Returns the number of statements actually added.
    pub fn add_statements<I, S>(&mut self, statements: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<Statement>,
    {
        let mut added = Vec::new();
        for statement in statements {
            let statement = statement.into();
            if self.insert(statement.clone()) {
                added.push(statement);
            }
        }
        if !added.is_empty() {
            for listener in &self.listeners {
                listener.on_statements_added(&added);
            }
        }
        added.len()
    }

    /// Removes a statement. Returns false, and notifies nobody, if it was not present.
    pub fn remove_statement(&mut self, statement: &Statement) -> bool {
        let Some(removed) = self.take(statement) else {
            return false;
        };
        for listener in &self.listeners {
            listener.on_statement_removed(&removed);
        }
        true
    }

    /// Removes several statements and fires one batch event for those that existed.
    /// Returns the number of statements actually removed.
    pub fn remove_statements<'a>(&mut self, statements: impl IntoIterator<Item = &'a Statement>) -> usize {
        let removed: Vec<Statement> = statements
            .into_iter()
            .filter_map(|statement| self.take(statement))
            .collect();
        if !removed.is_empty() {
            for listener in &self.listeners {
                listener.on_statements_removed(&removed);
            }
        }
        removed.len()
    }

    fn insert(&mut self, statement: Statement) -> bool {
        if self.statements.contains(&statement) {
            return false;
        }
        if let Statement::Fact(fact) = &statement {
            self.facts_by_predicate
                .entry(fact.predicate().clone())
                .or_default()
                .insert(fact.clone());
        }
        trace!("Adding statement {}", statement);
        self.statements.insert(statement);
        true
    }

    fn take(&mut self, statement: &Statement) -> Option<Statement> {
        let removed = self.statements.shift_take(statement)?;
        if let Statement::Fact(fact) = &removed {
            if let Some(facts) = self.facts_by_predicate.get_mut(fact.predicate()) {
                facts.shift_remove(fact);
                // If the fact set is now empty, remove the predicate entry.
                if facts.is_empty() {
                    self.facts_by_predicate.remove(fact.predicate());
                }
            }
        }
        trace!("Removed statement {}", removed);
        Some(removed)
    }

    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements, in insertion order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Fact(fact) => Some(fact),
            _ => None,
        })
    }

    pub fn source_declarations(&self) -> impl Iterator<Item = &SourceDeclaration> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::SourceDeclaration(declaration) => Some(declaration),
            _ => None,
        })
    }

    /// Facts over one predicate, in insertion order.
    pub fn facts_of(&self, predicate: &Predicate) -> impl Iterator<Item = &Fact> {
        self.facts_by_predicate
            .get(predicate)
            .into_iter()
            .flat_map(|facts| facts.iter())
    }

    pub fn facts_by_predicate(&self) -> &HashMap<Predicate, IndexSet<Fact>> {
        &self.facts_by_predicate
    }

    /// Predicates with at least one fact, occurring in any rule, or having a source declaration.
    pub fn predicates(&self) -> BTreeSet<Predicate> {
        let mut predicates: BTreeSet<Predicate> = self.facts_by_predicate.keys().cloned().collect();
        for rule in self.rules() {
            predicates.extend(rule.predicates().cloned());
        }
        for declaration in self.source_declarations() {
            predicates.insert(declaration.predicate().clone());
        }
        predicates
    }
}

impl fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("statements", &self.statements)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl fmt::Display for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
