/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */
pub mod backend;
pub mod classification;
pub mod materialisation;
pub mod query;
pub mod rules;
pub mod state;
pub mod to_dot;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use shared::{Fact, PositiveLiteral, Statement};
use crate::config::{Algorithm, ReasonerConfiguration};
use crate::error::{ReasonerError, ReasonerResult};
use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseListener};
use crate::reasoning::backend::Backend;
use crate::reasoning::classification::{classify, ClassificationResult};
use crate::reasoning::materialisation::MemoryBackend;
use crate::reasoning::query::{matching_tuples, Inferences, QueryAnswerCount, QueryAnswers};
use crate::reasoning::state::{Correctness, ReasonerState};

/// State and correctness, shared with the knowledge base so that edits can downgrade them.
#[derive(Debug)]
struct ReasonerStatus {
    state: Cell<ReasonerState>,
    correctness: Cell<Correctness>,
}

impl ReasonerStatus {
    fn set(&self, state: ReasonerState, correctness: Correctness) {
        self.state.set(state);
        self.correctness.set(correctness);
    }

    fn knowledge_base_changed(&self) {
        match self.state.get() {
            ReasonerState::Loaded | ReasonerState::Materialised => {
                info!("Knowledge base changed after {}, answers may be incorrect", self.state.get());
                self.set(ReasonerState::Changed, Correctness::Incorrect);
            }
            _ => {}
        }
    }
}

impl KnowledgeBaseListener for ReasonerStatus {
    fn on_statement_added(&self, _statement: &Statement) {
        self.knowledge_base_changed();
    }

    fn on_statements_added(&self, _statements: &[Statement]) {
        self.knowledge_base_changed();
    }

    fn on_statement_removed(&self, _statement: &Statement) {
        self.knowledge_base_changed();
    }

    fn on_statements_removed(&self, _statements: &[Statement]) {
        self.knowledge_base_changed();
    }
}

/// Drives a [`Backend`] over a knowledge base and tracks how trustworthy its answers are.
///
/// ```text
/// NOT_LOADED --load--> LOADED --evaluate--> MATERIALISED
///      ^                  |                      |
///      |                  +---- KB edit ---------+--> CHANGED --load--> LOADED
///      +------------- reset (any state but CLOSED)
/// ```
/// `close` is allowed from every state and is final.
#[derive(Debug)]
pub struct Reasoner {
    knowledge_base: Rc<RefCell<KnowledgeBase>>,
    backend: Box<dyn Backend>,
    configuration: ReasonerConfiguration,
    status: Rc<ReasonerStatus>,
    classification: Option<ClassificationResult>,
}

impl Reasoner {
    /// A reasoner with the in-memory backend and default configuration.
    pub fn new(knowledge_base: Rc<RefCell<KnowledgeBase>>) -> Self {
        Self::with_backend(knowledge_base, Box::new(MemoryBackend::new()), ReasonerConfiguration::default())
    }

    pub fn with_configuration(knowledge_base: Rc<RefCell<KnowledgeBase>>, configuration: ReasonerConfiguration) -> Self {
        Self::with_backend(knowledge_base, Box::new(MemoryBackend::new()), configuration)
    }

    /// Registers the reasoner with `knowledge_base`; it must not be borrowed at this point.
    pub fn with_backend(
        knowledge_base: Rc<RefCell<KnowledgeBase>>,
        backend: Box<dyn Backend>,
        configuration: ReasonerConfiguration,
    ) -> Self {
        let status = Rc::new(ReasonerStatus {
            state: Cell::new(ReasonerState::NotLoaded),
            correctness: Cell::new(Correctness::SoundAndComplete),
        });
        knowledge_base.borrow_mut().add_listener(status.clone());
        Self {
            knowledge_base,
            backend,
            configuration,
            status,
            classification: None,
        }
    }

    pub fn state(&self) -> ReasonerState {
        self.status.state.get()
    }

    pub fn correctness(&self) -> Correctness {
        self.status.correctness.get()
    }

    pub fn knowledge_base(&self) -> &Rc<RefCell<KnowledgeBase>> {
        &self.knowledge_base
    }

    pub fn configuration(&self) -> &ReasonerConfiguration {
        &self.configuration
    }

    /// The classification of the last successful load, if it is still in use.
    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    fn ensure_open(&self, operation: &'static str) -> ReasonerResult<()> {
        match self.state() {
            ReasonerState::Closed => Err(ReasonerError::State {
                operation,
                state: ReasonerState::Closed,
            }),
            _ => Ok(()),
        }
    }

    fn ensure_queryable(&self, operation: &'static str) -> ReasonerResult<()> {
        let state = self.state();
        if state.is_queryable() {
            Ok(())
        } else {
            Err(ReasonerError::State { operation, state })
        }
    }

    /// Takes effect at the next evaluation. `None` waits for the fixpoint.
    pub fn set_reasoning_timeout(&mut self, seconds: Option<u64>) -> ReasonerResult<()> {
        self.ensure_open("set the reasoning timeout")?;
        self.configuration.reasoning_timeout_secs = seconds;
        Ok(())
    }

    pub fn set_algorithm(&mut self, algorithm: Algorithm) -> ReasonerResult<()> {
        self.ensure_open("set the algorithm")?;
        self.configuration.algorithm = algorithm;
        Ok(())
    }

    /// Hands the current knowledge base to the backend.
    ///
    /// A no-op in `LOADED` and `MATERIALISED`. On failure the reasoner is back in `NOT_LOADED`.
    pub fn load(&mut self) -> ReasonerResult<()> {
        match self.state() {
            ReasonerState::Closed => Err(ReasonerError::State {
                operation: "load",
                state: ReasonerState::Closed,
            }),
            ReasonerState::Loaded | ReasonerState::Materialised => {
                debug!("Knowledge base already loaded");
                Ok(())
            }
            ReasonerState::NotLoaded | ReasonerState::Changed => self.load_knowledge_base(),
        }
    }

    fn load_knowledge_base(&mut self) -> ReasonerResult<()> {
        self.backend.reset();
        self.classification = None;

        let classification = classify(self.knowledge_base.borrow().statements());
        if let Err(err) = self.backend.load(&classification) {
            warn!("Loading failed: {}", err);
            self.backend.reset();
            self.status.set(ReasonerState::NotLoaded, self.correctness());
            return Err(err);
        }

        let correctness = if classification.has_rules() {
            Correctness::SoundButIncomplete
        } else {
            Correctness::SoundAndComplete
        };
        self.status.set(ReasonerState::Loaded, correctness);
        self.classification = Some(classification);
        info!("Reasoner loaded, correctness {}", correctness);
        Ok(())
    }

    /// Materialises the loaded knowledge base, loading it first when needed.
    ///
    /// Returns `false` when the reasoning timeout interrupted evaluation; the facts derived so
    /// far remain queryable as sound but incomplete answers.
    pub fn evaluate(&mut self) -> ReasonerResult<bool> {
        match self.state() {
            state @ (ReasonerState::Closed | ReasonerState::Changed) => {
                return Err(ReasonerError::State {
                    operation: "evaluate",
                    state,
                })
            }
            ReasonerState::NotLoaded => self.load()?,
            ReasonerState::Loaded | ReasonerState::Materialised => {}
        }

        let deadline = self
            .configuration
            .reasoning_timeout_secs
            // a timeout too large to represent as an instant is no deadline at all
            .and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));
        let completed = self.backend.materialise(&self.configuration, deadline)?;

        let correctness = if completed {
            Correctness::SoundAndComplete
        } else {
            warn!("Evaluation interrupted before reaching a fixpoint");
            Correctness::SoundButIncomplete
        };
        self.status.set(ReasonerState::Materialised, correctness);
        info!("Reasoner materialised, correctness {}", correctness);
        Ok(completed)
    }

    /// Discards everything the backend holds. The next `load` starts from scratch.
    pub fn reset(&mut self) -> ReasonerResult<()> {
        self.ensure_open("reset")?;
        self.backend.reset();
        self.classification = None;
        self.status.state.set(ReasonerState::NotLoaded);
        info!("Reasoner reset");
        Ok(())
    }

    /// Releases the backend and detaches from the knowledge base. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state() == ReasonerState::Closed {
            return;
        }
        self.backend.close();
        self.classification = None;

        let listener: Rc<dyn KnowledgeBaseListener> = self.status.clone();
        match self.knowledge_base.try_borrow_mut() {
            Ok(mut knowledge_base) => {
                knowledge_base.remove_listener(&listener);
            }
            Err(_) => warn!("Knowledge base busy while closing, reasoner stays registered"),
        }

        self.status.state.set(ReasonerState::Closed);
        info!("Reasoner closed");
    }

    /// Facts the reasoner holds for the predicate of `query` that match its terms.
    pub fn answer_query(&self, query: &PositiveLiteral, include_fresh_individuals: bool) -> ReasonerResult<QueryAnswers> {
        self.ensure_queryable("answer a query")?;
        let candidates = self.backend.facts_of(query.predicate());
        let answers = matching_tuples(query, candidates, include_fresh_individuals);
        Ok(QueryAnswers::new(answers, self.correctness()))
    }

    pub fn count_query_answers(&self, query: &PositiveLiteral, include_fresh_individuals: bool) -> ReasonerResult<QueryAnswerCount> {
        self.ensure_queryable("count query answers")?;
        let count = matching_tuples(query, self.backend.facts_of(query.predicate()), include_fresh_individuals).len();
        Ok(QueryAnswerCount {
            count,
            correctness: self.correctness(),
        })
    }

    /// Every fact held for the predicates of the knowledge base; alias predicates stay hidden.
    pub fn inferences(&self) -> ReasonerResult<Inferences> {
        self.ensure_queryable("list inferences")?;
        let predicates = self.knowledge_base.borrow().predicates();

        let mut facts = Vec::new();
        for predicate in predicates {
            for tuple in self.backend.facts_of(&predicate) {
                facts.push(Fact::new(predicate.clone(), tuple)?);
            }
        }
        Ok(Inferences::new(facts, self.correctness()))
    }
}

impl Drop for Reasoner {
    fn drop(&mut self) {
        self.close();
    }
}
