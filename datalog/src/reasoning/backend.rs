//! The evaluation engine behind a [`Reasoner`](crate::reasoning::Reasoner).

use std::fmt::Debug;
use std::time::Instant;
use shared::{Predicate, Term};
use crate::config::ReasonerConfiguration;
use crate::error::ReasonerResult;
use crate::reasoning::classification::ClassificationResult;

pub trait Backend: Debug {
    /// Replaces whatever the backend holds with the facts, sources and rules of `classification`.
    ///
    /// Data of aliased sources is stored under the alias predicate, primary sources under the
    /// predicate itself.
    fn load(&mut self, classification: &ClassificationResult) -> ReasonerResult<()>;

    /// Applies the loaded rules until a fixpoint is reached or `deadline` passes.
    ///
    /// Returns `true` when the fixpoint was reached. Facts derived before an interruption stay.
    fn materialise(&mut self, configuration: &ReasonerConfiguration, deadline: Option<Instant>) -> ReasonerResult<bool>;

    /// Every tuple currently held for `predicate`, in derivation order.
    fn facts_of(&self, predicate: &Predicate) -> Vec<Vec<Term>>;

    /// Drops all loaded data. The backend can be loaded again afterwards.
    fn reset(&mut self);

    fn close(&mut self);
}
