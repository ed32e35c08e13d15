//! Bottom-up Datalog reasoning over a mutable knowledge base.
//!
//! A [`KnowledgeBase`](knowledge_base::KnowledgeBase) stores facts, rules and data source
//! declarations. A [`Reasoner`](reasoning::Reasoner) classifies its predicates, loads them into a
//! backend and materialises the rules, tracking whether its answers are still correct while the
//! knowledge base keeps changing.

pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod reasoning;

pub use config::{Algorithm, ReasonerConfiguration};
pub use error::{ReasonerError, ReasonerResult};
pub use knowledge_base::{KnowledgeBase, KnowledgeBaseListener};
pub use reasoning::classification::{classify, ClassificationResult, FactSource};
pub use reasoning::query::{Inferences, QueryAnswerCount, QueryAnswers};
pub use reasoning::state::{Correctness, ReasonerState};
pub use reasoning::Reasoner;
