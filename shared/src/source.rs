//! Declarations of external fact sources.
//!
//! A source is an opaque handle. The knowledge base and the classifier only ever look at its
//! identity; reading tuples is left to whichever backend loads it.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use crate::error::{ModelError, ModelResult, SourceError};
use crate::terms::{Predicate, Term};

pub trait DataSource: fmt::Debug + Send + Sync {
    /// Stable identity of the source. Two handles with the same identity are the same source.
    fn identity(&self) -> &str;

    fn read_tuples(&self) -> Result<Vec<Vec<Term>>, SourceError>;
}

/// A source whose tuples are held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDataSource {
    identity: String,
    tuples: Vec<Vec<Term>>,
}

impl InMemoryDataSource {
    pub fn new(name: &str, tuples: Vec<Vec<Term>>) -> ModelResult<Self> {
        for tuple in &tuples {
            if let Some(variable) = tuple.iter().find(|term| term.is_variable()) {
                return Err(ModelError::NonGroundFact {
                    predicate: name.to_string(),
                    variable: variable.to_string(),
                });
            }
        }
        Ok(Self {
            identity: format!("memory:{}", name),
            tuples,
        })
    }
}

impl DataSource for InMemoryDataSource {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn read_tuples(&self) -> Result<Vec<Vec<Term>>, SourceError> {
        Ok(self.tuples.clone())
    }
}

/// Binds a predicate to an external source of facts for it.
#[derive(Debug, Clone)]
pub struct SourceDeclaration {
    predicate: Predicate,
    source: Arc<dyn DataSource>,
}

impl SourceDeclaration {
    pub fn new(predicate: Predicate, source: Arc<dyn DataSource>) -> Self {
        Self { predicate, source }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn source_identity(&self) -> &str {
        self.source.identity()
    }
}

impl PartialEq for SourceDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.predicate == other.predicate && self.source_identity() == other.source_identity()
    }
}

impl Eq for SourceDeclaration {}

impl Hash for SourceDeclaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.predicate.hash(state);
        self.source_identity().hash(state);
    }
}

impl PartialOrd for SourceDeclaration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceDeclaration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.predicate
            .cmp(&other.predicate)
            .then_with(|| self.source_identity().cmp(other.source_identity()))
    }
}

impl Serialize for SourceDeclaration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourceDeclaration", 2)?;
        state.serialize_field("predicate", &self.predicate)?;
        state.serialize_field("source", self.source_identity())?;
        state.end()
    }
}

impl fmt::Display for SourceDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@source {} : <{}> .", self.predicate, self.source_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(name: &str) -> SourceDeclaration {
        let source = InMemoryDataSource::new(name, vec![vec![Term::constant("a").unwrap()]]).unwrap();
        SourceDeclaration::new(Predicate::new("p", 1).unwrap(), Arc::new(source))
    }

    #[test]
    fn equality_follows_source_identity() {
        assert_eq!(declaration("x"), declaration("x"));
        assert_ne!(declaration("x"), declaration("y"));
    }

    #[test]
    fn in_memory_source_rejects_variables() {
        let err = InMemoryDataSource::new("bad", vec![vec![Term::universal("X").unwrap()]]);
        assert!(err.is_err());
    }

    #[test]
    fn serializes_identity_not_contents() {
        let json = serde_json::to_value(declaration("x")).unwrap();
        assert_eq!(json["source"], "memory:x");
        assert_eq!(json["predicate"]["name"], "p");
    }
}
