use std::fmt;
use serde::Serialize;
use crate::error::{ModelError, ModelResult};

/// A predicate is identified by its name and its arity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Predicate {
    name: String,
    arity: usize,
}

impl Predicate {
    pub fn new(name: impl Into<String>, arity: usize) -> ModelResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::BlankPredicateName);
        }
        if arity == 0 {
            return Err(ModelError::ZeroArity { name });
        }
        Ok(Self { name, arity })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// A predicate of the same arity whose name is this name followed by `suffix`.
    pub fn with_suffix(&self, suffix: &str) -> Predicate {
        Predicate {
            name: format!("{}{}", self.name, suffix),
            arity: self.arity,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.arity)
    }
}

// Logic part: terms of literals
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Term {
    UniversalVariable(String),
    ExistentialVariable(String),
    AbstractConstant(String),
    DatatypeConstant { value: String, datatype: String },
    LanguageStringConstant { string: String, language: String },
    /// An anonymous individual introduced for an existential variable (a named null).
    FreshIndividual(String),
}

fn non_blank(name: impl Into<String>) -> ModelResult<String> {
    let name = name.into();
    if name.trim().is_empty() {
        Err(ModelError::BlankTermName)
    } else {
        Ok(name)
    }
}

impl Term {
    pub fn universal(name: impl Into<String>) -> ModelResult<Self> {
        non_blank(name).map(Term::UniversalVariable)
    }

    pub fn existential(name: impl Into<String>) -> ModelResult<Self> {
        non_blank(name).map(Term::ExistentialVariable)
    }

    pub fn constant(name: impl Into<String>) -> ModelResult<Self> {
        non_blank(name).map(Term::AbstractConstant)
    }

    pub fn datatype_constant(value: impl Into<String>, datatype: impl Into<String>) -> ModelResult<Self> {
        Ok(Term::DatatypeConstant {
            value: value.into(),
            datatype: non_blank(datatype)?,
        })
    }

    pub fn language_string(string: impl Into<String>, language: impl Into<String>) -> ModelResult<Self> {
        Ok(Term::LanguageStringConstant {
            string: string.into(),
            language: non_blank(language)?,
        })
    }

    pub fn fresh_individual(name: impl Into<String>) -> ModelResult<Self> {
        non_blank(name).map(Term::FreshIndividual)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::UniversalVariable(_) | Term::ExistentialVariable(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Term::AbstractConstant(_) | Term::DatatypeConstant { .. } | Term::LanguageStringConstant { .. }
        )
    }

    pub fn is_fresh_individual(&self) -> bool {
        matches!(self, Term::FreshIndividual(_))
    }

    /// The lexical name of the term; for datatype and language constants this is the lexical value.
    pub fn name(&self) -> &str {
        match self {
            Term::UniversalVariable(name)
            | Term::ExistentialVariable(name)
            | Term::AbstractConstant(name)
            | Term::FreshIndividual(name) => name,
            Term::DatatypeConstant { value, .. } => value,
            Term::LanguageStringConstant { string, .. } => string,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::UniversalVariable(name) => write!(f, "?{}", name),
            Term::ExistentialVariable(name) => write!(f, "!{}", name),
            Term::AbstractConstant(name) => write!(f, "{}", name),
            Term::DatatypeConstant { value, datatype } => write!(f, "\"{}\"^^<{}>", value, datatype),
            Term::LanguageStringConstant { string, language } => write!(f, "\"{}\"@{}", string, language),
            Term::FreshIndividual(name) => write!(f, "_:{}", name),
        }
    }
}
