pub mod error;
pub mod terms;
pub mod literal;
pub mod rule;
pub mod rule_index;
pub mod source;
pub mod statement;

pub use error::{ModelError, ModelResult, SourceError};
pub use literal::{Fact, Literal, LiteralKind, PositiveLiteral};
pub use rule::{Conjunction, Rule};
pub use source::{DataSource, InMemoryDataSource, SourceDeclaration};
pub use statement::Statement;
pub use terms::{Predicate, Term};
