//! Parser interface: statement classification and table-reference
//! extraction behind a pluggable capability.

mod error;
mod keyword;
mod statement;

pub use error::Error;
pub use keyword::{extract_literal_bindings, KeywordParser};
pub use statement::{Parser, StatementDescriptor, StatementKind};
