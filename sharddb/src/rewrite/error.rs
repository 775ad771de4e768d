use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("logical table \"{0}\" does not occur in the statement being rewritten")]
    TableNotInStatement(String),
}
