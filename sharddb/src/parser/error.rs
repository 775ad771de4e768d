use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("could not classify statement kind for {0:?}")]
    UnclassifiableStatement(String),
}
