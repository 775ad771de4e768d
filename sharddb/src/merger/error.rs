use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("aggregate requires a numeric value, got \"{0}\"")]
    NonNumericAggregate(String),
}
