use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Coerce(#[from] crate::value::CoerceError),

    #[error("sharding value isn't valid for column \"{0}\"")]
    InvalidValue(String),

    #[error("algorithm computed target \"{0}\" outside the available target set")]
    TargetNotAvailable(String),

    #[error("division by zero while evaluating expression \"{0}\"")]
    DivisionByZero(String),

    #[error("malformed algorithm expression \"{0}\": {1}")]
    MalformedExpression(String, String),

    #[error("column \"{0}\" has no bound value for this algorithm")]
    MissingColumn(String),

    #[error("malformed range-map entry \"{0}\"")]
    MalformedRangeMap(String),

    #[error("algorithm \"{0}\" requires property \"{1}\"")]
    MissingProperty(String, String),

    #[error("\"{0}\" is not registered as a sharding algorithm")]
    UnknownAlgorithm(String),
}
