use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("unknown read/write group \"{0}\"")]
    UnknownGroup(String),

    #[error("health check failed for \"{0}\"")]
    HealthCheckFailed(String),
}
