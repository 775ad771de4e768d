use thiserror::Error;

/// Configuration errors. All are fatal and raised at construction time.
#[derive(Debug, Error)]
pub enum Error {
    #[error("data source \"{0}\" referenced but not defined")]
    UnknownDataSource(String),

    #[error("algorithm \"{0}\" is not registered")]
    UnknownAlgorithm(String),

    #[error("invalid data-node pattern \"{0}\": {1}")]
    InvalidPattern(String, String),

    #[error("table rule \"{0}\" expands to an empty target set")]
    EmptyTargetSet(String),

    #[error("read/write group \"{0}\" must have at least one replica")]
    NoReplicas(String),

    #[error("invalid sharding algorithm properties: {0}")]
    InvalidProperties(String),

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
