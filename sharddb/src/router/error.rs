use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] sharddb_config::Error),

    #[error("{0}")]
    Sharding(#[from] crate::sharding::Error),

    #[error("unknown logical table \"{0}\"")]
    UnknownTable(String),

    #[error("routing \"{0}\" produced an empty route set")]
    EmptyRoute(String),
}
