//! sharddb: client-side database sharding and read/write-splitting
//! middleware core.
//!
//! Dataflow for one query: [`parser`] classifies the statement and finds
//! its logical tables → [`router`] computes a route set via [`sharding`]
//! algorithms and bound parameters → [`rewrite`] emits one physical SQL per
//! route → [`splitter`] binds each route to a physical data source →
//! [`executor`] dispatches concurrently → [`merger`] combines the streams
//! into a single result. [`hint`] carries per-call routing overrides.
//!
//! Connection pooling, the wire protocol, and full SQL grammars remain
//! external collaborators — this crate owns the routing/rewrite/split/
//! execute/merge pipeline only.

pub mod executor;
pub mod hint;
pub mod merger;
pub mod parser;
pub mod rewrite;
pub mod router;
pub mod sharding;
pub mod splitter;
pub mod value;

pub use sharddb_config::{Config, DataSource as DataSourceConfig, ReadWriteGroup, TableRule};

use thiserror::Error;

/// Aggregates every submodule's error type, the way `sharddb-config::Error`
/// aggregates its own submodule errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Config(#[from] sharddb_config::Error),

    #[error("{0}")]
    Parser(#[from] parser::Error),

    #[error("{0}")]
    Sharding(#[from] sharding::Error),

    #[error("{0}")]
    Router(#[from] router::Error),

    #[error("{0}")]
    Rewrite(#[from] rewrite::Error),

    #[error("{0}")]
    Splitter(#[from] splitter::Error),

    #[error("{0}")]
    Executor(#[from] executor::Error),

    #[error("{0}")]
    Merger(#[from] merger::Error),
}
