//! Configuration record for the sharddb core.
//!
//! This crate owns only the in-memory, immutable-after-construction
//! configuration record: `DataSource` map, `ReadWriteGroup` map, and
//! `TableRule` map. Loading from files or the environment, and physical
//! connection management, live outside the core.

mod data_source;
mod error;
mod pattern;
mod sharding_rule;

pub use data_source::{DataSource, LoadBalanceAlgo, ReadWriteGroup};
pub use error::Error;
pub use pattern::DataNodeUniverse;
pub use sharding_rule::{ShardingStrategy, TableRule};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The immutable configuration for a sharddb deployment: a `DataSource` map,
/// a `ReadWriteGroup` map, and a `TableRules` map.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub data_sources: BTreeMap<String, DataSource>,

    #[serde(default)]
    pub read_write_groups: BTreeMap<String, ReadWriteGroup>,

    #[serde(default)]
    pub sharding_rule: ShardingRule,

    /// Read/write group used for statements that reference no configured
    /// logical table. Falls back to the first configured group if unset.
    #[serde(default)]
    pub default_group: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ShardingRule {
    #[serde(default)]
    pub tables: BTreeMap<String, TableRule>,
}

impl Config {
    /// Parse and fully validate a configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, Error> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and fully validate a configuration from a TOML file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Enforce the referential-integrity invariants below. Called once at
    /// construction; violations are fatal `ConfigError`s.
    pub fn validate(&self) -> Result<(), Error> {
        // (i) every DataSource referenced by a ReadWriteGroup must exist.
        for group in self.read_write_groups.values() {
            if !self.data_sources.contains_key(&group.primary) {
                return Err(Error::UnknownDataSource(group.primary.clone()));
            }
            if group.replicas.is_empty() {
                return Err(Error::NoReplicas(group.name.clone()));
            }
            for replica in &group.replicas {
                if !self.data_sources.contains_key(replica) {
                    return Err(Error::UnknownDataSource(replica.clone()));
                }
            }
        }

        // (i), (ii) every TableRule's data-node pattern must resolve to
        // known data sources and a non-empty target set.
        for (name, rule) in &self.sharding_rule.tables {
            let universe = rule.universe(name)?;
            for ds in &universe.data_sources {
                if !self.data_sources.contains_key(ds) && !self.read_write_groups.contains_key(ds)
                {
                    return Err(Error::UnknownDataSource(ds.clone()));
                }
            }
        }

        debug!(
            data_sources = self.data_sources.len(),
            groups = self.read_write_groups.len(),
            tables = self.sharding_rule.tables.len(),
            "configuration validated"
        );

        Ok(())
    }

    pub fn table_rule(&self, logical_table: &str) -> Option<&TableRule> {
        self.sharding_rule.tables.get(logical_table)
    }
}
