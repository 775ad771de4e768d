//! The router: turns a logical table name plus column-value bindings
//! into a set of concrete `(data_source, physical_table)` targets.

mod binding;
mod error;

pub use binding::{Binding, BindingMap};
pub use error::Error;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use sharddb_config::{Config, ShardingStrategy};
use tracing::{debug, trace};

use crate::{
    hint::Hint,
    sharding::{Registry, ShardingAlgorithm, ShardingValue},
    value::{coerce, RawValue},
};

/// `(data_source, physical_table)` chosen for a logical table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteResult {
    pub data_source: String,
    pub physical_table: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Database,
    Table,
}

/// Resolves a `ShardingStrategy` against a binding map (and optional hint
/// override) into a `ShardingValue`, or `None` if no value applies and the
/// dimension should broadcast.
fn sharding_value(
    strategy: &ShardingStrategy,
    binding_map: &BindingMap,
    hint_value: Option<&RawValue>,
) -> Result<Option<ShardingValue>, Error> {
    if !strategy.columns.is_empty() {
        let mut values = std::collections::BTreeMap::new();
        for column in &strategy.columns {
            let binding = match binding_map.get(column) {
                Some(Binding::Single(v)) => v,
                _ => return Ok(None),
            };
            values.insert(column.clone(), coerce(binding).map_err(crate::sharding::Error::from)?);
        }
        return Ok(Some(ShardingValue::Composite {
            columns: strategy.columns.clone(),
            values,
        }));
    }

    let Some(column) = &strategy.column else {
        return Ok(None);
    };

    if let Some(hint_value) = hint_value {
        let value = coerce(hint_value).map_err(crate::sharding::Error::from)?;
        return Ok(Some(ShardingValue::Single {
            column: column.clone(),
            value,
        }));
    }

    let value = match binding_map.get(column) {
        Some(Binding::Single(v)) => ShardingValue::Single {
            column: column.clone(),
            value: coerce(v).map_err(crate::sharding::Error::from)?,
        },
        Some(Binding::Enumerated(vs)) => ShardingValue::Enumerated {
            column: column.clone(),
            values: vs
                .iter()
                .map(coerce)
                .collect::<Result<Vec<_>, _>>()
                .map_err(crate::sharding::Error::from)?,
        },
        Some(Binding::Range(lo, hi)) => ShardingValue::Range {
            column: column.clone(),
            lo: coerce(lo).map_err(crate::sharding::Error::from)?,
            hi: coerce(hi).map_err(crate::sharding::Error::from)?,
        },
        None => return Ok(None),
    };

    Ok(Some(value))
}

/// Orchestrates sharding algorithms per logical table to produce the final
/// route set. Built once from a `Config`; every strategy's algorithm is
/// resolved and cached at construction, so unknown algorithm names are a
/// configuration error raised here, not at query time (invariant (iii)).
pub struct Router {
    config: Arc<Config>,
    algorithms: BTreeMap<(String, Dimension), Box<dyn ShardingAlgorithm>>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("tables", &self.config.sharding_rule.tables.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Router {
    pub fn new(config: Arc<Config>, registry: &Registry) -> Result<Self, Error> {
        let mut algorithms = BTreeMap::new();

        for (table, rule) in &config.sharding_rule.tables {
            if let Some(strategy) = &rule.db_strategy {
                let algo = registry.build(&strategy.algo, strategy.properties.clone())?;
                algorithms.insert((table.clone(), Dimension::Database), algo);
            }
            if let Some(strategy) = &rule.tbl_strategy {
                let algo = registry.build(&strategy.algo, strategy.properties.clone())?;
                algorithms.insert((table.clone(), Dimension::Table), algo);
            }
        }

        debug!(tables = config.sharding_rule.tables.len(), "router built");

        Ok(Self { config, algorithms })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `route(logical_table, binding_map) -> list<RouteResult>`.
    pub fn route(
        &self,
        logical_table: &str,
        binding_map: &BindingMap,
        hint: Option<&Hint>,
    ) -> Result<Vec<RouteResult>, Error> {
        let rule = self
            .config
            .table_rule(logical_table)
            .ok_or_else(|| Error::UnknownTable(logical_table.into()))?;

        let universe = rule.universe(logical_table)?;
        let pairs = universe.pairs();

        let surviving_ds: HashSet<String> = match (
            &rule.db_strategy,
            self.algorithms.get(&(logical_table.to_string(), Dimension::Database)),
        ) {
            (Some(strategy), Some(algo)) => {
                match sharding_value(
                    strategy,
                    binding_map,
                    hint.and_then(|h| h.database_sharding_value.as_ref()),
                )? {
                    Some(value) => algo
                        .do_sharding(&universe.data_sources, &value)?
                        .into_iter()
                        .collect(),
                    None => universe.data_sources.iter().cloned().collect(),
                }
            }
            _ => universe.data_sources.iter().cloned().collect(),
        };

        let surviving_tables: HashSet<String> = match (
            &rule.tbl_strategy,
            self.algorithms.get(&(logical_table.to_string(), Dimension::Table)),
        ) {
            (Some(strategy), Some(algo)) => {
                match sharding_value(
                    strategy,
                    binding_map,
                    hint.and_then(|h| h.table_sharding_value.as_ref()),
                )? {
                    Some(value) => algo
                        .do_sharding(&universe.physical_tables, &value)?
                        .into_iter()
                        .collect(),
                    None => universe.physical_tables.iter().cloned().collect(),
                }
            }
            _ => universe.physical_tables.iter().cloned().collect(),
        };

        // Determinism: walk the universe in its declared order rather than
        // any algorithm's internal order.
        let routes: Vec<RouteResult> = pairs
            .into_iter()
            .filter(|(ds, table)| surviving_ds.contains(ds) && surviving_tables.contains(table))
            .map(|(data_source, physical_table)| RouteResult {
                data_source,
                physical_table,
            })
            .collect();

        if routes.is_empty() {
            return Err(Error::EmptyRoute(logical_table.into()));
        }

        trace!(logical_table, routes = routes.len(), "routed");

        Ok(routes)
    }
}
