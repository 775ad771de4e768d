//! Read/write splitter: classifies a statement, honors context
//! overrides, and picks a physical data source from a `ReadWriteGroup`.

mod classify;
mod error;

pub use classify::is_write;
pub use error::Error;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::Rng;
use sharddb_config::{Config, LoadBalanceAlgo, ReadWriteGroup};
use tracing::trace;

/// Per-call overrides understood by the splitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitContext {
    pub force_primary: bool,
    pub in_transaction: bool,
}

/// Chooses a physical data source for a statement against a configured
/// `ReadWriteGroup`. Holds one atomic round-robin counter per group, built
/// once at construction.
pub struct Splitter {
    config: Arc<Config>,
    round_robin: HashMap<String, AtomicUsize>,
}

impl std::fmt::Debug for Splitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Splitter")
            .field("groups", &self.config.read_write_groups.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Splitter {
    pub fn new(config: Arc<Config>) -> Self {
        let round_robin = config
            .read_write_groups
            .keys()
            .map(|name| (name.clone(), AtomicUsize::new(0)))
            .collect();
        Self { config, round_robin }
    }

    /// Pick the physical data source for `sql` against `group_name` under
    /// the given context.
    pub fn route(
        &self,
        group_name: &str,
        sql: &str,
        ctx: &SplitContext,
    ) -> Result<String, Error> {
        let group = self.group(group_name)?;

        if ctx.force_primary || ctx.in_transaction {
            trace!(group = group_name, "routing to primary (forced)");
            return Ok(group.primary.clone());
        }

        if is_write(sql) {
            return Ok(group.primary.clone());
        }

        Ok(self.pick_replica(group))
    }

    /// Ping primary then every replica in order; report the first failure.
    pub fn health_check(
        &self,
        group_name: &str,
        mut probe: impl FnMut(&str) -> bool,
    ) -> Result<(), Error> {
        let group = self.group(group_name)?;
        if !probe(&group.primary) {
            return Err(Error::HealthCheckFailed(group.primary.clone()));
        }
        for replica in &group.replicas {
            if !probe(replica) {
                return Err(Error::HealthCheckFailed(replica.clone()));
            }
        }
        Ok(())
    }

    fn group(&self, name: &str) -> Result<&ReadWriteGroup, Error> {
        self.config
            .read_write_groups
            .get(name)
            .ok_or_else(|| Error::UnknownGroup(name.to_string()))
    }

    fn pick_replica(&self, group: &ReadWriteGroup) -> String {
        match group.lb_algo {
            LoadBalanceAlgo::RoundRobin => self.round_robin_pick(group),
            LoadBalanceAlgo::Random => {
                let idx = rand::rng().random_range(0..group.replicas.len());
                group.replicas[idx].clone()
            }
            LoadBalanceAlgo::Weight => {
                let weights = &group.replica_weights;
                let valid = weights.len() == group.replicas.len()
                    && !weights.is_empty()
                    && weights.iter().all(|w| *w > 0.0);
                if !valid {
                    return self.round_robin_pick(group);
                }
                let total: f64 = weights.iter().sum();
                let mut pick = rand::rng().random_range(0.0..total);
                for (idx, weight) in weights.iter().enumerate() {
                    if pick < *weight {
                        return group.replicas[idx].clone();
                    }
                    pick -= *weight;
                }
                group.replicas[weights.len() - 1].clone()
            }
        }
    }

    fn round_robin_pick(&self, group: &ReadWriteGroup) -> String {
        let counter = self
            .round_robin
            .get(&group.name)
            .expect("round-robin counters are built for every configured group");
        let idx = counter.fetch_add(1, Ordering::Relaxed) % group.replicas.len();
        group.replicas[idx].clone()
    }
}
