use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named handle to a physical backend.
///
/// Created at init from configuration, probed once by the collaborator
/// behind the `DataSource` capability, and held for the process lifetime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// Unique name used to reference this backend from `ReadWriteGroup`s and
    /// `TableRule` data-node patterns.
    pub name: String,

    /// Driver identifier (e.g. `postgres`, `mysql`). Opaque to the core;
    /// interpreted by the connection-management collaborator.
    pub driver: String,

    /// Connection URL for the backend.
    pub url: String,

    /// Maximum idle connections held open.
    #[serde(default = "DataSource::default_max_idle")]
    pub max_idle: u32,

    /// Maximum open connections.
    #[serde(default = "DataSource::default_max_open")]
    pub max_open: u32,

    /// Relative weight used by the `weight` load-balance policy when this
    /// data source is a replica member of a `ReadWriteGroup`. Defaults to an
    /// equal share; ignored for the primary.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl DataSource {
    fn default_max_idle() -> u32 {
        2
    }

    fn default_max_open() -> u32 {
        10
    }
}

/// Load-balance policy for a `ReadWriteGroup`'s replica set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceAlgo {
    #[default]
    RoundRobin,
    Random,
    Weight,
}

impl std::str::FromStr for LoadBalanceAlgo {
    type Err = std::convert::Infallible;

    /// Unknown identifiers fall back to `round_robin`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "random" => Self::Random,
            "weight" => Self::Weight,
            _ => Self::RoundRobin,
        })
    }
}

/// A named logical backend composed of one primary and one or more replicas.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadWriteGroup {
    pub name: String,
    /// Name of the primary `DataSource`.
    pub primary: String,
    /// Names of replica `DataSource`s. Must be non-empty.
    pub replicas: Vec<String>,
    #[serde(default, rename = "lb_algo")]
    pub lb_algo: LoadBalanceAlgo,
    /// Positional weights for `replicas`, used by the `weight` policy.
    /// Defaults to an equal share of all replicas.
    #[serde(default)]
    pub replica_weights: Vec<f64>,
}

impl ReadWriteGroup {
    /// Resolve the weight vector, defaulting to uniform if unset or any
    /// weight is non-positive.
    pub fn resolved_weights(&self) -> Vec<f64> {
        let valid = self.replica_weights.len() == self.replicas.len()
            && self.replica_weights.iter().all(|w| *w > 0.0)
            && !self.replica_weights.is_empty();

        if valid {
            self.replica_weights.clone()
        } else {
            vec![1.0; self.replicas.len()]
        }
    }
}
