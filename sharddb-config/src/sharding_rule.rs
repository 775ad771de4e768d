use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{pattern::DataNodeUniverse, Error};

/// A sharding strategy: which column(s) feed the algorithm, which algorithm,
/// and its opaque, algorithm-specific properties.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ShardingStrategy {
    /// Sharding column, for single-column algorithms (INLINE, MOD,
    /// HASH_MOD, RANGE, HINT_INLINE).
    #[serde(default)]
    pub column: Option<String>,

    /// Sharding columns, for COMPLEX_INLINE.
    #[serde(default)]
    pub columns: Vec<String>,

    /// Algorithm name, resolved against the `Registry` at router-build time.
    pub algo: String,

    /// Algorithm-specific properties, e.g. `algorithm-expression`,
    /// `sharding-count`, `range-map`.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

/// For each logical table, the actual data-node pattern plus the optional
/// database- and table-sharding strategies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TableRule {
    /// e.g. `ds_${0..1}.t_order_${0..3}`.
    pub actual_data_nodes: String,

    /// Strategy for choosing the data source.
    #[serde(default)]
    pub db_strategy: Option<ShardingStrategy>,

    /// Strategy for choosing the physical table.
    #[serde(default)]
    pub tbl_strategy: Option<ShardingStrategy>,
}

impl TableRule {
    /// Expand and validate the data-node universe (invariant (ii)).
    pub fn universe(&self, table_name: &str) -> Result<DataNodeUniverse, Error> {
        let universe = DataNodeUniverse::parse(&self.actual_data_nodes)?;
        if universe.is_empty() {
            return Err(Error::EmptyTargetSet(table_name.into()));
        }
        Ok(universe)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_table_rule_universe() {
        let rule = TableRule {
            actual_data_nodes: "ds_0.t_order_${0..3}".into(),
            db_strategy: None,
            tbl_strategy: Some(ShardingStrategy {
                column: Some("order_id".into()),
                columns: vec![],
                algo: "mod".into(),
                properties: BTreeMap::from([("sharding-count".into(), "4".into())]),
            }),
        };
        let universe = rule.universe("t_order").unwrap();
        assert_eq!(universe.physical_tables.len(), 4);
    }
}
