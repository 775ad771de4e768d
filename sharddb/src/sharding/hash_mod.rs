use std::collections::BTreeMap;

use super::{
    algorithm::{dedup_preserve_order, validate_targets, AlgorithmKind, ShardingAlgorithm},
    Error, ShardingValue,
};

/// Identical to MOD, except the value is rendered as a string and hashed
/// with CRC32 (IEEE polynomial) first. Deterministic across runs and
/// platforms, as required by property 2.
fn hash_index(rendered: &str, count: usize, available_len: usize) -> Option<usize> {
    if available_len == 0 {
        return None;
    }
    let hash = crc32fast::hash(rendered.as_bytes()) as usize;
    let index = hash % count;
    Some(if index >= available_len {
        index % available_len
    } else {
        index
    })
}

#[derive(Debug)]
pub struct HashModAlgorithm {
    count: usize,
    properties: BTreeMap<String, String>,
}

impl HashModAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let count = properties
            .get("sharding-count")
            .ok_or_else(|| Error::MissingProperty("hash_mod".into(), "sharding-count".into()))?
            .parse::<usize>()
            .map_err(|_| Error::MissingProperty("hash_mod".into(), "sharding-count".into()))?;

        if count == 0 {
            return Err(Error::MissingProperty(
                "hash_mod".into(),
                "sharding-count".into(),
            ));
        }

        Ok(Self { count, properties })
    }

    fn shard_one(&self, rendered: &str, available_targets: &[String]) -> Option<String> {
        hash_index(rendered, self.count, available_targets.len()).map(|i| available_targets[i].clone())
    }
}

impl ShardingAlgorithm for HashModAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error> {
        let targets = match value {
            ShardingValue::Single { value, .. } => self
                .shard_one(&value.as_str(), available_targets)
                .into_iter()
                .collect(),
            ShardingValue::Enumerated { values, .. } => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    out.extend(self.shard_one(&value.as_str(), available_targets));
                }
                dedup_preserve_order(out)
            }
            ShardingValue::Range { .. } | ShardingValue::Composite { .. } => {
                available_targets.to_vec()
            }
        };

        validate_targets(available_targets, targets)
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::HashMod
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
