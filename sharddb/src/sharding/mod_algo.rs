use std::collections::BTreeMap;

use super::{
    algorithm::{dedup_preserve_order, validate_targets, AlgorithmKind, ShardingAlgorithm},
    Error, ShardingValue,
};

/// `index = |v| mod N`; if `index >= available_targets.len()` it wraps by
/// `mod available_targets.len()`.
fn mod_index(v: i64, count: usize, available_len: usize) -> Option<usize> {
    if available_len == 0 {
        return None;
    }
    let index = (v.unsigned_abs() as usize) % count;
    Some(if index >= available_len {
        index % available_len
    } else {
        index
    })
}

#[derive(Debug)]
pub struct ModAlgorithm {
    count: usize,
    properties: BTreeMap<String, String>,
}

impl ModAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let count = properties
            .get("sharding-count")
            .ok_or_else(|| Error::MissingProperty("mod".into(), "sharding-count".into()))?
            .parse::<usize>()
            .map_err(|_| Error::MissingProperty("mod".into(), "sharding-count".into()))?;

        if count == 0 {
            return Err(Error::MissingProperty("mod".into(), "sharding-count".into()));
        }

        Ok(Self { count, properties })
    }

    fn shard_one(&self, v: i64, available_targets: &[String]) -> Option<String> {
        mod_index(v, self.count, available_targets.len()).map(|i| available_targets[i].clone())
    }
}

impl ShardingAlgorithm for ModAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error> {
        let targets = match value {
            ShardingValue::Single { value, column } => {
                let v = value
                    .as_int()
                    .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                self.shard_one(v, available_targets).into_iter().collect()
            }
            ShardingValue::Enumerated { values, column } => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    let v = value
                        .as_int()
                        .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                    out.extend(self.shard_one(v, available_targets));
                }
                dedup_preserve_order(out)
            }
            // MOD has no notion of a contiguous range; a range bind
            // broadcasts to every available target.
            ShardingValue::Range { .. } | ShardingValue::Composite { .. } => {
                available_targets.to_vec()
            }
        };

        validate_targets(available_targets, targets)
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Mod
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::value::Coerced;

    fn targets(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("t_{i}")).collect()
    }

    #[test]
    fn test_mod_basic() {
        let algo = ModAlgorithm::new(BTreeMap::from([("sharding-count".into(), "4".into())]))
            .unwrap();
        let result = algo
            .do_sharding(
                &targets(4),
                &ShardingValue::Single {
                    column: "order_id".into(),
                    value: Coerced::Int(123),
                },
            )
            .unwrap();
        assert_eq!(result, vec!["t_3"]);
    }

    #[test]
    fn test_mod_negative_value_takes_absolute_value() {
        // -123 mod 4 == 3 per the documented semantics.
        let algo = ModAlgorithm::new(BTreeMap::from([("sharding-count".into(), "4".into())]))
            .unwrap();
        let result = algo
            .do_sharding(
                &targets(4),
                &ShardingValue::Single {
                    column: "order_id".into(),
                    value: Coerced::Int(-123),
                },
            )
            .unwrap();
        assert_eq!(result, vec!["t_3"]);
    }

    #[test]
    fn test_mod_periodicity_property() {
        // target(v) == target(v + N) for any integer v.
        let algo = ModAlgorithm::new(BTreeMap::from([("sharding-count".into(), "4".into())]))
            .unwrap();
        for v in -20i64..20 {
            let a = algo
                .do_sharding(
                    &targets(4),
                    &ShardingValue::Single {
                        column: "c".into(),
                        value: Coerced::Int(v),
                    },
                )
                .unwrap();
            let b = algo
                .do_sharding(
                    &targets(4),
                    &ShardingValue::Single {
                        column: "c".into(),
                        value: Coerced::Int(v + 4),
                    },
                )
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_mod_in_list_dedup() {
        let algo = ModAlgorithm::new(BTreeMap::from([("sharding-count".into(), "4".into())]))
            .unwrap();
        let result = algo
            .do_sharding(
                &targets(4),
                &ShardingValue::Enumerated {
                    column: "order_id".into(),
                    values: vec![
                        Coerced::Int(1),
                        Coerced::Int(2),
                        Coerced::Int(5),
                        Coerced::Int(9),
                    ],
                },
            )
            .unwrap();
        assert_eq!(result, vec!["t_1", "t_2"]);
    }

    #[test]
    fn test_mod_wraps_when_count_exceeds_targets() {
        let algo = ModAlgorithm::new(BTreeMap::from([("sharding-count".into(), "8".into())]))
            .unwrap();
        // 5 mod 8 = 5, which is out of range for 4 targets, wraps to 5 % 4 = 1.
        let result = algo
            .do_sharding(
                &targets(4),
                &ShardingValue::Single {
                    column: "c".into(),
                    value: Coerced::Int(5),
                },
            )
            .unwrap();
        assert_eq!(result, vec!["t_1"]);
    }

    #[test]
    fn test_mod_missing_property_errors() {
        assert!(ModAlgorithm::new(BTreeMap::new()).is_err());
    }
}
