use std::collections::BTreeMap;

use super::{
    algorithm::{dedup_preserve_order, validate_targets, AlgorithmKind, ShardingAlgorithm},
    Error, ShardingValue,
};

#[derive(Debug, Clone)]
struct Entry {
    lo: i64,
    hi: i64,
    target: String,
}

impl Entry {
    fn contains(&self, v: i64) -> bool {
        v >= self.lo && v <= self.hi
    }

    fn overlaps(&self, start: i64, end: i64) -> bool {
        self.lo <= end && start <= self.hi
    }
}

fn parse_range_map(raw: &str) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    for def in raw.split(',') {
        let def = def.trim();
        if def.is_empty() {
            continue;
        }
        let (bounds, target) = def
            .split_once(':')
            .ok_or_else(|| Error::MalformedRangeMap(def.into()))?;
        let (lo, hi) = bounds
            .split_once('-')
            .ok_or_else(|| Error::MalformedRangeMap(def.into()))?;
        let lo: i64 = lo
            .trim()
            .parse()
            .map_err(|_| Error::MalformedRangeMap(def.into()))?;
        let hi: i64 = hi
            .trim()
            .parse()
            .map_err(|_| Error::MalformedRangeMap(def.into()))?;
        entries.push(Entry {
            lo,
            hi,
            target: target.trim().to_string(),
        });
    }
    if entries.is_empty() {
        return Err(Error::MalformedRangeMap(raw.into()));
    }
    Ok(entries)
}

/// `range-map` of the form `lo1-hi1:target1,lo2-hi2:target2,...`, inclusive
/// on both ends.
#[derive(Debug)]
pub struct RangeAlgorithm {
    entries: Vec<Entry>,
    properties: BTreeMap<String, String>,
}

impl RangeAlgorithm {
    pub fn new(properties: BTreeMap<String, String>) -> Result<Self, Error> {
        let raw = properties
            .get("range-map")
            .ok_or_else(|| Error::MissingProperty("range".into(), "range-map".into()))?;
        let entries = parse_range_map(raw)?;
        Ok(Self {
            entries,
            properties,
        })
    }
}

impl ShardingAlgorithm for RangeAlgorithm {
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
                self.entries
                    .iter()
                    .find(|e| e.contains(v))
                    .map(|e| vec![e.target.clone()])
                    .unwrap_or_default()
            }
            ShardingValue::Enumerated { values, column } => {
                let mut out = Vec::new();
                for value in values {
                    let v = value
                        .as_int()
                        .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                    if let Some(entry) = self.entries.iter().find(|e| e.contains(v)) {
                        out.push(entry.target.clone());
                    }
                }
                dedup_preserve_order(out)
            }
            ShardingValue::Range { lo, hi, column } => {
                let lo = lo
                    .as_int()
                    .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                let hi = hi
                    .as_int()
                    .ok_or_else(|| Error::InvalidValue(column.clone()))?;
                dedup_preserve_order(
                    self.entries
                        .iter()
                        .filter(|e| e.overlaps(lo, hi))
                        .map(|e| e.target.clone())
                        .collect(),
                )
            }
            ShardingValue::Composite { .. } => available_targets.to_vec(),
        };

        validate_targets(available_targets, targets)
    }

    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Range
    }

    fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}
