//! The sharding algorithm capability: a capability set plus a tagged
//! variant, rather than deep inheritance.

use std::collections::BTreeMap;

use super::{Error, ShardingValue};

/// Which of the six algorithm families a configured strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmKind {
    Inline,
    Mod,
    HashMod,
    Range,
    ComplexInline,
    HintInline,
}

/// Shared capability set. Each algorithm is pure: no shared state between
/// calls, and must return a subset of `available_targets`.
pub trait ShardingAlgorithm: std::fmt::Debug + Send + Sync {
    /// Map a sharding value to the subset of `available_targets` it
    /// resolves to, preserving `available_targets`' order.
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &ShardingValue,
    ) -> Result<Vec<String>, Error>;

    fn kind(&self) -> AlgorithmKind;

    fn properties(&self) -> &BTreeMap<String, String>;
}

/// Confirm every target in `computed` is present in `available`, per the
/// "if the computed target is not in that set it is a routing error" rule.
/// Shared by every algorithm so the check lives in one place.
pub(super) fn validate_targets(
    available: &[String],
    computed: Vec<String>,
) -> Result<Vec<String>, Error> {
    for target in &computed {
        if !available.contains(target) {
            return Err(Error::TargetNotAvailable(target.clone()));
        }
    }
    Ok(computed)
}

/// Dedup while preserving first-seen order — callers rely on
/// `available_targets`' input order for tie-breaking.
pub(super) fn dedup_preserve_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}
