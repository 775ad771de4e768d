//! Algorithm factory.
//!
//! Write-once at init, read-only thereafter — pgdog's own algorithm
//! selection is a `match` over a config enum; this factory generalizes that
//! to a string-keyed registry so callers can register custom algorithms.
//! Deliberately not a process-wide singleton: callers construct an explicit
//! `Registry`.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{
    complex_inline::ComplexInlineAlgorithm, hash_mod::HashModAlgorithm,
    hint_inline::HintInlineAlgorithm, inline::InlineAlgorithm, mod_algo::ModAlgorithm,
    range::RangeAlgorithm, Error, ShardingAlgorithm,
};

type Constructor = Arc<dyn Fn(BTreeMap<String, String>) -> Result<Box<dyn ShardingAlgorithm>, Error> + Send + Sync>;

/// Maps algorithm names to constructors. Unknown names are a configuration
/// error raised at router-build time, not at query time.
#[derive(Clone)]
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("algorithms", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: BTreeMap::new(),
        };
        registry.register("inline", |p| Ok(Box::new(InlineAlgorithm::new(p)?)));
        registry.register("mod", |p| Ok(Box::new(ModAlgorithm::new(p)?)));
        registry.register("hash_mod", |p| Ok(Box::new(HashModAlgorithm::new(p)?)));
        registry.register("range", |p| Ok(Box::new(RangeAlgorithm::new(p)?)));
        registry.register("complex_inline", |p| {
            Ok(Box::new(ComplexInlineAlgorithm::new(p)?))
        });
        registry.register("hint_inline", |p| Ok(Box::new(HintInlineAlgorithm::new(p)?)));
        registry
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller-defined algorithm constructor under `name`,
    /// overwriting any existing registration (including built-ins).
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: impl Fn(BTreeMap<String, String>) -> Result<Box<dyn ShardingAlgorithm>, Error>
            + Send
            + Sync
            + 'static,
    ) -> &mut Self {
        self.constructors.insert(name.into(), Arc::new(constructor));
        self
    }

    /// Build an algorithm instance from a configured name and properties.
    /// Unknown names are `Error::UnknownAlgorithm`.
    pub fn build(
        &self,
        name: &str,
        properties: BTreeMap<String, String>,
    ) -> Result<Box<dyn ShardingAlgorithm>, Error> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))?;
        constructor(properties)
    }
}
