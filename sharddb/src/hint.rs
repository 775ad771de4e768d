//! Hint manager: per-call overrides that bypass column-based
//! routing. Lives on the call context only; never persisted, matching
//! pgdog's per-request `Route`/context state rather than any config record.

use crate::splitter::SplitContext;
use crate::value::RawValue;

/// Optional per-invocation routing override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hint {
    /// Forced database-shard value, fed to the db strategy's algorithm in
    /// place of a parser-extracted column binding.
    pub database_sharding_value: Option<RawValue>,

    /// Forced table-shard value, fed to the table strategy's algorithm.
    pub table_sharding_value: Option<RawValue>,

    /// Forces primary routing for this call regardless of statement kind.
    pub master_route_only: bool,
}

impl Hint {
    pub fn is_empty(&self) -> bool {
        self.database_sharding_value.is_none()
            && self.table_sharding_value.is_none()
            && !self.master_route_only
    }
}

/// A hint's `master_route_only` forces primary routing the same way
/// `SplitContext::force_primary` does; callers merge a `Hint` into the
/// splitter's context via this conversion rather than threading the flag
/// through by hand.
impl From<&Hint> for SplitContext {
    fn from(hint: &Hint) -> Self {
        Self {
            force_primary: hint.master_route_only,
            in_transaction: false,
        }
    }
}

/// Builds the `Hint` attached to the next call.
///
/// A thin, explicit builder rather than process-wide state — hints live on
/// the call context only, never persisted.
#[derive(Debug, Default)]
pub struct HintManager {
    pending: Hint,
}

impl HintManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_database_sharding_value(&mut self, value: RawValue) -> &mut Self {
        self.pending.database_sharding_value = Some(value);
        self
    }

    pub fn set_table_sharding_value(&mut self, value: RawValue) -> &mut Self {
        self.pending.table_sharding_value = Some(value);
        self
    }

    pub fn set_master_route_only(&mut self, master_route_only: bool) -> &mut Self {
        self.pending.master_route_only = master_route_only;
        self
    }

    /// Take the accumulated hint for the next call, resetting state.
    pub fn take(&mut self) -> Hint {
        std::mem::take(&mut self.pending)
    }
}
