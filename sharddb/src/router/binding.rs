use std::collections::BTreeMap;

use crate::value::RawValue;

/// A column's bound value(s), as extracted by the parser from a single
/// statement: a point value, an `IN (...)` list, or a `BETWEEN` range.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Single(RawValue),
    Enumerated(Vec<RawValue>),
    Range(RawValue, RawValue),
}

/// The column-value bindings available to the router for one statement.
pub type BindingMap = BTreeMap<String, Binding>;
