//! Dynamic value coercion.
//!
//! Source binds are untyped; algorithms need either an integer or a string
//! to shard on. This module is the single place that normalizes a bound
//! value, so algorithms stay pure and testable.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("floating point values are not valid sharding keys")]
    Float,

    #[error("unsupported bound value type")]
    Unsupported,
}

/// A bound value, normalized to one of the two shapes sharding algorithms
/// operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coerced {
    Int(i64),
    Str(String),
}

impl Coerced {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Str(s) => s.parse().ok(),
        }
    }

    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Int(v) => std::borrow::Cow::Owned(v.to_string()),
            Self::Str(s) => std::borrow::Cow::Borrowed(s),
        }
    }
}

/// A heterogeneous bound value as received from the caller, prior to
/// coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    I64(i64),
    I32(i32),
    U64(u64),
    U32(u32),
    F64(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// Coerce a raw bound value into the normalized int/string shape.
///
/// Recognizes signed/unsigned integers and numeric strings; rejects floats
/// (per, the coercer has well-defined error returns for unsupported
/// types rather than silently truncating).
pub fn coerce(value: &RawValue) -> Result<Coerced, CoerceError> {
    match value {
        RawValue::I64(v) => Ok(Coerced::Int(*v)),
        RawValue::I32(v) => Ok(Coerced::Int(*v as i64)),
        RawValue::U64(v) => Ok(Coerced::Int(*v as i64)),
        RawValue::U32(v) => Ok(Coerced::Int(*v as i64)),
        RawValue::F64(_) => Err(CoerceError::Float),
        RawValue::Str(s) => {
            if let Ok(i) = s.parse::<i64>() {
                Ok(Coerced::Int(i))
            } else {
                Ok(Coerced::Str(s.clone()))
            }
        }
        RawValue::Bool(_) | RawValue::Null => Err(CoerceError::Unsupported),
    }
}
