use std::cmp::Ordering;

use crate::value::RawValue;

use super::descriptor::OrderKey;
use super::Row;

fn as_f64(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::I64(n) => Some(*n as f64),
        RawValue::I32(n) => Some(*n as f64),
        RawValue::U64(n) => Some(*n as f64),
        RawValue::U32(n) => Some(*n as f64),
        RawValue::F64(n) => Some(*n),
        RawValue::Str(s) => s.parse::<f64>().ok(),
        RawValue::Bool(_) | RawValue::Null => None,
    }
}

/// Canonical string rendering used for mixed-type compares and group keys.
pub fn render_value(value: &RawValue) -> String {
    match value {
        RawValue::I64(n) => n.to_string(),
        RawValue::I32(n) => n.to_string(),
        RawValue::U64(n) => n.to_string(),
        RawValue::U32(n) => n.to_string(),
        RawValue::F64(n) => n.to_string(),
        RawValue::Str(s) => s.clone(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Null => String::new(),
    }
}

/// Type-aware compare: NULL orders before any value; ints/floats compare
/// numerically; strings lexicographically; mixed types fall back to
/// comparing canonical string renderings.
pub fn compare_value(a: &RawValue, b: &RawValue) -> Ordering {
    match (a, b) {
        (RawValue::Null, RawValue::Null) => Ordering::Equal,
        (RawValue::Null, _) => Ordering::Less,
        (_, RawValue::Null) => Ordering::Greater,
        (RawValue::Str(x), RawValue::Str(y)) => x.cmp(y),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => render_value(a).cmp(&render_value(b)),
        },
    }
}

/// Apply each order key in sequence; equal keys fall through to the next.
pub fn compare_rows(order_by: &[OrderKey], a: &Row, b: &Row) -> Ordering {
    for key in order_by {
        let ordering = compare_value(&a[key.column], &b[key.column]);
        let ordering = if key.desc { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_null_orders_before_value() {
        assert_eq!(compare_value(&RawValue::Null, &RawValue::I64(1)), Ordering::Less);
        assert_eq!(compare_value(&RawValue::I64(1), &RawValue::Null), Ordering::Greater);
    }

    #[test]
    fn test_numeric_compare() {
        assert_eq!(compare_value(&RawValue::I64(1), &RawValue::I64(2)), Ordering::Less);
        assert_eq!(compare_value(&RawValue::F64(1.5), &RawValue::I64(1)), Ordering::Greater);
    }

    #[test]
    fn test_string_compare() {
        assert_eq!(
            compare_value(&RawValue::Str("a".into()), &RawValue::Str("b".into())),
            Ordering::Less
        );
    }
}
