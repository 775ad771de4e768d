//! Result merger: combines per-shard row streams into a single
//! ordered stream per a merge descriptor.

mod compare;
mod descriptor;
mod error;

pub use compare::{compare_rows, compare_value};
pub use descriptor::{AggregateKind, AggregateSpec, MergeDescriptor, OrderKey};
pub use error::Error;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::collections::HashMap;

use crate::value::RawValue;

/// A row, positionally aligned with `MergeDescriptor::columns`.
pub type Row = Vec<RawValue>;

struct HeapEntry<'a> {
    row: &'a Row,
    stream: usize,
    idx: usize,
    order_by: &'a [OrderKey],
}

impl PartialEq for HeapEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for HeapEntry<'_> {}

impl PartialOrd for HeapEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_rows(self.order_by, self.row, other.row)
            .then_with(|| self.stream.cmp(&other.stream))
            .then_with(|| self.idx.cmp(&other.idx))
    }
}

/// K-way merge across shard streams, each already locally ordered by
/// `order_by`. Equal keys preserve shard input order (stable) by
/// tie-breaking on `(stream, idx)`.
pub fn sort_merge(streams: &[Vec<Row>], order_by: &[OrderKey]) -> Vec<Row> {
    let mut heap = BinaryHeap::new();
    for (stream, rows) in streams.iter().enumerate() {
        if let Some(row) = rows.first() {
            heap.push(Reverse(HeapEntry {
                row,
                stream,
                idx: 0,
                order_by,
            }));
        }
    }

    let mut out = Vec::new();
    while let Some(Reverse(entry)) = heap.pop() {
        out.push(entry.row.clone());
        let next_idx = entry.idx + 1;
        if let Some(next_row) = streams[entry.stream].get(next_idx) {
            heap.push(Reverse(HeapEntry {
                row: next_row,
                stream: entry.stream,
                idx: next_idx,
                order_by,
            }));
        }
    }

    out
}

#[derive(Debug, Clone, Default)]
struct AggState {
    count: u64,
    sum: f64,
    min: Option<RawValue>,
    max: Option<RawValue>,
}

impl AggState {
    fn update(&mut self, kind: AggregateKind, value: &RawValue) -> Result<(), Error> {
        match kind {
            AggregateKind::Count => self.count += 1,
            AggregateKind::Sum | AggregateKind::Avg => {
                let n = numeric(value)?;
                self.sum += n;
                self.count += 1;
            }
            AggregateKind::Min => {
                if self
                    .min
                    .as_ref()
                    .map_or(true, |m| compare::compare_value(value, m) == Ordering::Less)
                {
                    self.min = Some(value.clone());
                }
            }
            AggregateKind::Max => {
                if self
                    .max
                    .as_ref()
                    .map_or(true, |m| compare::compare_value(value, m) == Ordering::Greater)
                {
                    self.max = Some(value.clone());
                }
            }
        }
        Ok(())
    }

    fn emit(&self, kind: AggregateKind) -> RawValue {
        match kind {
            AggregateKind::Count => RawValue::I64(self.count as i64),
            AggregateKind::Sum => RawValue::F64(self.sum),
            AggregateKind::Avg => {
                if self.count == 0 {
                    RawValue::Null
                } else {
                    RawValue::F64(self.sum / self.count as f64)
                }
            }
            AggregateKind::Min => self.min.clone().unwrap_or(RawValue::Null),
            AggregateKind::Max => self.max.clone().unwrap_or(RawValue::Null),
        }
    }
}

fn numeric(value: &RawValue) -> Result<f64, Error> {
    match value {
        RawValue::I64(n) => Ok(*n as f64),
        RawValue::I32(n) => Ok(*n as f64),
        RawValue::U64(n) => Ok(*n as f64),
        RawValue::U32(n) => Ok(*n as f64),
        RawValue::F64(n) => Ok(*n),
        RawValue::Str(s) => s
            .parse()
            .map_err(|_| Error::NonNumericAggregate(s.clone())),
        other => Err(Error::NonNumericAggregate(compare::render_value(other))),
    }
}

/// Materialize rows into a keyed accumulator by `group_by` column indices,
/// running `{count, sum, min, max}`/avg per aggregate column; one output row
/// per key, in first-seen order. `Avg` is tracked
/// as a running `(sum, count)` pair and divided at emission, not as a naive
/// running average.
pub fn group_aggregate(
    rows: &[Row],
    group_by: &[usize],
    aggregates: &[AggregateSpec],
) -> Result<Vec<Row>, Error> {
    let mut order = Vec::new();
    let mut groups: HashMap<String, (Row, Vec<AggState>)> = HashMap::new();

    for row in rows {
        let key = group_by
            .iter()
            .map(|&i| compare::render_value(&row[i]))
            .collect::<Vec<_>>()
            .join("\u{1}");

        let entry = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let group_values = group_by.iter().map(|&i| row[i].clone()).collect();
            (group_values, vec![AggState::default(); aggregates.len()])
        });

        for (spec_idx, spec) in aggregates.iter().enumerate() {
            entry.1[spec_idx].update(spec.kind, &row[spec.column])?;
        }
    }

    order
        .into_iter()
        .map(|key| {
            let (group_values, states) = &groups[&key];
            let mut row = group_values.clone();
            for (state, spec) in states.iter().zip(aggregates.iter()) {
                row.push(state.emit(spec.kind));
            }
            Ok(row)
        })
        .collect()
}

fn apply_limit(rows: Vec<Row>, limit: Option<(usize, usize)>) -> Vec<Row> {
    match limit {
        None => rows,
        Some((offset, 0)) => rows.into_iter().skip(offset).collect(),
        Some((offset, count)) => rows.into_iter().skip(offset).take(count).collect(),
    }
}

/// Merge per-shard row streams per the descriptor: sort-only when no
/// grouping/aggregates are configured, otherwise group + aggregate (with a
/// final sort if `order_by` is set); `limit` applies last.
pub fn merge(descriptor: &MergeDescriptor, streams: &[Vec<Row>]) -> Result<Vec<Row>, Error> {
    let rows = if descriptor.group_by.is_empty() && descriptor.aggregates.is_empty() {
        sort_merge(streams, &descriptor.order_by)
    } else {
        let flat: Vec<Row> = streams.iter().flatten().cloned().collect();
        let mut grouped = group_aggregate(&flat, &descriptor.group_by, &descriptor.aggregates)?;
        if !descriptor.order_by.is_empty() {
            grouped.sort_by(|a, b| compare_rows(&descriptor.order_by, a, b));
        }
        grouped
    };

    Ok(apply_limit(rows, descriptor.limit))
}
