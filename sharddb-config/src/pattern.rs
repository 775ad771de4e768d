//! The actual data-node pattern grammar:
//!
//! ```text
//! path           = ident ( '${' range_or_enum '}' ident? )*
//! range_or_enum  = int '..' int | item (',' item)*
//! ```
//!
//! A `TableRule`'s pattern Cartesian-expands into the universe of concrete
//! `(data_source, physical_table)` pairs it is allowed to route to. A
//! pattern is written as two dot-separated segments, one per data-node
//! dimension (data source, physical table), e.g. `ds_${0..1}.t_order_${0..3}`.

use crate::Error;

/// One `${...}` placeholder resolved to its literal substitution values, in
/// declaration order (the router's tie-breaking relies on this).
#[derive(Debug, Clone, PartialEq)]
enum Enumeration {
    Range(i64, i64),
    Items(Vec<String>),
}

impl Enumeration {
    fn values(&self) -> Vec<String> {
        match self {
            Self::Range(lo, hi) => (*lo..=*hi).map(|v| v.to_string()).collect(),
            Self::Items(items) => items.clone(),
        }
    }
}

fn parse_enumeration(raw: &str) -> Result<Enumeration, Error> {
    let raw = raw.trim();
    if let Some((lo, hi)) = raw.split_once("..") {
        let lo: i64 = lo
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPattern(raw.into(), "bad range start".into()))?;
        let hi: i64 = hi
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPattern(raw.into(), "bad range end".into()))?;
        if hi < lo {
            return Err(Error::InvalidPattern(raw.into(), "empty range".into()));
        }
        Ok(Enumeration::Range(lo, hi))
    } else {
        let items = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if items.is_empty() {
            return Err(Error::InvalidPattern(raw.into(), "empty enumeration".into()));
        }
        Ok(Enumeration::Items(items))
    }
}

/// Expand one segment, e.g. `ds_${0..1}` or `t_order_${0..3}`, into its full
/// set of literal strings (`ds_0`, `ds_1`), preserving declaration order.
fn expand_segment(segment: &str) -> Result<Vec<String>, Error> {
    let mut pieces: Vec<Vec<String>> = Vec::new();
    let mut rest = segment;

    loop {
        match rest.find("${") {
            None => {
                if !rest.is_empty() {
                    pieces.push(vec![rest.to_string()]);
                }
                break;
            }
            Some(start) => {
                if start > 0 {
                    pieces.push(vec![rest[..start].to_string()]);
                }
                let after = &rest[start + 2..];
                let end = after.find('}').ok_or_else(|| {
                    Error::InvalidPattern(segment.into(), "unterminated ${...}".into())
                })?;
                let enumeration = parse_enumeration(&after[..end])?;
                pieces.push(enumeration.values());
                rest = &after[end + 1..];
            }
        }
    }

    if pieces.is_empty() {
        return Err(Error::InvalidPattern(segment.into(), "empty segment".into()));
    }

    // Cartesian product of the literal runs and placeholder expansions,
    // concatenated in declaration order.
    let mut acc = vec![String::new()];
    for piece in pieces {
        let mut next = Vec::with_capacity(acc.len() * piece.len());
        for prefix in &acc {
            for value in &piece {
                next.push(format!("{prefix}{value}"));
            }
        }
        acc = next;
    }

    Ok(acc)
}

/// The universe of `(data_source, physical_table)` pairs a pattern expands
/// to, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataNodeUniverse {
    pub data_sources: Vec<String>,
    pub physical_tables: Vec<String>,
}

impl DataNodeUniverse {
    /// Parse and Cartesian-expand `ds_pattern.table_pattern`.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        let (ds_segment, table_segment) = pattern.split_once('.').ok_or_else(|| {
            Error::InvalidPattern(
                pattern.into(),
                "pattern must have a data-source and table segment separated by '.'".into(),
            )
        })?;

        let data_sources = expand_segment(ds_segment)?;
        let physical_tables = expand_segment(table_segment)?;

        Ok(Self {
            data_sources,
            physical_tables,
        })
    }

    /// All `(data_source, physical_table)` pairs, data-source-major.
    pub fn pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.data_sources.len() * self.physical_tables.len());
        for ds in &self.data_sources {
            for table in &self.physical_tables {
                out.push((ds.clone(), table.clone()));
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty() || self.physical_tables.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_simple_range_pattern() {
        let universe = DataNodeUniverse::parse("ds_${0..1}.t_order_${0..3}").unwrap();
        assert_eq!(universe.data_sources, vec!["ds_0", "ds_1"]);
        assert_eq!(
            universe.physical_tables,
            vec!["t_order_0", "t_order_1", "t_order_2", "t_order_3"]
        );
        assert_eq!(universe.pairs().len(), 8);
    }

    #[test]
    fn test_single_data_source() {
        let universe = DataNodeUniverse::parse("ds_0.t_order_${0..3}").unwrap();
        assert_eq!(universe.data_sources, vec!["ds_0"]);
        assert_eq!(universe.pairs().len(), 4);
    }

    #[test]
    fn test_enumeration_pattern() {
        let universe = DataNodeUniverse::parse("ds_${a,b,c}.t_order_0").unwrap();
        assert_eq!(universe.data_sources, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_placeholder_single_pair() {
        let universe = DataNodeUniverse::parse("ds_0.t_order_0").unwrap();
        assert_eq!(universe.pairs(), vec![("ds_0".into(), "t_order_0".into())]);
    }

    #[test]
    fn test_missing_dot_is_error() {
        assert!(DataNodeUniverse::parse("ds_${0..1}").is_err());
    }

    #[test]
    fn test_reversed_range_is_error() {
        assert!(DataNodeUniverse::parse("ds_${3..0}.t_0").is_err());
    }
}
