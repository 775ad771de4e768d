//! SQL rewriter: substitutes logical→physical table names per route,
//! identifier-boundary aware so it never touches string literals, quoted
//! identifiers, or longer identifiers sharing the logical table as a
//! substring — mirroring the care pgdog's rewrite engine takes with
//! literals. Parameter order passes through unchanged.

mod error;

pub use error::Error;

use crate::{router::RouteResult, value::RawValue};

/// Input to one rewrite: original SQL, the logical tables it references,
/// the routes chosen for them, and the caller's parameter slice.
#[derive(Debug, Clone)]
pub struct RewriteContext<'a> {
    pub original_sql: &'a str,
    pub logical_tables: &'a [String],
    pub routes: &'a [RouteResult],
    pub parameters: &'a [RawValue],
}

/// One physical statement to dispatch: target data source, rewritten SQL,
/// and the parameters to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteResult {
    pub data_source: String,
    pub sql: String,
    pub parameters: Vec<RawValue>,
}

fn skip_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    i += 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            i += 1;
            if i < bytes.len() && bytes[i] == quote {
                i += 1;
                continue;
            }
            break;
        }
        i += 1;
    }
    i
}

fn contains_identifier(sql: &str, ident: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(bytes, i, b'\''),
            b'"' => i = skip_quoted(bytes, i, b'"'),
            b if (b as char).is_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() {
                    let d = bytes[i] as char;
                    if d.is_alphanumeric() || d == '_' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                if &sql[start..i] == ident {
                    return true;
                }
            }
            _ => i += 1,
        }
    }
    false
}

/// Substitute every identifier-boundary occurrence of `from` with `to`,
/// leaving string literals and quoted identifiers untouched.
pub fn substitute_identifier(sql: &str, from: &str, to: &str) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => {
                let start = i;
                i = skip_quoted(bytes, i, b'\'');
                out.push_str(&sql[start..i]);
            }
            b'"' => {
                let start = i;
                i = skip_quoted(bytes, i, b'"');
                out.push_str(&sql[start..i]);
            }
            b if (b as char).is_alphabetic() || b == b'_' => {
                let start = i;
                while i < bytes.len() {
                    let d = bytes[i] as char;
                    if d.is_alphanumeric() || d == '_' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let word = &sql[start..i];
                out.push_str(if word == from { to } else { word });
            }
            other => {
                out.push(other as char);
                i += 1;
            }
        }
    }
    out
}

/// Emit one rewritten SQL per route, substituting every logical table with
/// the physical table chosen for that route.
pub fn rewrite(ctx: &RewriteContext) -> Result<Vec<RewriteResult>, Error> {
    for table in ctx.logical_tables {
        if !contains_identifier(ctx.original_sql, table) {
            return Err(Error::TableNotInStatement(table.clone()));
        }
    }

    Ok(ctx
        .routes
        .iter()
        .map(|route| {
            let mut sql = ctx.original_sql.to_string();
            for table in ctx.logical_tables {
                sql = substitute_identifier(&sql, table, &route.physical_table);
            }
            RewriteResult {
                data_source: route.data_source.clone(),
                sql,
                parameters: ctx.parameters.to_vec(),
            }
        })
        .collect())
}
