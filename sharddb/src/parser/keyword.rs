//! `KeywordParser`: a first-keyword classifier plus a small
//! token scanner for table references, skipping string/quoted-identifier
//! literals. Dependency-light by design — a full grammar (e.g. `pg_query`)
//! is a pluggable alternative behind the same `Parser` trait, the way
//! pgdog layers a fast `Command` classification ahead of its full parser.

use std::iter::Peekable;
use std::str::Chars;

use super::error::Error;
use super::statement::{Parser, StatementDescriptor, StatementKind};
use crate::router::{Binding, BindingMap};
use crate::value::RawValue;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    Num(i64),
    Punct(char),
}

fn tokenize(sql: &str) -> Vec<Tok> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars> = sql.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '\'' => {
                chars.next();
                while let Some(d) = chars.next() {
                    if d == '\'' {
                        if chars.peek() == Some(&'\'') {
                            chars.next();
                            continue;
                        }
                        break;
                    }
                }
            }
            '"' => {
                chars.next();
                let mut ident = String::new();
                while let Some(d) = chars.next() {
                    if d == '"' {
                        break;
                    }
                    ident.push(d);
                }
                tokens.push(Tok::Word(ident));
            }
            c if c.is_ascii_digit() => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Num(num.parse().unwrap_or_default()));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        word.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Tok::Word(word));
            }
            other => {
                tokens.push(Tok::Punct(other));
                chars.next();
            }
        }
    }

    tokens
}

fn classify_kind(tokens: &[Tok]) -> StatementKind {
    let Some(Tok::Word(first)) = tokens.first() else {
        return StatementKind::Other;
    };
    match first.to_ascii_uppercase().as_str() {
        "SELECT" | "WITH" => StatementKind::Select,
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "CREATE" | "DROP" | "ALTER" | "TRUNCATE" => StatementKind::Ddl,
        _ => StatementKind::Other,
    }
}

const TABLE_INTRODUCERS: [&str; 4] = ["FROM", "JOIN", "UPDATE", "INTO"];

fn referenced_tables(tokens: &[Tok]) -> Vec<String> {
    let mut tables = Vec::new();
    for window in tokens.windows(2) {
        if let [Tok::Word(kw), Tok::Word(name)] = window {
            if TABLE_INTRODUCERS.contains(&kw.to_ascii_uppercase().as_str())
                && !tables.contains(name)
            {
                tables.push(name.clone());
            }
        }
    }
    tables
}

const RESERVED: [&str; 4] = ["IN", "BETWEEN", "AND", "WHERE"];

fn referenced_columns(tokens: &[Tok]) -> Vec<String> {
    let mut columns = Vec::new();
    for i in 0..tokens.len() {
        let Tok::Word(word) = &tokens[i] else {
            continue;
        };
        if RESERVED.contains(&word.to_ascii_uppercase().as_str()) {
            continue;
        }
        let next = tokens.get(i + 1);
        let is_predicate = matches!(next, Some(Tok::Punct('=')))
            || matches!(next, Some(Tok::Word(w)) if matches!(w.to_ascii_uppercase().as_str(), "IN" | "BETWEEN"));
        if is_predicate && !columns.contains(word) {
            columns.push(word.clone());
        }
    }
    columns
}

/// Scan simple literal predicates (`col = 1`, `col IN (1,2)`,
/// `col BETWEEN 1 AND 9`) into a `BindingMap`. Only integer literals are
/// recognized; this exists to drive tests and direct-SQL callers, not as a
/// substitute for a caller supplying bind parameters directly.
pub fn extract_literal_bindings(sql: &str) -> BindingMap {
    let tokens = tokenize(sql);
    let mut bindings = BindingMap::new();
    let mut i = 0;
    while i < tokens.len() {
        if let Tok::Word(column) = &tokens[i] {
            if RESERVED.contains(&column.to_ascii_uppercase().as_str()) {
                i += 1;
                continue;
            }
            match tokens.get(i + 1) {
                Some(Tok::Punct('=')) => {
                    if let Some(Tok::Num(n)) = tokens.get(i + 2) {
                        bindings.insert(column.clone(), Binding::Single(RawValue::I64(*n)));
                        i += 3;
                        continue;
                    }
                }
                Some(Tok::Word(w)) if w.eq_ignore_ascii_case("IN") => {
                    let mut values = Vec::new();
                    let mut j = i + 2;
                    if matches!(tokens.get(j), Some(Tok::Punct('('))) {
                        j += 1;
                        while let Some(tok) = tokens.get(j) {
                            match tok {
                                Tok::Num(n) => values.push(RawValue::I64(*n)),
                                Tok::Punct(')') => {
                                    j += 1;
                                    break;
                                }
                                _ => {}
                            }
                            j += 1;
                        }
                        bindings.insert(column.clone(), Binding::Enumerated(values));
                        i = j;
                        continue;
                    }
                }
                Some(Tok::Word(w)) if w.eq_ignore_ascii_case("BETWEEN") => {
                    if let (Some(Tok::Num(lo)), Some(Tok::Word(and)), Some(Tok::Num(hi))) = (
                        tokens.get(i + 2),
                        tokens.get(i + 3),
                        tokens.get(i + 4),
                    ) {
                        if and.eq_ignore_ascii_case("AND") {
                            bindings.insert(
                                column.clone(),
                                Binding::Range(RawValue::I64(*lo), RawValue::I64(*hi)),
                            );
                            i += 5;
                            continue;
                        }
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    bindings
}

/// Default `Parser` implementation: reliable keyword classification and
/// syntactic table-name discovery, without a full SQL grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordParser;

impl KeywordParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for KeywordParser {
    type Error = Error;

    fn parse(&self, sql: &str) -> Result<StatementDescriptor, Self::Error> {
        let tokens = tokenize(sql);
        if tokens.is_empty() {
            return Err(Error::UnclassifiableStatement(sql.to_string()));
        }
        Ok(StatementDescriptor {
            kind: classify_kind(&tokens),
            referenced_tables: referenced_tables(&tokens),
            referenced_columns: referenced_columns(&tokens),
            statement_subtree: None,
        })
    }
}
