//! Small recursive-descent expression evaluator over `int`, `+ − * / %`,
//! parens, and `${ident}` substitution.
//!
//! Used by INLINE, COMPLEX_INLINE, and HINT_INLINE to render an
//! `algorithm-expression` template such as `ds_${value % 2}` or
//! `t_${(user_id % 2) + (order_id % 4)}` into a literal target name, given a
//! map of variable name to integer value.

use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

use super::Error;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
}

fn lex(src: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars> = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                tokens.push(Token::Plus);
                chars.next();
            }
            '-' => {
                tokens.push(Token::Minus);
                chars.next();
            }
            '*' => {
                tokens.push(Token::Star);
                chars.next();
            }
            '/' => {
                tokens.push(Token::Slash);
                chars.next();
            }
            '%' => {
                tokens.push(Token::Percent);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
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
                let value: i64 = num
                    .parse()
                    .map_err(|_| Error::MalformedExpression(src.into(), "bad integer".into()))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(Error::MalformedExpression(
                    src.into(),
                    format!("unexpected character '{other}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    vars: &'a HashMap<String, i64>,
    src: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    // expr = term (('+' | '-') term)*
    fn expr(&mut self) -> Result<i64, Error> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.next();
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.next();
                    value -= self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term = factor (('*' | '/' | '%') factor)*
    fn term(&mut self) -> Result<i64, Error> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.next();
                    value *= self.factor()?;
                }
                Some(Token::Slash) => {
                    self.next();
                    let rhs = self.factor()?;
                    if rhs == 0 {
                        return Err(Error::DivisionByZero(self.src.into()));
                    }
                    value /= rhs;
                }
                Some(Token::Percent) => {
                    self.next();
                    let rhs = self.factor()?;
                    if rhs == 0 {
                        return Err(Error::DivisionByZero(self.src.into()));
                    }
                    value %= rhs;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor = int | ident | '-' factor | '(' expr ')'
    fn factor(&mut self) -> Result<i64, Error> {
        match self.next().cloned() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::Ident(name)) => self
                .vars
                .get(&name)
                .copied()
                .ok_or_else(|| Error::MissingColumn(name)),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    _ => Err(Error::MalformedExpression(
                        self.src.into(),
                        "unmatched '('".into(),
                    )),
                }
            }
            _ => Err(Error::MalformedExpression(
                self.src.into(),
                "unexpected end of expression".into(),
            )),
        }
    }
}

/// Evaluate an arithmetic expression (the text inside one `${...}`) against
/// a map of variable name to value.
pub fn eval(src: &str, vars: &HashMap<String, i64>) -> Result<i64, Error> {
    let tokens = lex(src)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        vars,
        src,
    };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(Error::MalformedExpression(
            src.into(),
            "trailing tokens".into(),
        ));
    }
    Ok(value)
}

/// Render a template such as `ds_${value % 2}` by replacing every `${...}`
/// span with the integer result of evaluating its contents against `vars`.
pub fn render_template(template: &str, vars: &HashMap<String, i64>) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        match rest.find("${") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after = &rest[start + 2..];
                let end = after.find('}').ok_or_else(|| {
                    Error::MalformedExpression(template.into(), "unterminated ${...}".into())
                })?;
                let value = eval(&after[..end], vars)?;
                out.push_str(&value.to_string());
                rest = &after[end + 1..];
            }
        }
    }

    Ok(out)
}
