//! Literal decoding for parameter values.
//!
//! Only literal syntax is accepted: numbers, `True`/`False`/`None`, quoted
//! strings and (nested) tuples or lists of those. Nothing is evaluated.

use crate::error::DecodeError;
use logos::{Logos, Span};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Tuple(Vec<Value>),
    List(Vec<Value>),
    None,
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple or list.
    pub fn items(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::None => "None",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the decimal point / exponent so it reads back as a float
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::None => write!(f, "None"),
            Value::Str(s) => {
                write!(f, "\"")?;
                for c in s.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "\"")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Token<'src> {
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    None,

    #[regex(r"[+-]?[0-9]+", |lex| lex.slice())]
    Integer(&'src str),

    #[regex(r"[+-]?[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"[+-]?\.[0-9]+([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"[+-]?[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice())]
    Float(&'src str),

    /// Quoted string, quotes included
    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| lex.slice())]
    Str(&'src str),

    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
}

fn lex(source: &str) -> Result<Vec<(Token<'_>, Span)>, DecodeError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(DecodeError::UnexpectedChar {
                    slice: lexer.slice().to_string(),
                    offset: lexer.span().start,
                });
            }
        }
    }

    Ok(tokens)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token<'src>, Span)>,
    pos: usize,
}

impl<'src> Parser<'src> {
    fn peek(&self) -> Option<&(Token<'src>, Span)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<(Token<'src>, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn unexpected(&self, span: &Span, expected: &'static str) -> DecodeError {
        DecodeError::UnexpectedToken {
            found: self.source[span.clone()].to_string(),
            offset: span.start,
            expected,
        }
    }

    fn value(&mut self) -> Result<Value, DecodeError> {
        let Some((token, span)) = self.next() else {
            return Err(DecodeError::UnexpectedEnd { expected: "a value" });
        };

        match token {
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::None => Ok(Value::None),
            Token::Integer(s) => s
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| DecodeError::IntegerOverflow(s.to_string())),
            Token::Float(s) => s
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| DecodeError::InvalidFloat(s.to_string())),
            Token::Str(s) => Ok(Value::Str(unescape(&s[1..s.len() - 1]))),
            Token::ParenOpen => {
                let (mut items, had_comma) = self.sequence(Token::ParenClose, "')'")?;
                // (x) is grouping, (x,) is a one-tuple
                if items.len() == 1 && !had_comma {
                    Ok(items.remove(0))
                } else {
                    Ok(Value::Tuple(items))
                }
            }
            Token::BracketOpen => {
                let (items, _) = self.sequence(Token::BracketClose, "']'")?;
                Ok(Value::List(items))
            }
            _ => Err(self.unexpected(&span, "a value")),
        }
    }

    fn sequence(
        &mut self,
        close: Token<'src>,
        expected: &'static str,
    ) -> Result<(Vec<Value>, bool), DecodeError> {
        let mut items = Vec::new();
        let mut had_comma = false;

        loop {
            match self.peek() {
                None => return Err(DecodeError::UnexpectedEnd { expected }),
                Some((token, _)) if *token == close => {
                    self.pos += 1;
                    return Ok((items, had_comma));
                }
                Some(_) => {}
            }

            items.push(self.value()?);

            match self.next() {
                Some((Token::Comma, _)) => had_comma = true,
                Some((token, _)) if token == close => return Ok((items, had_comma)),
                Some((_, span)) => return Err(self.unexpected(&span, "',' or a closing bracket")),
                None => return Err(DecodeError::UnexpectedEnd { expected }),
            }
        }
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(q @ ('\\' | '"' | '\'')) => out.push(q),
            // unknown escapes are kept as written
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Decode a single literal.
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut parser = Parser {
        source: text,
        tokens: lex(text)?,
        pos: 0,
    };
    let value = parser.value()?;

    if let Some((_, span)) = parser.peek() {
        return Err(DecodeError::TrailingInput {
            found: text[span.start..].to_string(),
            offset: span.start,
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(decode("42").unwrap(), Value::Int(42));
        assert_eq!(decode("-17").unwrap(), Value::Int(-17));
        assert_eq!(decode("+7").unwrap(), Value::Int(7));
        assert_eq!(decode("0.5").unwrap(), Value::Float(0.5));
        assert_eq!(decode(".5").unwrap(), Value::Float(0.5));
        assert_eq!(decode("1.").unwrap(), Value::Float(1.0));
        assert_eq!(decode("5.67e-8").unwrap(), Value::Float(5.67e-8));
        assert_eq!(decode("1e10").unwrap(), Value::Float(1e10));
        assert_eq!(decode("True").unwrap(), Value::Bool(true));
        assert_eq!(decode("False").unwrap(), Value::Bool(false));
        assert_eq!(decode("None").unwrap(), Value::None);
    }

    #[test]
    fn strings() {
        assert_eq!(decode(r#""sw""#).unwrap(), Value::Str("sw".into()));
        assert_eq!(decode("'CB'").unwrap(), Value::Str("CB".into()));
        assert_eq!(
            decode(r#""sig=(0, 1, 1, 1), alp=0.5""#).unwrap(),
            Value::Str("sig=(0, 1, 1, 1), alp=0.5".into())
        );
        assert_eq!(decode(r#""a\"b\\c\n""#).unwrap(), Value::Str("a\"b\\c\n".into()));
    }

    #[test]
    fn nested_sequences() {
        let value = decode("[[0, -1.0, 1.0, 1]]").unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::List(vec![
                Value::Int(0),
                Value::Float(-1.0),
                Value::Float(1.0),
                Value::Int(1),
            ])])
        );

        assert_eq!(
            decode("(0.5, 0.1)").unwrap(),
            Value::Tuple(vec![Value::Float(0.5), Value::Float(0.1)])
        );
        assert_eq!(decode("()").unwrap(), Value::Tuple(vec![]));
        assert_eq!(decode("(3,)").unwrap(), Value::Tuple(vec![Value::Int(3)]));
        assert_eq!(decode("(3)").unwrap(), Value::Int(3));
        assert_eq!(decode("[1, 2,]").unwrap(), Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn rejects_non_literals() {
        assert_eq!(decode("").unwrap_err(), DecodeError::Empty);
        assert_eq!(decode("   ").unwrap_err(), DecodeError::Empty);
        assert!(matches!(decode("__import__('os')"), Err(DecodeError::UnexpectedChar { .. })));
        assert!(matches!(decode("1 + 2"), Err(DecodeError::UnexpectedChar { .. })));
        assert!(matches!(decode("1 2"), Err(DecodeError::TrailingInput { .. })));
        assert!(matches!(decode("[1, 2"), Err(DecodeError::UnexpectedEnd { .. })));
        assert!(matches!(decode("(,)"), Err(DecodeError::UnexpectedToken { .. })));
        assert!(matches!(decode("[1 2]"), Err(DecodeError::UnexpectedToken { .. })));
        assert!(matches!(
            decode("99999999999999999999"),
            Err(DecodeError::IntegerOverflow(_))
        ));
    }

    #[test]
    fn render_matches_literal_syntax() {
        let value = Value::Tuple(vec![
            Value::Float(0.5),
            Value::List(vec![Value::Int(1), Value::Bool(true), Value::None]),
            Value::Str("x\"y".into()),
        ]);
        assert_eq!(value.to_string(), r#"(0.5, [1, True, None], "x\"y")"#);
        assert_eq!(Value::Tuple(vec![Value::Int(1)]).to_string(), "(1,)");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
    }
}
