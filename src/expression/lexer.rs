//! Tokenizer for template expressions.

use super::EvalError;

/// Operators and punctuation, longest first so that `===` wins over `==` and `=`.
const OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "<", ">", "+", "-", "*", "/", "%", "!", "=",
    "?", ":", ".", ",", "(", ")", "[", "]", "{", "}", ";",
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Str(String),
    Ident(String),
    Op(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset into the source
    pub position: usize,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Op(o) if o == op)
    }
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit()
            || (c == '.' && source[position + 1..].starts_with(|n: char| n.is_ascii_digit()))
        {
            let end = scan_number(source, position);
            let text = &source[position..end];
            let value = text.parse::<f64>().map_err(|_| EvalError::Syntax {
                message: format!("invalid number '{text}'"),
                position,
            })?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position,
            });
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }
            continue;
        }

        if is_ident_start(c) {
            let mut end = position;
            while let Some(&(i, ch)) = chars.peek() {
                if !is_ident_part(ch) {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Ident(source[position..end].to_string()),
                position,
            });
            continue;
        }

        if c == '\'' || c == '"' {
            chars.next();
            let value = scan_string(&mut chars, c, position)?;
            tokens.push(Token {
                kind: TokenKind::Str(value),
                position,
            });
            continue;
        }

        let rest = &source[position..];
        let Some(op) = OPERATORS.iter().copied().find(|op| rest.starts_with(*op)) else {
            return Err(EvalError::Syntax {
                message: format!("unexpected character '{c}'"),
                position,
            });
        };
        for _ in 0..op.len() {
            chars.next();
        }
        tokens.push(Token {
            kind: TokenKind::Op(op),
            position,
        });
    }

    Ok(tokens)
}

fn scan_number(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut end = start;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while end < bytes.len() {
        let b = bytes[end];
        if b.is_ascii_digit() {
            end += 1;
        } else if b == b'.' && !seen_dot && !seen_exp {
            seen_dot = true;
            end += 1;
        } else if (b == b'e' || b == b'E') && !seen_exp {
            let mut next = end + 1;
            if next < bytes.len() && (bytes[next] == b'+' || bytes[next] == b'-') {
                next += 1;
            }
            if next < bytes.len() && bytes[next].is_ascii_digit() {
                seen_exp = true;
                end = next;
            } else {
                break;
            }
        } else {
            break;
        }
    }

    end
}

fn scan_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> Result<String, EvalError> {
    let mut value = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            c if c == quote => return Ok(value),
            '\\' => {
                let Some((_, escaped)) = chars.next() else {
                    break;
                };
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            }
            other => value.push(other),
        }
    }

    Err(EvalError::Syntax {
        message: "unterminated string literal".to_string(),
        position: start,
    })
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
