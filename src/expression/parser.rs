//! Recursive-descent parser producing the expression AST.
//!
//! Precedence, lowest first: statement sequence (`;`), assignment, conditional,
//! `||`, `&&`, equality, relational, additive, multiplicative, unary, member/index.

use serde_json::Value as Json;

use super::EvalError;
use super::lexer::{Token, TokenKind, tokenize};
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Le,
    Gt,
    Ge,
    LooseEq,
    LooseNe,
    StrictEq,
    StrictNe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Json),
    Undefined,
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Assign(String, Box<Expr>),
    Sequence(Vec<Expr>),
}

pub(crate) fn parse(source: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        index: 0,
        source_len: source.len(),
    };
    let expr = parser.parse_sequence()?;
    if let Some(token) = parser.peek() {
        return Err(EvalError::Syntax {
            message: "unexpected trailing input".to_string(),
            position: token.position,
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
    source_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_op(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_op(op))
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.peek_op(op) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn position(&self) -> usize {
        self.peek().map_or(self.source_len, |t| t.position)
    }

    fn expect_op(&mut self, op: &str) -> Result<(), EvalError> {
        if self.eat_op(op) {
            Ok(())
        } else {
            Err(EvalError::Syntax {
                message: format!("expected '{op}'"),
                position: self.position(),
            })
        }
    }

    /// `a; b; c` evaluates all statements and yields the last value.
    /// Empty statements (`a;;` or a trailing `;`) are allowed.
    fn parse_sequence(&mut self) -> Result<Expr, EvalError> {
        let mut statements = Vec::new();
        loop {
            while self.eat_op(";") {}
            if self.peek().is_none() {
                break;
            }
            statements.push(self.parse_assignment()?);
            if !self.peek_op(";") {
                break;
            }
        }

        match statements.len() {
            0 => Err(EvalError::Syntax {
                message: "empty expression".to_string(),
                position: 0,
            }),
            1 => Ok(statements.remove(0)),
            _ => Ok(Expr::Sequence(statements)),
        }
    }

    fn parse_assignment(&mut self) -> Result<Expr, EvalError> {
        let position = self.position();
        let target = self.parse_conditional()?;
        if !self.eat_op("=") {
            return Ok(target);
        }

        match target {
            Expr::Ident(name) => {
                let value = self.parse_assignment()?;
                Ok(Expr::Assign(name, Box::new(value)))
            }
            _ => Err(EvalError::Unsupported {
                construct: format!("assignment to a non-identifier target at {position}"),
            }),
        }
    }

    fn parse_conditional(&mut self) -> Result<Expr, EvalError> {
        let test = self.parse_or()?;
        if !self.eat_op("?") {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect_op(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Expr::Conditional(Box::new(test), Box::new(consequent), Box::new(alternate)))
    }

    fn parse_or(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_and()?;
        while self.eat_op("||") {
            let right = self.parse_and()?;
            left = Expr::Logical(LogicalOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_equality()?;
        while self.eat_op("&&") {
            let right = self.parse_equality()?;
            left = Expr::Logical(LogicalOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = if self.eat_op("===") {
                BinaryOp::StrictEq
            } else if self.eat_op("!==") {
                BinaryOp::StrictNe
            } else if self.eat_op("==") {
                BinaryOp::LooseEq
            } else if self.eat_op("!=") {
                BinaryOp::LooseNe
            } else {
                return Ok(left);
            };
            let right = self.parse_relational()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = if self.eat_op("<=") {
                BinaryOp::Le
            } else if self.eat_op(">=") {
                BinaryOp::Ge
            } else if self.eat_op("<") {
                BinaryOp::Lt
            } else if self.eat_op(">") {
                BinaryOp::Gt
            } else {
                return Ok(left);
            };
            let right = self.parse_additive()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = if self.eat_op("+") {
                BinaryOp::Add
            } else if self.eat_op("-") {
                BinaryOp::Sub
            } else {
                return Ok(left);
            };
            let right = self.parse_multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = if self.eat_op("*") {
                BinaryOp::Mul
            } else if self.eat_op("/") {
                BinaryOp::Div
            } else if self.eat_op("%") {
                BinaryOp::Rem
            } else {
                return Ok(left);
            };
            let right = self.parse_unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        let op = if self.eat_op("!") {
            UnaryOp::Not
        } else if self.eat_op("-") {
            UnaryOp::Neg
        } else if self.eat_op("+") {
            UnaryOp::Plus
        } else {
            return self.parse_postfix();
        };
        let operand = self.parse_unary()?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn parse_postfix(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat_op(".") {
                let position = self.position();
                match self.next_kind() {
                    Some(TokenKind::Ident(name)) => expr = Expr::Member(Box::new(expr), name),
                    _ => {
                        return Err(EvalError::Syntax {
                            message: "expected property name after '.'".to_string(),
                            position,
                        });
                    }
                }
            } else if self.eat_op("[") {
                let key = self.parse_assignment()?;
                self.expect_op("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(key));
            } else if self.peek_op("(") {
                return Err(EvalError::Unsupported {
                    construct: format!("function call at {}", self.position()),
                });
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        let position = self.position();
        let Some(kind) = self.next_kind() else {
            return Err(EvalError::Syntax {
                message: "unexpected end of expression".to_string(),
                position,
            });
        };

        match kind {
            TokenKind::Number(n) => Ok(Expr::Literal(Value::number(n).map_or(Json::Null, Value::into_json))),
            TokenKind::Str(s) => Ok(Expr::Literal(Json::String(s))),
            TokenKind::Ident(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Json::Bool(true)),
                "false" => Expr::Literal(Json::Bool(false)),
                "null" => Expr::Literal(Json::Null),
                "undefined" => Expr::Undefined,
                _ => Expr::Ident(name),
            }),
            TokenKind::Op("(") => {
                let inner = self.parse_assignment()?;
                self.expect_op(")")?;
                Ok(inner)
            }
            TokenKind::Op("[") => self.parse_array(),
            TokenKind::Op("{") => self.parse_object(),
            TokenKind::Op(op) => Err(EvalError::Syntax {
                message: format!("unexpected '{op}'"),
                position,
            }),
        }
    }

    fn parse_array(&mut self) -> Result<Expr, EvalError> {
        let mut items = Vec::new();
        while !self.eat_op("]") {
            items.push(self.parse_assignment()?);
            if !self.eat_op(",") {
                self.expect_op("]")?;
                break;
            }
        }
        Ok(Expr::Array(items))
    }

    fn parse_object(&mut self) -> Result<Expr, EvalError> {
        let mut entries = Vec::new();
        while !self.eat_op("}") {
            let position = self.position();
            let key = match self.next_kind() {
                Some(TokenKind::Ident(name) | TokenKind::Str(name)) => name,
                Some(TokenKind::Number(n)) => Value::number(n).map_or_else(|| n.to_string(), |v| v.to_text()),
                _ => {
                    return Err(EvalError::Syntax {
                        message: "expected property key".to_string(),
                        position,
                    });
                }
            };
            self.expect_op(":")?;
            entries.push((key, self.parse_assignment()?));
            if !self.eat_op(",") {
                self.expect_op("}")?;
                break;
            }
        }
        Ok(Expr::Object(entries))
    }

    fn next_kind(&mut self) -> Option<TokenKind> {
        let token = self.tokens.get(self.index)?.kind.clone();
        self.index += 1;
        Some(token)
    }
}
