//! Parser for rule condition expressions.
//!
//! Conditions are small boolean expressions over dotted data paths, e.g.
//! `documents.passport == "uploaded" && payment.amount >= 100`. The flow
//! stage only needs to know that a condition is syntactically well formed;
//! evaluation happens elsewhere in the product. The grammar, loosest
//! binding first:
//!
//! ```text
//! expr     := or
//! or       := and ( ("||" | "or") and )*
//! and      := unary ( ("&&" | "and") unary )*
//! unary    := ("!" | "not") unary | atom
//! atom     := "(" or ")" | operand cmp operand
//! cmp      := "==" | "!=" | ">" | ">=" | "<" | "<="
//! operand  := path | number | string | "true" | "false"
//! ```
//!
//! A bare operand is not a condition: the top level must be a comparison
//! or a boolean combination of comparisons.

use crate::error::ConditionError;

/// Parsed form of a condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum CondExpr {
    Or(Box<CondExpr>, Box<CondExpr>),
    And(Box<CondExpr>, Box<CondExpr>),
    Not(Box<CondExpr>),
    Compare {
        op: CompareOp,
        lhs: Operand,
        rhs: Operand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// A leaf of a comparison: a dotted data path or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Path(String),
    Number(f64),
    Str(String),
    Bool(bool),
}

/// Parses a condition string, returning its AST or the first syntax error.
pub fn parse_condition(input: &str) -> Result<CondExpr, ConditionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some((token, offset)) = parser.peek() {
        // A stray closing paren reads better as an unexpected token.
        if matches!(token, Token::RParen) {
            return Err(ConditionError::UnexpectedToken {
                offset: *offset,
                found: ")".to_string(),
                expected: "end of expression",
            });
        }
        return Err(ConditionError::TrailingInput { offset: *offset });
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Path(String),
    Number(f64),
    Str(String),
    Bool(bool),
    Cmp(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Path(p) => p.clone(),
            Token::Number(n) => n.to_string(),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Bool(b) => b.to_string(),
            Token::Cmp(op) => op.symbol().to_string(),
            Token::And => "&&".to_string(),
            Token::Or => "||".to_string(),
            Token::Not => "!".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ConditionError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, c)| c);
        match c {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '(' => {
                tokens.push((Token::LParen, offset));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, offset));
                i += 1;
            }
            '&' if next == Some('&') => {
                tokens.push((Token::And, offset));
                i += 2;
            }
            '|' if next == Some('|') => {
                tokens.push((Token::Or, offset));
                i += 2;
            }
            '=' if next == Some('=') => {
                tokens.push((Token::Cmp(CompareOp::Eq), offset));
                i += 2;
            }
            '&' | '|' | '=' => {
                return Err(ConditionError::UnexpectedChar { offset, ch: c });
            }
            '!' => {
                if next == Some('=') {
                    tokens.push((Token::Cmp(CompareOp::Ne), offset));
                    i += 2;
                } else {
                    tokens.push((Token::Not, offset));
                    i += 1;
                }
            }
            '>' => {
                if next == Some('=') {
                    tokens.push((Token::Cmp(CompareOp::Ge), offset));
                    i += 2;
                } else {
                    tokens.push((Token::Cmp(CompareOp::Gt), offset));
                    i += 1;
                }
            }
            '<' => {
                if next == Some('=') {
                    tokens.push((Token::Cmp(CompareOp::Le), offset));
                    i += 2;
                } else {
                    tokens.push((Token::Cmp(CompareOp::Lt), offset));
                    i += 1;
                }
            }
            '"' | '\'' => {
                let quote = c;
                let start = offset;
                i += 1;
                let mut value = String::new();
                loop {
                    match chars.get(i) {
                        None => {
                            return Err(ConditionError::UnterminatedString { offset: start });
                        }
                        Some(&(_, ch)) if ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(&(_, ch)) => {
                            value.push(ch);
                            i += 1;
                        }
                    }
                }
                tokens.push((Token::Str(value), start));
            }
            _ if c.is_ascii_digit() || c == '-' => {
                let start = offset;
                i += 1;
                while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
                    i += 1;
                }
                let end = chars.get(i).map_or(input.len(), |&(o, _)| o);
                let literal = &input[start..end];
                let value: f64 = literal.parse().map_err(|_| ConditionError::InvalidNumber {
                    offset: start,
                    literal: literal.to_string(),
                })?;
                tokens.push((Token::Number(value), start));
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let start = offset;
                while i < chars.len() {
                    let ch = chars[i].1;
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let end = chars.get(i).map_or(input.len(), |&(o, _)| o);
                let word = &input[start..end];
                let token = match word {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Path(word.to_string()),
                };
                tokens.push((token, start));
            }
            _ => return Err(ConditionError::UnexpectedChar { offset, ch: c }),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<CondExpr, ConditionError> {
        let mut lhs = self.parse_and()?;
        while matches!(self.peek(), Some((Token::Or, _))) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = CondExpr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<CondExpr, ConditionError> {
        let mut lhs = self.parse_unary()?;
        while matches!(self.peek(), Some((Token::And, _))) {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = CondExpr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<CondExpr, ConditionError> {
        if matches!(self.peek(), Some((Token::Not, _))) {
            self.advance();
            let inner = self.parse_unary()?;
            return Ok(CondExpr::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<CondExpr, ConditionError> {
        if matches!(self.peek(), Some((Token::LParen, _))) {
            self.advance();
            let inner = self.parse_or()?;
            return match self.advance() {
                Some((Token::RParen, _)) => Ok(inner),
                Some((token, offset)) => Err(ConditionError::UnexpectedToken {
                    offset,
                    found: token.describe(),
                    expected: "')'",
                }),
                None => Err(ConditionError::UnexpectedEnd { expected: "')'" }),
            };
        }

        let lhs = self.parse_operand()?;
        let op = match self.advance() {
            Some((Token::Cmp(op), _)) => op,
            Some((token, offset)) => {
                return Err(ConditionError::UnexpectedToken {
                    offset,
                    found: token.describe(),
                    expected: "a comparison operator",
                });
            }
            None => {
                return Err(ConditionError::UnexpectedEnd {
                    expected: "a comparison operator",
                });
            }
        };
        let rhs = self.parse_operand()?;
        Ok(CondExpr::Compare { op, lhs, rhs })
    }

    fn parse_operand(&mut self) -> Result<Operand, ConditionError> {
        match self.advance() {
            Some((Token::Path(p), _)) => Ok(Operand::Path(p)),
            Some((Token::Number(n), _)) => Ok(Operand::Number(n)),
            Some((Token::Str(s), _)) => Ok(Operand::Str(s)),
            Some((Token::Bool(b), _)) => Ok(Operand::Bool(b)),
            Some((token, offset)) => Err(ConditionError::UnexpectedToken {
                offset,
                found: token.describe(),
                expected: "an operand",
            }),
            None => Err(ConditionError::UnexpectedEnd {
                expected: "an operand",
            }),
        }
    }
}
