//! Parser for rig scripts
//!
//! A small Pratt parser: statements are dispatched on their leading keyword,
//! expressions climb operator binding powers.

pub mod ast;

use crate::script::lexer::tokens::{Token, TokenKind};
use crate::script::span::{Position, Span};
use ast::{BinOp, Expr, Program, Stmt, StmtKind, UnOp};

/// Parse error
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected {found} at {position}")]
    UnexpectedToken { found: String, position: Position },
    #[error("expected {expected}, found {found} at {position}")]
    Expected {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Binding power of prefix `-` and `!`.
const UNARY_BP: u8 = 13;
/// Binding power of calls, indexing and field access.
const POSTFIX_BP: u8 = 14;

/// Parse a token stream into a program.
pub fn parse(tokens: &[Token]) -> Result<Program, ParseError> {
    if tokens.is_empty() {
        return Ok(Program::default());
    }

    let mut parser = Parser::new(tokens);
    let mut stmts = Vec::new();
    while !parser.at_eof() {
        stmts.push(parser.parse_stmt()?);
    }
    Ok(Program { stmts })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)].kind
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn at_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.at(kind) {
            Ok(self.bump().span)
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span), ParseError> {
        match &self.current().kind {
            TokenKind::Ident(_) => {
                let token = self.bump();
                match token.kind {
                    TokenKind::Ident(name) => Ok((name, token.span)),
                    _ => unreachable!(),
                }
            }
            _ => Err(self.expected(what)),
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        if self.at_eof() {
            ParseError::UnexpectedEof
        } else {
            ParseError::Expected {
                expected: what.to_string(),
                found: self.current().kind.describe(),
                position: self.current().span.start,
            }
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match &self.current().kind {
            TokenKind::KwLet => self.parse_let(),
            TokenKind::KwFn => self.parse_fn(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwBreak => {
                let start = self.bump().span;
                let end = self.expect(&TokenKind::Semicolon, "`;`")?;
                Ok(Stmt {
                    kind: StmtKind::Break,
                    span: Span::new(start.start, end.end),
                })
            }
            TokenKind::KwContinue => {
                let start = self.bump().span;
                let end = self.expect(&TokenKind::Semicolon, "`;`")?;
                Ok(Stmt {
                    kind: StmtKind::Continue,
                    span: Span::new(start.start, end.end),
                })
            }
            TokenKind::KwUse => {
                let start = self.bump().span;
                let (name, _) = self.expect_ident("module name")?;
                let end = self.expect(&TokenKind::Semicolon, "`;`")?;
                Ok(Stmt {
                    kind: StmtKind::Use { name },
                    span: Span::new(start.start, end.end),
                })
            }
            TokenKind::Ident(_) if matches!(self.peek_kind(1), TokenKind::Eq) => {
                self.parse_assign()
            }
            _ => {
                let expr = self.parse_expr(0)?;
                let start = expr.span().start;
                let end = self.expect(&TokenKind::Semicolon, "`;`")?;
                Ok(Stmt {
                    kind: StmtKind::Expr(expr),
                    span: Span::new(start, end.end),
                })
            }
        }
    }

    fn parse_let(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump().span;
        let (name, _) = self.expect_ident("binding name")?;
        self.expect(&TokenKind::Eq, "`=`")?;
        let value = self.parse_expr(0)?;
        let end = self.expect(&TokenKind::Semicolon, "`;`")?;
        Ok(Stmt {
            kind: StmtKind::Let { name, value },
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_assign(&mut self) -> Result<Stmt, ParseError> {
        let (name, start) = self.expect_ident("binding name")?;
        self.expect(&TokenKind::Eq, "`=`")?;
        let value = self.parse_expr(0)?;
        let end = self.expect(&TokenKind::Semicolon, "`;`")?;
        Ok(Stmt {
            kind: StmtKind::Assign { name, value },
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_fn(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump().span;
        let (name, _) = self.expect_ident("function name")?;
        self.expect(&TokenKind::LParen, "`(`")?;

        let mut params = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                let (param, _) = self.expect_ident("parameter name")?;
                params.push(param);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "`)`")?;

        let (body, end) = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::Fn { name, params, body },
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump().span;
        let value = if self.at(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        let end = self.expect(&TokenKind::Semicolon, "`;`")?;
        Ok(Stmt {
            kind: StmtKind::Return(value),
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump().span;
        let condition = self.parse_expr(0)?;
        let (then_body, mut end) = self.parse_block()?;

        let else_body = if self.eat(&TokenKind::KwElse) {
            if self.at(&TokenKind::KwIf) {
                // `else if` chains nest as a single-statement else body.
                let nested = self.parse_if()?;
                end = nested.span;
                Some(vec![nested])
            } else {
                let (body, else_end) = self.parse_block()?;
                end = else_end;
                Some(body)
            }
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                condition,
                then_body,
                else_body,
            },
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.bump().span;
        let condition = self.parse_expr(0)?;
        let (body, end) = self.parse_block()?;
        Ok(Stmt {
            kind: StmtKind::While { condition, body },
            span: Span::new(start.start, end.end),
        })
    }

    fn parse_block(&mut self) -> Result<(Vec<Stmt>, Span), ParseError> {
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) {
            if self.at_eof() {
                return Err(ParseError::UnexpectedEof);
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect(&TokenKind::RBrace, "`}`")?;
        Ok((stmts, end))
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.at(&TokenKind::LParen) && POSTFIX_BP >= min_bp {
                lhs = self.parse_call(lhs)?;
                continue;
            }
            if self.at(&TokenKind::LBracket) && POSTFIX_BP >= min_bp {
                self.bump();
                let index = self.parse_expr(0)?;
                let end = self.expect(&TokenKind::RBracket, "`]`")?;
                let span = Span::new(lhs.span().start, end.end);
                lhs = Expr::Index {
                    target: Box::new(lhs),
                    index: Box::new(index),
                    span,
                };
                continue;
            }
            if self.at(&TokenKind::Dot) && POSTFIX_BP >= min_bp {
                self.bump();
                let (name, end) = self.expect_ident("field name")?;
                let span = Span::new(lhs.span().start, end.end);
                lhs = Expr::Field {
                    target: Box::new(lhs),
                    name,
                    span,
                };
                continue;
            }

            let op = match binop_from_token(&self.current().kind) {
                Some(op) => op,
                None => break,
            };
            let (lbp, rbp) = binding_power(op);
            if lbp < min_bp {
                break;
            }
            self.bump();
            let rhs = self.parse_expr(rbp)?;
            let span = Span::new(lhs.span().start, rhs.span().end);
            lhs = Expr::BinOp {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Int(value) => {
                self.bump();
                Ok(Expr::Int(value, token.span))
            }
            TokenKind::Float(value) => {
                self.bump();
                Ok(Expr::Float(value, token.span))
            }
            TokenKind::Bool(value) => {
                self.bump();
                Ok(Expr::Bool(value, token.span))
            }
            TokenKind::Str(value) => {
                self.bump();
                Ok(Expr::Str(value, token.span))
            }
            TokenKind::Ident(name) => {
                self.bump();
                Ok(Expr::Var(name, token.span))
            }
            TokenKind::Minus => {
                self.bump();
                let operand = self.parse_expr(UNARY_BP)?;
                let span = Span::new(token.span.start, operand.span().end);
                Ok(Expr::UnOp {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::Not => {
                self.bump();
                let operand = self.parse_expr(UNARY_BP)?;
                let span = Span::new(token.span.start, operand.span().end);
                Ok(Expr::UnOp {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    span,
                })
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                if !self.at(&TokenKind::RBracket) {
                    loop {
                        items.push(self.parse_expr(0)?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(&TokenKind::RBracket, "`]`")?;
                Ok(Expr::List(items, Span::new(token.span.start, end.end)))
            }
            TokenKind::Eof => Err(ParseError::UnexpectedEof),
            kind => Err(ParseError::UnexpectedToken {
                found: kind.describe(),
                position: token.span.start,
            }),
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        self.bump();
        let mut args = Vec::new();
        if !self.at(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let end = self.expect(&TokenKind::RParen, "`)`")?;
        let span = Span::new(callee.span().start, end.end);
        Ok(Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        })
    }
}

fn binop_from_token(kind: &TokenKind) -> Option<BinOp> {
    match kind {
        TokenKind::Plus => Some(BinOp::Add),
        TokenKind::Minus => Some(BinOp::Sub),
        TokenKind::Star => Some(BinOp::Mul),
        TokenKind::Slash => Some(BinOp::Div),
        TokenKind::Percent => Some(BinOp::Rem),
        TokenKind::EqEq => Some(BinOp::Eq),
        TokenKind::Neq => Some(BinOp::Neq),
        TokenKind::Lt => Some(BinOp::Lt),
        TokenKind::Le => Some(BinOp::Le),
        TokenKind::Gt => Some(BinOp::Gt),
        TokenKind::Ge => Some(BinOp::Ge),
        TokenKind::And => Some(BinOp::And),
        TokenKind::Or => Some(BinOp::Or),
        _ => None,
    }
}

fn binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::Or => (1, 2),
        BinOp::And => (3, 4),
        BinOp::Eq | BinOp::Neq => (5, 6),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => (7, 8),
        BinOp::Add | BinOp::Sub => (9, 10),
        BinOp::Mul | BinOp::Div | BinOp::Rem => (11, 12),
    }
}

#[cfg(test)]
mod tests;
