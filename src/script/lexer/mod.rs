//! Lexer for rig scripts

pub mod tokens;

use std::iter::Peekable;
use std::str::Chars;

use crate::script::span::{Position, Span};
use tokens::{Token, TokenKind};

/// Lexer error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },
    #[error("invalid escape sequence '\\{sequence}' at {position}")]
    InvalidEscape { sequence: char, position: Position },
    #[error("invalid number literal '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
    #[error("unterminated block comment starting at {position}")]
    UnterminatedComment { position: Position },
}

/// Tokenize source text, ending with an Eof token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    let eof = lexer.position();
    tokens.push(Token::new(TokenKind::Eof, Span::new(eof, eof)));
    Ok(tokens)
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn start_position(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    fn span(&self) -> Span {
        Span::new(self.start_position(), self.position())
    }

    fn advance(&mut self) -> Option<char> {
        match self.chars.next() {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
                Some('\n')
            }
            Some(c) => {
                self.column += 1;
                Some(c)
            }
            None => None,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek_next(&mut self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        if self.peek().is_none() {
            return Ok(None);
        }

        self.start_line = self.line;
        self.start_column = self.column;

        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            c if is_identifier_start(c) => self.scan_identifier(c),
            c if c.is_ascii_digit() => self.scan_number(c)?,
            '"' => self.scan_string()?,
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '%' => self.make_token(TokenKind::Percent),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '.' => self.make_token(TokenKind::Dot),
            '(' => self.make_token(TokenKind::LParen),
            ')' => self.make_token(TokenKind::RParen),
            '[' => self.make_token(TokenKind::LBracket),
            ']' => self.make_token(TokenKind::RBracket),
            '{' => self.make_token(TokenKind::LBrace),
            '}' => self.make_token(TokenKind::RBrace),
            '=' => {
                if self.eat('=') {
                    self.make_token(TokenKind::EqEq)
                } else {
                    self.make_token(TokenKind::Eq)
                }
            }
            '!' => {
                if self.eat('=') {
                    self.make_token(TokenKind::Neq)
                } else {
                    self.make_token(TokenKind::Not)
                }
            }
            '<' => {
                if self.eat('=') {
                    self.make_token(TokenKind::Le)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.eat('=') {
                    self.make_token(TokenKind::Ge)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '&' => {
                if self.eat('&') {
                    self.make_token(TokenKind::And)
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '&',
                        position: self.start_position(),
                    });
                }
            }
            '|' => {
                if self.eat('|') {
                    self.make_token(TokenKind::Or)
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: '|',
                        position: self.start_position(),
                    });
                }
            }
            '/' => {
                if self.peek() == Some('/') {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                    return self.next_token();
                } else if self.peek() == Some('*') {
                    self.advance();
                    self.skip_block_comment()?;
                    return self.next_token();
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }
            c => {
                return Err(LexError::UnexpectedChar {
                    ch: c,
                    position: self.start_position(),
                })
            }
        };

        Ok(Some(token))
    }

    /// Block comments nest.
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let open = self.start_position();
        let mut depth = 1;
        while depth > 0 {
            match self.advance() {
                Some('/') if self.peek() == Some('*') => {
                    self.advance();
                    depth += 1;
                }
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    depth -= 1;
                }
                Some(_) => {}
                None => return Err(LexError::UnterminatedComment { position: open }),
            }
        }
        Ok(())
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        let mut value = String::new();
        value.push(first_char);

        while let Some(c) = self.peek() {
            if is_identifier_char(c) {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match keyword_from_str(&value) {
            Some(kind) => kind,
            None => TokenKind::Ident(value),
        };
        self.make_token(kind)
    }

    fn scan_number(&mut self, first_char: char) -> Result<Token, LexError> {
        let mut text = String::new();
        text.push(first_char);
        let mut is_float = false;

        self.scan_digits(&mut text);

        if self.peek() == Some('.') && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false)
        {
            is_float = true;
            text.push('.');
            self.advance();
            self.scan_digits(&mut text);
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            text.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                text.push(sign);
                self.advance();
            }
            let before = text.len();
            self.scan_digits(&mut text);
            if text.len() == before {
                return Err(LexError::InvalidNumber {
                    text,
                    position: self.start_position(),
                });
            }
        }

        let kind = if is_float {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(_) => {
                    return Err(LexError::InvalidNumber {
                        text,
                        position: self.start_position(),
                    })
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => {
                    return Err(LexError::InvalidNumber {
                        text,
                        position: self.start_position(),
                    })
                }
            }
        };

        Ok(self.make_token(kind))
    }

    /// Digits with `_` separators; separators are dropped from the text.
    fn scan_digits(&mut self, text: &mut String) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self) -> Result<Token, LexError> {
        let open = self.start_position();
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('"') => return Ok(self.make_token(TokenKind::Str(value))),
                Some('\\') => {
                    let escape_at = self.position();
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('0') => value.push('\0'),
                        Some(c) => {
                            return Err(LexError::InvalidEscape {
                                sequence: c,
                                position: escape_at,
                            })
                        }
                        None => return Err(LexError::UnterminatedString { position: open }),
                    }
                }
                Some('\n') | None => {
                    return Err(LexError::UnterminatedString { position: open })
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.span())
    }
}

fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::KwLet),
        "fn" => Some(TokenKind::KwFn),
        "return" => Some(TokenKind::KwReturn),
        "if" => Some(TokenKind::KwIf),
        "else" => Some(TokenKind::KwElse),
        "while" => Some(TokenKind::KwWhile),
        "break" => Some(TokenKind::KwBreak),
        "continue" => Some(TokenKind::KwContinue),
        "use" => Some(TokenKind::KwUse),
        "true" => Some(TokenKind::Bool(true)),
        "false" => Some(TokenKind::Bool(false)),
        _ => None,
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_start(c)
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}
