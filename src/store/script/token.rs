use std::fmt;

use wrapgen_span::Span;

#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier(String),
    StringLiteral(String),
    Bool(bool),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Equals,
}

impl TokenKind {
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::StringLiteral(_) => "string",
            TokenKind::Bool(_) => "boolean",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Equals => "=",
        }
    }
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "Identifier({name})"),
            TokenKind::StringLiteral(value) => write!(f, "StringLiteral({value:?})"),
            TokenKind::Bool(value) => write!(f, "Bool({value})"),
            kind => f.write_str(kind.name()),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "`{name}`"),
            TokenKind::StringLiteral(value) => write!(f, "{value:?}"),
            TokenKind::Bool(value) => write!(f, "`{value}`"),
            kind => write!(f, "`{}`", kind.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
