//! Token types for the `.bdd` lexer.
//!
//! Keywords, operators and punctuation carry small ID enums so the parser never compares
//! spellings.

use crate::ast::Span;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordId {
    Import,
    Let,
    Export,
    Describe,
    It,
    Expect,
    Not,
    Wait,
    After,
    Done,
    Fail,
    True,
    False,
    Null,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorId {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctuationId {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
}

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    Ident(String),
    Int(i64),
    Float(f64),
    String(String),

    Eof,
}

impl TokenKind {
    /// Return `true` if this is the given keyword.
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    /// Return `true` if this is the given operator.
    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    /// Return `true` if this is the given punctuation.
    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    let id = match name {
        "import" => KeywordId::Import,
        "let" => KeywordId::Let,
        "export" => KeywordId::Export,
        "describe" => KeywordId::Describe,
        "it" => KeywordId::It,
        "expect" => KeywordId::Expect,
        "not" => KeywordId::Not,
        "wait" => KeywordId::Wait,
        "after" => KeywordId::After,
        "done" => KeywordId::Done,
        "fail" => KeywordId::Fail,
        "true" => KeywordId::True,
        "false" => KeywordId::False,
        "null" => KeywordId::Null,
        "and" => KeywordId::And,
        "or" => KeywordId::Or,
        _ => return None,
    };
    Some(id)
}
