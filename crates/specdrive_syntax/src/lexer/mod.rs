//! Lexer for `.bdd` spec scripts
//!
//! Handles tokenization of:
//! - Keywords (describe, it, expect, wait, after, done, ...)
//! - Identifiers and literals (int, float, single/double-quoted strings)
//! - Operators and punctuation
//! - `#` line comments
//!
//! Newlines are insignificant: every statement form is self-delimiting, so the lexer drops
//! whitespace entirely and the token stream ends with a single `Eof`.

pub mod tokens;

pub use tokens::{KeywordId, OperatorId, PunctuationId, Token, TokenKind, keyword_id};

use crate::ast::Span;
use crate::diagnostics::CompileError;

/// Lexer for `.bdd` source code.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Open brackets awaiting their closing partner
    bracket_depth: usize,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            bracket_depth: 0,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns a vector of tokens on success, or every error found on failure.
    /// The token stream always ends with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Vec<CompileError>> {
        while !self.is_at_end() {
            self.scan_token();
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            Span::new(self.current_pos, self.current_pos),
        ));

        if self.errors.is_empty() {
            Ok(self.tokens)
        } else {
            Err(self.errors)
        }
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, c)) = self.chars.next() {
            self.current_pos = pos + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.current_pos;

        let Some(c) = self.advance() else {
            return;
        };

        match c {
            ' ' | '\t' | '\r' | '\n' => {}

            '#' => {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            }

            '+' => self.add_op(OperatorId::Plus, start),
            '-' => self.add_op(OperatorId::Minus, start),
            '*' => self.add_op(OperatorId::Star, start),
            '/' => self.add_op(OperatorId::Slash, start),
            '%' => self.add_op(OperatorId::Percent, start),
            '=' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::EqEq, start);
                } else {
                    self.add_op(OperatorId::Eq, start);
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::NotEq, start);
                } else {
                    self.errors.push(
                        CompileError::new("Unexpected character '!'".to_string(), Span::new(start, self.current_pos))
                            .with_hint("use `not` for logical negation"),
                    );
                }
            }
            '<' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::LtEq, start);
                } else {
                    self.add_op(OperatorId::Lt, start);
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.add_op(OperatorId::GtEq, start);
                } else {
                    self.add_op(OperatorId::Gt, start);
                }
            }

            ',' => self.add_punct(PunctuationId::Comma, start),
            '.' => self.add_punct(PunctuationId::Dot, start),
            '(' => self.open_bracket(PunctuationId::LParen, start),
            ')' => self.close_bracket(PunctuationId::RParen, start),
            '[' => self.open_bracket(PunctuationId::LBracket, start),
            ']' => self.close_bracket(PunctuationId::RBracket, start),
            '{' => self.open_bracket(PunctuationId::LBrace, start),
            '}' => self.close_bracket(PunctuationId::RBrace, start),

            '"' | '\'' => self.scan_string(start, c),

            '0'..='9' => self.scan_number(start),

            _ if is_ident_start(c) => self.scan_identifier(start),

            _ => {
                self.errors.push(CompileError::new(
                    format!("Unexpected character '{}'", c),
                    Span::new(start, self.current_pos),
                ));
            }
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token::new(kind, Span::new(start, self.current_pos)));
    }

    fn add_op(&mut self, id: OperatorId, start: usize) {
        self.add_token(TokenKind::Operator(id), start);
    }

    fn add_punct(&mut self, id: PunctuationId, start: usize) {
        self.add_token(TokenKind::Punctuation(id), start);
    }

    fn open_bracket(&mut self, kind: PunctuationId, start: usize) {
        self.bracket_depth += 1;
        self.add_punct(kind, start);
    }

    /// Emit a closing bracket token. Produces an error if there's no matching opening bracket.
    fn close_bracket(&mut self, kind: PunctuationId, start: usize) {
        if self.bracket_depth == 0 {
            self.errors.push(CompileError::new(
                "Unmatched closing bracket".to_string(),
                Span::new(start, self.current_pos),
            ));
        } else {
            self.bracket_depth -= 1;
        }
        self.add_punct(kind, start);
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string(&mut self, start: usize, quote: char) {
        let mut value = String::new();
        loop {
            match self.advance() {
                None | Some('\n') => {
                    self.errors.push(CompileError::new(
                        "Unterminated string literal".to_string(),
                        Span::new(start, self.current_pos),
                    ));
                    return;
                }
                Some(c) if c == quote => break,
                Some('\\') => {
                    let escape_start = self.current_pos - 1;
                    match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('0') => value.push('\0'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some('\'') => value.push('\''),
                        Some(other) => {
                            self.errors.push(CompileError::new(
                                format!("Unknown escape sequence '\\{}'", other),
                                Span::new(escape_start, self.current_pos),
                            ));
                        }
                        None => {}
                    }
                }
                Some(c) => value.push(c),
            }
        }
        self.add_token(TokenKind::String(value), start);
    }

    fn scan_number(&mut self, start: usize) {
        self.consume_digits();

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.consume_digits();
        }

        let text: String = self.source[start..self.current_pos].chars().filter(|c| *c != '_').collect();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => self.add_token(TokenKind::Float(v), start),
                Err(_) => self.errors.push(CompileError::new(
                    format!("Invalid float literal '{}'", text),
                    Span::new(start, self.current_pos),
                )),
            }
        } else {
            match text.parse::<i64>() {
                Ok(v) => self.add_token(TokenKind::Int(v), start),
                Err(_) => self.errors.push(CompileError::new(
                    format!("Integer literal '{}' is out of range", text),
                    Span::new(start, self.current_pos),
                )),
            }
        }
    }

    fn consume_digits(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_identifier(&mut self, start: usize) {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.advance();
            } else {
                break;
            }
        }

        let spelling = &self.source[start..self.current_pos];
        if let Some(id) = keyword_id(spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling.to_string()), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Convenience function to lex a source string.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    Lexer::new(source).tokenize()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("describe it expect to_equal"),
            vec![
                TokenKind::Keyword(KeywordId::Describe),
                TokenKind::Keyword(KeywordId::It),
                TokenKind::Keyword(KeywordId::Expect),
                TokenKind::Ident("to_equal".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 1_000 2.5"),
            vec![
                TokenKind::Int(42),
                TokenKind::Int(1000),
                TokenKind::Float(2.5),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_int_followed_by_dot_call_is_not_float() {
        let k = kinds("1.x");
        assert_eq!(k[0], TokenKind::Int(1));
        assert!(k[1].is_punctuation(PunctuationId::Dot));
    }

    #[test]
    fn test_strings_with_escapes() {
        assert_eq!(
            kinds(r#""a\"b" 'c\n'"#),
            vec![
                TokenKind::String("a\"b".to_string()),
                TokenKind::String("c\n".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines_are_dropped() {
        assert_eq!(
            kinds("# header\nwait # trailing\n\n"),
            vec![TokenKind::Keyword(KeywordId::Wait), TokenKind::Eof]
        );
    }

    #[test]
    fn test_operators() {
        let k = kinds("== != <= >= < > = + - * / %");
        let ops: Vec<OperatorId> = k
            .iter()
            .filter_map(|t| match t {
                TokenKind::Operator(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                OperatorId::EqEq,
                OperatorId::NotEq,
                OperatorId::LtEq,
                OperatorId::GtEq,
                OperatorId::Lt,
                OperatorId::Gt,
                OperatorId::Eq,
                OperatorId::Plus,
                OperatorId::Minus,
                OperatorId::Star,
                OperatorId::Slash,
                OperatorId::Percent,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = lex("let  x").unwrap();
        assert_eq!(tokens[1].span, Span::new(5, 6));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let errs = lex("\"abc").unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("Unterminated"));
    }

    #[test]
    fn test_collects_multiple_errors() {
        let errs = lex("@ $ )").unwrap_err();
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn test_bang_suggests_not() {
        let errs = lex("!x").unwrap_err();
        assert_eq!(errs[0].hints, vec!["use `not` for logical negation".to_string()]);
    }
}
