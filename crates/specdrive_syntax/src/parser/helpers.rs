/// Token-stream helpers and error recovery.
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    /// Advance to the next token and return the token just consumed.
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Span of the most recently consumed token.
    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.peek().kind.is_operator(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, id: KeywordId, msg: &str) -> Result<&Token, CompileError> {
        if self.check_keyword(id) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> Result<&Token, CompileError> {
        if self.check_punct(id) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn expect_op(&mut self, id: OperatorId, msg: &str) -> Result<&Token, CompileError> {
        if self.peek().kind.is_operator(id) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn unexpected(&self, msg: &str) -> CompileError {
        CompileError::syntax(format!("{}, found {}", msg, describe_token(&self.peek().kind)), self.current_span())
    }

    /// Return `true` if the current token can begin a top-level item.
    fn at_item_start(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Keyword(KeywordId::Import | KeywordId::Let | KeywordId::Export | KeywordId::Describe)
        )
    }

    /// Skip the rest of a broken item.
    ///
    /// Rewinds to where the item began, then consumes tokens until the braces opened by the item
    /// are balanced again, or until another item keyword appears outside any block.
    fn synchronize(&mut self, item_start: usize) {
        self.pos = item_start;
        self.advance();
        let mut depth = 0usize;
        while !self.is_at_end() {
            if depth == 0 && self.at_item_start() {
                return;
            }
            if self.check_punct(PunctuationId::LBrace) {
                depth += 1;
            } else if self.check_punct(PunctuationId::RBrace) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    self.advance();
                    return;
                }
            }
            self.advance();
        }
    }

    /// Check if the current token can start an expression
    fn is_at_expr_start(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Ident(_) | TokenKind::Int(_) | TokenKind::Float(_) | TokenKind::String(_) => true,
            TokenKind::Keyword(k) => matches!(k, KeywordId::True | KeywordId::False | KeywordId::Null | KeywordId::Not),
            TokenKind::Punctuation(p) => matches!(p, PunctuationId::LParen | PunctuationId::LBracket),
            TokenKind::Operator(o) => *o == OperatorId::Minus,
            TokenKind::Eof => false,
        }
    }
}

/// Human-readable token name for diagnostics.
fn describe_token(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Keyword(k) => format!("keyword `{}`", format!("{:?}", k).to_lowercase()),
        TokenKind::Operator(o) => format!("operator {:?}", o),
        TokenKind::Punctuation(p) => format!("{:?}", p),
        TokenKind::Ident(name) => format!("identifier `{}`", name),
        TokenKind::Int(v) => format!("integer {}", v),
        TokenKind::Float(v) => format!("float {}", v),
        TokenKind::String(s) => format!("string {:?}", s),
        TokenKind::Eof => "end of file".to_string(),
    }
}
