/// Statements inside `it` bodies.
///
/// ```text
/// statement := "let" binding
///            | "expect" "(" expr ")" ("." "not")? "." IDENT "(" args? ")"
///            | "wait" expr?
///            | "after" expr "done"
///            | "fail" "(" expr ")"
/// ```
impl<'a> Parser<'a> {
    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self) -> Result<Spanned<Statement>, CompileError> {
        let start = self.current_span().start;

        let stmt = if self.match_keyword(KeywordId::Let) {
            Statement::Let(self.binding(false)?)
        } else if self.match_keyword(KeywordId::Expect) {
            Statement::Expect(self.expect_stmt()?)
        } else if self.match_keyword(KeywordId::Wait) {
            // The timeout is optional; every statement starts with a keyword, so anything that
            // looks like an expression belongs to this `wait`.
            let timeout = if self.is_at_expr_start() {
                Some(self.expression()?)
            } else {
                None
            };
            Statement::Wait(timeout)
        } else if self.match_keyword(KeywordId::After) {
            let delay = self.expression()?;
            self.expect_keyword(KeywordId::Done, "Expected `done` after delay")?;
            Statement::AfterDone(delay)
        } else if self.match_keyword(KeywordId::Fail) {
            self.expect_punct(PunctuationId::LParen, "Expected `(` after `fail`")?;
            let message = self.expression()?;
            self.expect_punct(PunctuationId::RParen, "Expected `)` after failure message")?;
            Statement::Fail(message)
        } else {
            return Err(self.unexpected("Expected `let`, `expect`, `wait`, `after` or `fail`"));
        };

        Ok(Spanned::new(stmt, Span::new(start, self.previous_span().end)))
    }

    /// `(actual)[.not].matcher(args)`, after `expect` has been consumed.
    fn expect_stmt(&mut self) -> Result<ExpectStmt, CompileError> {
        self.expect_punct(PunctuationId::LParen, "Expected `(` after `expect`")?;
        let actual = self.expression()?;
        self.expect_punct(PunctuationId::RParen, "Expected `)` after actual value")?;

        self.expect_punct(PunctuationId::Dot, "Expected `.` before matcher name")?;
        let negated = if self.match_keyword(KeywordId::Not) {
            self.expect_punct(PunctuationId::Dot, "Expected `.` before matcher name")?;
            true
        } else {
            false
        };

        let matcher = self.identifier_spanned("Expected matcher name")?;
        self.expect_punct(PunctuationId::LParen, "Expected `(` after matcher name")?;
        let args = self.comma_separated(PunctuationId::RParen)?;
        self.expect_punct(PunctuationId::RParen, "Expected `)` after matcher arguments")?;

        Ok(ExpectStmt {
            actual,
            negated,
            matcher,
            args,
        })
    }
}
