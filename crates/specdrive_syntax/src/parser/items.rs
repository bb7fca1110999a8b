/// Top-level items and suite bodies.
///
/// ```text
/// item       := "import" STRING | ("let" | "export") binding | describe
/// describe   := "describe" STRING "{" suite_item* "}"
/// suite_item := "let" binding | "it" STRING "{" statement* "}" | describe
/// ```
impl<'a> Parser<'a> {
    // ========================================================================
    // Items
    // ========================================================================

    fn item(&mut self) -> Result<Spanned<Item>, CompileError> {
        let start = self.current_span().start;

        let item = if self.match_keyword(KeywordId::Import) {
            Item::Import(self.string_literal("Expected import path string after `import`")?)
        } else if self.match_keyword(KeywordId::Let) {
            Item::Binding(self.binding(false)?)
        } else if self.match_keyword(KeywordId::Export) {
            Item::Binding(self.binding(true)?)
        } else if self.check_keyword(KeywordId::Describe) {
            Item::Describe(self.describe_block()?)
        } else if self.check_keyword(KeywordId::It) {
            return Err(self
                .unexpected("Expected `import`, `let`, `export` or `describe`")
                .with_hint("`it` blocks must appear inside a `describe` block"));
        } else {
            return Err(self.unexpected("Expected `import`, `let`, `export` or `describe`"));
        };

        Ok(Spanned::new(item, Span::new(start, self.previous_span().end)))
    }

    /// `name = expr`, after the `let`/`export` keyword has been consumed.
    fn binding(&mut self, exported: bool) -> Result<Binding, CompileError> {
        let name = self.identifier_spanned("Expected binding name")?;
        self.expect_op(OperatorId::Eq, "Expected `=` after binding name")?;
        let value = self.expression()?;
        Ok(Binding { exported, name, value })
    }

    fn describe_block(&mut self) -> Result<DescribeBlock, CompileError> {
        self.expect_keyword(KeywordId::Describe, "Expected `describe`")?;
        let description = self.string_literal("Expected suite description string after `describe`")?;
        self.expect_punct(PunctuationId::LBrace, "Expected `{` to open suite body")?;

        let mut body = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            body.push(self.suite_item()?);
        }
        self.expect_punct(PunctuationId::RBrace, "Expected `}` to close suite body")?;

        Ok(DescribeBlock { description, body })
    }

    fn suite_item(&mut self) -> Result<Spanned<SuiteItem>, CompileError> {
        let start = self.current_span().start;

        let item = if self.match_keyword(KeywordId::Let) {
            SuiteItem::Let(self.binding(false)?)
        } else if self.check_keyword(KeywordId::It) {
            SuiteItem::It(self.it_block()?)
        } else if self.check_keyword(KeywordId::Describe) {
            SuiteItem::Describe(self.describe_block()?)
        } else if self.check_keyword(KeywordId::Expect) {
            return Err(self
                .unexpected("Expected `let`, `it` or `describe`")
                .with_hint("expectations must appear inside an `it` block"));
        } else {
            return Err(self.unexpected("Expected `let`, `it` or `describe`"));
        };

        Ok(Spanned::new(item, Span::new(start, self.previous_span().end)))
    }

    fn it_block(&mut self) -> Result<ItBlock, CompileError> {
        self.expect_keyword(KeywordId::It, "Expected `it`")?;
        let description = self.string_literal("Expected spec description string after `it`")?;
        self.expect_punct(PunctuationId::LBrace, "Expected `{` to open spec body")?;

        let mut body = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            body.push(self.statement()?);
        }
        self.expect_punct(PunctuationId::RBrace, "Expected `}` to close spec body")?;

        Ok(ItBlock { description, body })
    }
}
