/// Small shared parsing utilities.
impl<'a> Parser<'a> {
    fn identifier_spanned(&mut self, msg: &str) -> Result<Spanned<Ident>, CompileError> {
        if let TokenKind::Ident(name) = &self.peek().kind {
            let name = name.clone();
            let span = self.advance().span;
            Ok(Spanned::new(name, span))
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn string_literal(&mut self, msg: &str) -> Result<String, CompileError> {
        if let TokenKind::String(s) = &self.peek().kind {
            let s = s.clone();
            self.advance();
            Ok(s)
        } else {
            Err(self.unexpected(msg))
        }
    }

    /// Comma-separated expressions up to (not including) `close`. A trailing comma is allowed.
    fn comma_separated(&mut self, close: PunctuationId) -> Result<Vec<Spanned<Expr>>, CompileError> {
        let mut items = Vec::new();
        while !self.check_punct(close) {
            items.push(self.expression()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(items)
    }
}
