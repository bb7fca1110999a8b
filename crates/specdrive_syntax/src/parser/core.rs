/// Parser core type and entrypoint.
///
/// ## Notes
/// - Single pass. After an error the parser skips to the end of the broken top-level item
///   (balancing braces) so one typo yields one diagnostic.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    errors: Vec<CompileError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream produced by [`crate::lexer::lex`].
    ///
    /// The stream must end with an `Eof` token.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the entire token stream into a [`Module`].
    ///
    /// ## Errors
    /// Returns every [`CompileError`] found; the parser recovers at item boundaries.
    pub fn parse(mut self) -> Result<Module, Vec<CompileError>> {
        let mut items = Vec::new();

        while !self.is_at_end() {
            let item_start = self.pos;
            match self.item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize(item_start);
                }
            }
        }

        if self.errors.is_empty() {
            Ok(Module { items })
        } else {
            Err(self.errors)
        }
    }
}
