/// Parse a token stream into a [`Module`].
///
/// ## Errors
/// Returns `Err(Vec<CompileError>)` if parsing fails.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: &[Token]) -> Result<Module, Vec<CompileError>> {
    if tokens.is_empty() {
        return Ok(Module::default());
    }
    Parser::new(tokens).parse()
}
