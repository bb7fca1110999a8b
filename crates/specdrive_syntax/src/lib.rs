//! Syntax frontend for specdrive's `.bdd` spec scripts: lexer, parser, AST, diagnostics.
//!
//! This crate is "syntax-only": it does not resolve imports, evaluate bindings or know about the
//! test runtime. The host crate turns a parsed [`ast::Module`] into registered suites.
//!
//! ## Examples
//! ```rust
//! use specdrive_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("export answer = 42\n").unwrap();
//! let module = parser::parse(&tokens).unwrap();
//! assert_eq!(module.items.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;

pub use diagnostics::{CompileError, SyntaxReport};

/// Lex and parse `source` in one step.
///
/// ## Errors
/// Returns every lexer error if lexing fails, otherwise every parser error.
pub fn parse_source(source: &str) -> Result<ast::Module, Vec<CompileError>> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
