//! Parser for `.bdd` spec scripts
//!
//! Converts a token stream into an [`ast::Module`](crate::ast::Module).
//!
//! ## Examples
//!
//! ```rust
//! use specdrive_syntax::{lexer, parser};
//!
//! let source = "describe \"math\" {\n  it \"adds\" {\n    expect(1 + 1).to_equal(2)\n  }\n}\n";
//! let tokens = lexer::lex(source).unwrap();
//! let module = parser::parse(&tokens).unwrap();
//! assert_eq!(module.suites().count(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{KeywordId, OperatorId, PunctuationId, Token, TokenKind};

// NOTE: split across files with `include!` so every chunk shares one module (and its privacy).

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/items.rs");
include!("parser/stmts.rs");
include!("parser/expr.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
