//! Abstract syntax tree for `.bdd` spec scripts.
//!
//! A module is a flat list of items: imports, bindings and `describe` blocks. Suites nest
//! arbitrarily; specs (`it` blocks) hold the statements executed at run time.

use std::fmt;

/// Source location span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }

    /// Wrap a node that has no source position (e.g. compiled from JSON).
    pub fn detached(node: T) -> Self {
        Self {
            node,
            span: Span::default(),
        }
    }
}

pub type Ident = String;

/// A parsed spec or helper file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub items: Vec<Spanned<Item>>,
}

impl Module {
    /// Bindings declared with `export`, in declaration order.
    pub fn exports(&self) -> impl Iterator<Item = &Binding> {
        self.items.iter().filter_map(|item| match &item.node {
            Item::Binding(b) if b.exported => Some(b),
            _ => None,
        })
    }

    /// Top-level `describe` blocks, in declaration order.
    pub fn suites(&self) -> impl Iterator<Item = &Spanned<Item>> {
        self.items.iter().filter(|item| matches!(item.node, Item::Describe(_)))
    }
}

/// Top-level items
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// `import "relative/path.bdd"`
    Import(String),
    Binding(Binding),
    Describe(DescribeBlock),
}

/// `let name = expr` or `export name = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub exported: bool,
    pub name: Spanned<Ident>,
    pub value: Spanned<Expr>,
}

/// `describe "description" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct DescribeBlock {
    pub description: String,
    pub body: Vec<Spanned<SuiteItem>>,
}

/// Items allowed inside a `describe` body.
#[derive(Debug, Clone, PartialEq)]
pub enum SuiteItem {
    Let(Binding),
    It(ItBlock),
    Describe(DescribeBlock),
}

/// `it "description" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ItBlock {
    pub description: String,
    pub body: Vec<Spanned<Statement>>,
}

/// Statements allowed inside an `it` body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let(Binding),
    Expect(ExpectStmt),
    /// `wait` with an optional timeout in milliseconds
    Wait(Option<Spanned<Expr>>),
    /// `after <ms> done`
    AfterDone(Spanned<Expr>),
    /// `fail(message)`
    Fail(Spanned<Expr>),
}

/// `expect(actual)[.not].matcher(args...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectStmt {
    pub actual: Spanned<Expr>,
    pub negated: bool,
    pub matcher: Spanned<Ident>,
    pub args: Vec<Spanned<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Ident(Ident),
    List(Vec<Spanned<Expr>>),
    Unary(UnaryOp, Box<Spanned<Expr>>),
    Binary(Box<Spanned<Expr>>, BinaryOp, Box<Spanned<Expr>>),
    Paren(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        write!(f, "{}", s)
    }
}
