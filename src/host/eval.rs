//! Expression evaluation and spec-body execution.
//!
//! Bindings at module and suite level are evaluated when a file is loaded; `it` bodies are
//! turned into [`SpecBody`] closures that run statement by statement when the environment
//! executes. An evaluation error inside a body is recorded as a failure and ends that body.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use specdrive_runtime::{Matcher, SpecBody, SpecContext, SpecFuture, Value};
use specdrive_syntax::ast::{BinaryOp, Expr, ItBlock, Literal, Span, Spanned, Statement, UnaryOp};
use specdrive_syntax::diagnostics::LineIndex;

/// Where a module came from, for failure locations.
#[derive(Debug)]
pub struct SourceInfo {
    pub file: String,
    /// `None` for formats without byte positions
    lines: Option<LineIndex>,
}

impl SourceInfo {
    pub fn new(file: impl Into<String>, source: Option<&str>) -> Self {
        Self {
            file: file.into(),
            lines: source.map(LineIndex::new),
        }
    }

    /// `file:line:col`, or just `file` without positions.
    pub fn location(&self, span: Span) -> String {
        match &self.lines {
            Some(lines) => {
                let (line, col) = lines.line_col(span.start);
                format!("{}:{}:{}", self.file, line, col)
            }
            None => self.file.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalError {
    pub message: String,
    pub span: Span,
}

impl EvalError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Lexical scope: local bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: HashMap<String, Value>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(parent: &Rc<Scope>) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }
    }

    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        match self.bindings.get(name) {
            Some(v) => Some(v),
            None => self.parent.as_deref()?.lookup(name),
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

pub fn eval(expr: &Spanned<Expr>, scope: &Scope) -> Result<Value, EvalError> {
    match &expr.node {
        Expr::Literal(lit) => Ok(literal(lit)),
        Expr::Ident(name) => scope
            .lookup(name)
            .cloned()
            .ok_or_else(|| EvalError::new(format!("undefined name `{}`", name), expr.span)),
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Paren(inner) => eval(inner, scope),
        Expr::Unary(op, operand) => {
            let value = eval(operand, scope)?;
            unary(*op, value, expr.span)
        }
        Expr::Binary(left, BinaryOp::And, right) => {
            Ok(Value::Bool(eval(left, scope)?.is_truthy() && eval(right, scope)?.is_truthy()))
        }
        Expr::Binary(left, BinaryOp::Or, right) => {
            Ok(Value::Bool(eval(left, scope)?.is_truthy() || eval(right, scope)?.is_truthy()))
        }
        Expr::Binary(left, op, right) => {
            let lhs = eval(left, scope)?;
            let rhs = eval(right, scope)?;
            binary(*op, lhs, rhs, expr.span)
        }
    }
}

fn literal(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(x) => Value::Float(*x),
        Literal::String(s) => Value::Str(s.clone()),
    }
}

fn unary(op: UnaryOp, value: Value, span: Span) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| EvalError::new("integer overflow", span)),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, v) => Err(EvalError::new(format!("cannot negate {}", v.type_name()), span)),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value, span: Span) -> Result<Value, EvalError> {
    let overflow = || EvalError::new("integer overflow", span);
    let mismatch = |lhs: &Value, rhs: &Value| {
        EvalError::new(
            format!("unsupported operand types for {}: {} and {}", op, lhs.type_name(), rhs.type_name()),
            span,
        )
    };

    match op {
        BinaryOp::Eq => Ok(Value::Bool(lhs.loose_eq(&rhs))),
        BinaryOp::NotEq => Ok(Value::Bool(!lhs.loose_eq(&rhs))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = lhs.compare(&rhs).ok_or_else(|| mismatch(&lhs, &rhs))?;
            let result = match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::Add => match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => a.checked_add(*b).map(Value::Int).ok_or_else(overflow),
            (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(lhs.to_message() + &rhs.to_message())),
            (Value::List(a), Value::List(b)) => Ok(Value::List(a.iter().chain(b).cloned().collect())),
            _ => float_op(&lhs, &rhs, |a, b| a + b).ok_or_else(|| mismatch(&lhs, &rhs)),
        },
        BinaryOp::Sub => match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => a.checked_sub(*b).map(Value::Int).ok_or_else(overflow),
            _ => float_op(&lhs, &rhs, |a, b| a - b).ok_or_else(|| mismatch(&lhs, &rhs)),
        },
        BinaryOp::Mul => match (&lhs, &rhs) {
            (Value::Int(a), Value::Int(b)) => a.checked_mul(*b).map(Value::Int).ok_or_else(overflow),
            _ => float_op(&lhs, &rhs, |a, b| a * b).ok_or_else(|| mismatch(&lhs, &rhs)),
        },
        BinaryOp::Div | BinaryOp::Mod => match (&lhs, &rhs) {
            (Value::Int(_), Value::Int(0)) => Err(EvalError::new("division by zero", span)),
            (Value::Int(a), Value::Int(b)) => {
                let result = if op == BinaryOp::Div { a.checked_div(*b) } else { a.checked_rem(*b) };
                result.map(Value::Int).ok_or_else(overflow)
            }
            _ if op == BinaryOp::Div => float_op(&lhs, &rhs, |a, b| a / b).ok_or_else(|| mismatch(&lhs, &rhs)),
            _ => float_op(&lhs, &rhs, |a, b| a % b).ok_or_else(|| mismatch(&lhs, &rhs)),
        },
        BinaryOp::And => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
    }
}

fn float_op(lhs: &Value, rhs: &Value, f: impl Fn(f64, f64) -> f64) -> Option<Value> {
    Some(Value::Float(f(lhs.as_f64()?, rhs.as_f64()?)))
}

/// A non-negative millisecond count.
fn millis(expr: &Spanned<Expr>, scope: &Scope) -> Result<Duration, EvalError> {
    match eval(expr, scope)? {
        Value::Int(ms) if ms >= 0 => Ok(Duration::from_millis(ms as u64)),
        Value::Float(ms) if ms >= 0.0 && ms.is_finite() => Duration::try_from_secs_f64(ms / 1000.0)
            .map_err(|_| EvalError::new(format!("wait time of {} ms is too large", ms), expr.span)),
        other => Err(EvalError::new(
            format!("expected a non-negative number of milliseconds, found {}", other),
            expr.span,
        )),
    }
}

// ============================================================================
// Spec bodies
// ============================================================================

/// Build the runtime body for an `it` block.
pub fn spec_body(block: Rc<ItBlock>, scope: Rc<Scope>, source: Rc<SourceInfo>) -> SpecBody {
    Box::new(move |ctx: SpecContext| -> SpecFuture { Box::pin(run_statements(block, scope, source, ctx)) })
}

async fn run_statements(block: Rc<ItBlock>, scope: Rc<Scope>, source: Rc<SourceInfo>, ctx: SpecContext) {
    let mut local = Scope::child(&scope);
    for stmt in &block.body {
        if let Err(err) = run_statement(stmt, &mut local, &source, &ctx).await {
            ctx.fail(err.message, Some(&source.location(err.span)));
            return;
        }
    }
}

async fn run_statement(
    stmt: &Spanned<Statement>,
    scope: &mut Scope,
    source: &SourceInfo,
    ctx: &SpecContext,
) -> Result<(), EvalError> {
    let location = source.location(stmt.span);
    match &stmt.node {
        Statement::Let(binding) => {
            let value = eval(&binding.value, scope)?;
            scope.define(binding.name.node.clone(), value);
        }
        Statement::Expect(expect) => {
            let actual = eval(&expect.actual, scope)?;
            let expected = expect
                .args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            let matcher = Matcher::from_name(&expect.matcher.node).ok_or_else(|| {
                EvalError::new(format!("unknown matcher `{}`", expect.matcher.node), expect.matcher.span)
            })?;
            let mut expectation = ctx.expect(actual).at(location);
            if expect.negated {
                expectation = expectation.not();
            }
            expectation.to(matcher, &expected);
        }
        Statement::Wait(timeout) => {
            let timeout = timeout.as_ref().map(|t| millis(t, scope)).transpose()?;
            ctx.wait(timeout, Some(&location)).await;
        }
        Statement::AfterDone(delay) => {
            ctx.done_after(millis(delay, scope)?);
        }
        Statement::Fail(message) => {
            let message = eval(message, scope)?;
            ctx.fail(message.to_message(), Some(&location));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specdrive_syntax::ast::Item;

    fn eval_str(source: &str, scope: &Scope) -> Result<Value, EvalError> {
        let module = specdrive_syntax::parse_source(&format!("let it_ = {}", source)).unwrap();
        match &module.items[0].node {
            Item::Binding(b) => eval(&b.value, scope),
            other => panic!("Expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_arithmetic() {
        let scope = Scope::root();
        assert_eq!(eval_str("1 + 2 * 3", &scope), Ok(Value::Int(7)));
        assert_eq!(eval_str("7 / 2", &scope), Ok(Value::Int(3)));
        assert_eq!(eval_str("7 % 4", &scope), Ok(Value::Int(3)));
        assert_eq!(eval_str("1 + 0.5", &scope), Ok(Value::Float(1.5)));
        assert_eq!(eval_str("-(2 - 5)", &scope), Ok(Value::Int(3)));
    }

    #[test]
    fn test_string_and_list_concatenation() {
        let scope = Scope::root();
        assert_eq!(eval_str("'a' + 1", &scope), Ok(Value::from("a1")));
        assert_eq!(
            eval_str("[1] + [2]", &scope),
            Ok(Value::List(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn test_logic_and_comparison() {
        let scope = Scope::root();
        assert_eq!(eval_str("1 < 2 and not (2 == 2.0)", &scope), Ok(Value::Bool(false)));
        assert_eq!(eval_str("null or 'x'", &scope), Ok(Value::Bool(true)));
        assert_eq!(eval_str("'a' <= 'b'", &scope), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        let scope = Scope::root();
        assert_eq!(eval_str("false and missing", &scope), Ok(Value::Bool(false)));
        assert_eq!(eval_str("true or missing", &scope), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_errors() {
        let scope = Scope::root();
        assert_eq!(eval_str("1 / 0", &scope).unwrap_err().message, "division by zero");
        assert_eq!(eval_str("missing", &scope).unwrap_err().message, "undefined name `missing`");
        assert!(eval_str("null < 1", &scope).unwrap_err().message.contains("unsupported operand"));
        assert!(eval_str("-'x'", &scope).unwrap_err().message.contains("cannot negate string"));
    }

    fn millis_str(source: &str) -> Result<Duration, EvalError> {
        let module = specdrive_syntax::parse_source(&format!("let it_ = {}", source)).unwrap();
        match &module.items[0].node {
            Item::Binding(b) => millis(&b.value, &Scope::root()),
            other => panic!("Expected binding, got {:?}", other),
        }
    }

    #[test]
    fn test_millis() {
        assert_eq!(millis_str("250"), Ok(Duration::from_millis(250)));
        assert_eq!(millis_str("500.0"), Ok(Duration::from_millis(500)));
        assert!(millis_str("-1").unwrap_err().message.contains("non-negative"));
        let err = millis_str("100000000000000000000000000.0").unwrap_err();
        assert!(err.message.contains("too large"), "got: {}", err.message);
    }

    #[test]
    fn test_scope_chain() {
        let mut root = Scope::root();
        root.define("baz", Value::Int(42));
        let root = Rc::new(root);
        let mut child = Scope::child(&root);
        child.define("local", Value::Int(1));
        assert_eq!(eval_str("baz + local", &child), Ok(Value::Int(43)));
        child.define("baz", Value::Int(0));
        assert_eq!(child.lookup("baz"), Some(&Value::Int(0)));
        assert_eq!(root.lookup("local"), None);
    }

    #[test]
    fn test_locations() {
        let with_lines = SourceInfo::new("fooSpec.bdd", Some("let a = 1\nlet b = 2\n"));
        assert_eq!(with_lines.location(Span::new(14, 15)), "fooSpec.bdd:2:5");
        let without = SourceInfo::new("fooSpec.json", None);
        assert_eq!(without.location(Span::new(14, 15)), "fooSpec.json");
    }
}
