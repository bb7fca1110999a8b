//! Module loaders, keyed by file extension.
//!
//! A loader turns file contents into a [`Module`]. `.bdd` scripts go through the syntax crate;
//! `.json` documents (enabled with `--json`) are compiled straight into the same AST.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use specdrive_syntax::SyntaxReport;
use specdrive_syntax::ast::{
    Binding, DescribeBlock, ExpectStmt, Expr, Item, ItBlock, Literal, Module, Spanned, Statement, SuiteItem,
};

use super::LoadError;

pub trait ModuleLoader {
    /// Loader name used in conflict messages.
    fn name(&self) -> &'static str;

    /// Extension handled, without the dot.
    fn extension(&self) -> &'static str;

    /// Whether compiled modules carry byte spans into the source.
    fn has_positions(&self) -> bool {
        true
    }

    fn compile(&self, path: &Path, source: &str) -> Result<Module, LoadError>;
}

/// `.bdd` spec scripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptLoader;

impl ModuleLoader for ScriptLoader {
    fn name(&self) -> &'static str {
        "script"
    }

    fn extension(&self) -> &'static str {
        "bdd"
    }

    fn compile(&self, path: &Path, source: &str) -> Result<Module, LoadError> {
        specdrive_syntax::parse_source(source)
            .map_err(|errors| LoadError::Syntax(SyntaxReport::new(&path.display().to_string(), source, &errors)))
    }
}

/// `.json` modules.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonModule {
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    exports: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    describe: Vec<JsonSuite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonSuite {
    description: String,
    #[serde(default, rename = "let")]
    bindings: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    it: Vec<JsonSpec>,
    #[serde(default)]
    describe: Vec<JsonSuite>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonSpec {
    description: String,
    #[serde(default)]
    expect: Vec<JsonExpectation>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JsonExpectation {
    actual: serde_json::Value,
    matcher: String,
    #[serde(default)]
    expected: Vec<serde_json::Value>,
    #[serde(default)]
    not: bool,
}

impl ModuleLoader for JsonLoader {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn has_positions(&self) -> bool {
        false
    }

    fn compile(&self, path: &Path, source: &str) -> Result<Module, LoadError> {
        let invalid = |message: String| LoadError::Json {
            path: path.to_path_buf(),
            message,
        };
        let doc: JsonModule = serde_json::from_str(source).map_err(|e| invalid(e.to_string()))?;

        let mut items = Vec::new();
        for import in doc.imports {
            items.push(Spanned::detached(Item::Import(import)));
        }
        for (name, value) in doc.exports {
            let value = json_expr(&value).map_err(invalid)?;
            items.push(Spanned::detached(Item::Binding(binding(true, name, value))));
        }
        for suite in &doc.describe {
            items.push(Spanned::detached(Item::Describe(json_suite(suite).map_err(invalid)?)));
        }
        Ok(Module { items })
    }
}

fn binding(exported: bool, name: String, value: Expr) -> Binding {
    Binding {
        exported,
        name: Spanned::detached(name),
        value: Spanned::detached(value),
    }
}

fn json_suite(suite: &JsonSuite) -> Result<DescribeBlock, String> {
    let mut body = Vec::new();
    for (name, value) in &suite.bindings {
        body.push(Spanned::detached(SuiteItem::Let(binding(false, name.clone(), json_expr(value)?))));
    }
    for spec in &suite.it {
        let statements = spec
            .expect
            .iter()
            .map(|e| {
                Ok(Spanned::detached(Statement::Expect(ExpectStmt {
                    actual: Spanned::detached(json_expr(&e.actual)?),
                    negated: e.not,
                    matcher: Spanned::detached(e.matcher.clone()),
                    args: e
                        .expected
                        .iter()
                        .map(|v| json_expr(v).map(Spanned::detached))
                        .collect::<Result<_, String>>()?,
                })))
            })
            .collect::<Result<Vec<_>, String>>()?;
        body.push(Spanned::detached(SuiteItem::It(ItBlock {
            description: spec.description.clone(),
            body: statements,
        })));
    }
    for nested in &suite.describe {
        body.push(Spanned::detached(SuiteItem::Describe(json_suite(nested)?)));
    }
    Ok(DescribeBlock {
        description: suite.description.clone(),
        body,
    })
}

/// `{"ref": "name"}` is a binding reference; every other value is a literal.
fn json_expr(value: &serde_json::Value) -> Result<Expr, String> {
    use serde_json::Value as J;
    let expr = match value {
        J::Null => Expr::Literal(Literal::Null),
        J::Bool(b) => Expr::Literal(Literal::Bool(*b)),
        J::Number(n) => match n.as_i64() {
            Some(i) => Expr::Literal(Literal::Int(i)),
            None => Expr::Literal(Literal::Float(n.as_f64().ok_or_else(|| format!("unsupported number {}", n))?)),
        },
        J::String(s) => Expr::Literal(Literal::String(s.clone())),
        J::Array(items) => Expr::List(
            items
                .iter()
                .map(|v| json_expr(v).map(Spanned::detached))
                .collect::<Result<_, _>>()?,
        ),
        J::Object(map) => match (map.len(), map.get("ref")) {
            (1, Some(J::String(name))) => Expr::Ident(name.clone()),
            _ => return Err(format!("objects must have the form {{\"ref\": \"name\"}}, found {}", value)),
        },
    };
    Ok(expr)
}

/// Loaders by extension.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn ModuleLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `.bdd` loader.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.loaders.push(Box::new(ScriptLoader));
        registry
    }

    /// Register `loader` for its extension.
    ///
    /// Registering the same loader twice is a no-op.
    ///
    /// ## Errors
    /// [`LoadError::ConflictingLoader`] if a different loader already owns the extension.
    pub fn register(&mut self, loader: Box<dyn ModuleLoader>) -> Result<(), LoadError> {
        match self.loaders.iter().find(|l| l.extension() == loader.extension()) {
            Some(existing) if existing.name() == loader.name() => Ok(()),
            Some(existing) => Err(LoadError::ConflictingLoader {
                extension: loader.extension(),
                existing: existing.name(),
                requested: loader.name(),
            }),
            None => {
                tracing::debug!(extension = loader.extension(), loader = loader.name(), "registered loader");
                self.loaders.push(loader);
                Ok(())
            }
        }
    }

    pub fn for_path(&self, path: &Path) -> Option<&dyn ModuleLoader> {
        let ext = path.extension()?.to_str()?;
        self.loaders.iter().find(|l| l.extension() == ext).map(|l| l.as_ref())
    }

    /// Registered extensions in registration order.
    pub fn extensions(&self) -> Vec<String> {
        self.loaders.iter().map(|l| l.extension().to_string()).collect()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.extensions())
            .finish()
    }
}
