//! Script host: loads spec and helper modules and registers their suites with the runtime.
//!
//! ## Modules
//!
//! - `loader` - extension → loader registry (`.bdd` scripts, `.json` documents)
//! - `eval` - expression evaluation and spec bodies
//! - `fixtures` - bindings published by helpers
//!
//! ## Scoping
//!
//! Every module sees, innermost first: its own bindings and imports, then the fixture registry.
//! Suite-level `let`s are evaluated when the file loads, before any spec runs; statements in
//! `it` bodies run when the environment executes.

pub mod eval;
pub mod fixtures;
pub mod loader;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use miette::Diagnostic;
use specdrive_runtime::{DEFAULT_WAIT_TIMEOUT, Environment, Matcher, SuiteId, Value};
use specdrive_syntax::SyntaxReport;
use specdrive_syntax::ast::{DescribeBlock, Item, ItBlock, Module, Span, Statement, SuiteItem};
use thiserror::Error;

use eval::{EvalError, Scope, SourceInfo};
pub use fixtures::FixtureRegistry;
pub use loader::{JsonLoader, LoaderRegistry, ModuleLoader, ScriptLoader};

#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxReport),

    #[error("invalid JSON module {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    #[error("no loader for {}", path.display())]
    #[diagnostic(help("recognized extensions: {extensions}"))]
    UnsupportedExtension { path: PathBuf, extensions: String },

    #[error("cannot resolve import \"{import}\" from {}", from.display())]
    #[diagnostic(help("imports are resolved against the importing file's directory, then each --include path"))]
    UnresolvedImport { import: String, from: PathBuf },

    #[error("import cycle: {chain}")]
    ImportCycle { chain: String },

    #[error("{location}: {message}")]
    Eval { location: String, message: String },

    #[error("{location}: unknown matcher `{name}`")]
    #[diagnostic(help("available matchers: {available}"))]
    UnknownMatcher {
        location: String,
        name: String,
        available: String,
    },

    #[error("extension `{extension}` is already handled by the {existing} loader, cannot register {requested}")]
    ConflictingLoader {
        extension: &'static str,
        existing: &'static str,
        requested: &'static str,
    },
}

/// Exported bindings of a loaded module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleExports {
    /// In declaration order
    pub bindings: Vec<(String, Value)>,
    /// Top-level `describe` blocks in the module (not registered)
    pub suites: usize,
}

/// Parsed module plus its origin.
struct Loaded {
    module: Module,
    source: Rc<SourceInfo>,
}

pub struct ScriptHost {
    loaders: LoaderRegistry,
    include_paths: Vec<PathBuf>,
    wait_timeout: Duration,
    /// Modules currently being loaded, outermost first
    loading: Vec<PathBuf>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new(LoaderRegistry::with_defaults())
    }
}

impl ScriptHost {
    pub fn new(loaders: LoaderRegistry) -> Self {
        Self {
            loaders,
            include_paths: Vec::new(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            loading: Vec::new(),
        }
    }

    pub fn with_include_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.include_paths = paths;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Load a helper-style module and return its exports.
    ///
    /// `describe` blocks are counted but not registered.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load_exports(&mut self, path: &Path, fixtures: &FixtureRegistry) -> Result<ModuleExports, LoadError> {
        let loaded = self.read_module(path)?;
        let scope = self.module_scope(path, &loaded, fixtures)?;
        Ok(ModuleExports {
            bindings: exports_of(&loaded.module, &scope),
            suites: loaded.module.suites().count(),
        })
    }

    /// Load a spec file and register its suites and specs with `env`.
    ///
    /// Returns the number of top-level suites registered.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load_spec(
        &mut self,
        path: &Path,
        env: &mut Environment,
        fixtures: &FixtureRegistry,
    ) -> Result<usize, LoadError> {
        let loaded = self.read_module(path)?;
        let scope = Rc::new(self.module_scope(path, &loaded, fixtures)?);

        let mut registered = 0;
        for item in loaded.module.suites() {
            if let Item::Describe(block) = &item.node {
                register_suite(env, None, block, item.span, &scope, &loaded.source)?;
                registered += 1;
            }
        }
        tracing::debug!(suites = registered, "loaded spec file");
        Ok(registered)
    }

    // ========================================================================
    // Module loading
    // ========================================================================

    fn read_module(&self, path: &Path) -> Result<Loaded, LoadError> {
        let loader = self
            .loaders
            .for_path(path)
            .ok_or_else(|| LoadError::UnsupportedExtension {
                path: path.to_path_buf(),
                extensions: self.loaders.extensions().join(", "),
            })?;
        let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let module = loader.compile(path, &text)?;
        let positions = loader.has_positions().then_some(text.as_str());
        Ok(Loaded {
            module,
            source: Rc::new(SourceInfo::new(path.display().to_string(), positions)),
        })
    }

    /// Evaluate a module's imports and top-level bindings, in order.
    fn module_scope(&mut self, path: &Path, loaded: &Loaded, fixtures: &FixtureRegistry) -> Result<Scope, LoadError> {
        let mut root = Scope::root();
        for (name, value) in fixtures.iter() {
            root.define(name, value.clone());
        }
        let mut scope = Scope::child(&Rc::new(root));

        for item in &loaded.module.items {
            match &item.node {
                Item::Import(import) => {
                    let target = self.resolve_import(import, path)?;
                    for (name, value) in self.load_import(&target, fixtures)? {
                        scope.define(name, value);
                    }
                }
                Item::Binding(binding) => {
                    let value = eval::eval(&binding.value, &scope).map_err(|e| eval_error(&loaded.source, e))?;
                    scope.define(binding.name.node.clone(), value);
                }
                Item::Describe(_) => {}
            }
        }
        Ok(scope)
    }

    fn load_import(&mut self, target: &Path, fixtures: &FixtureRegistry) -> Result<Vec<(String, Value)>, LoadError> {
        if let Some(start) = self.loading.iter().position(|p| p == target) {
            let mut chain: Vec<String> = self.loading[start..].iter().map(|p| p.display().to_string()).collect();
            chain.push(target.display().to_string());
            return Err(LoadError::ImportCycle {
                chain: chain.join(" -> "),
            });
        }

        self.loading.push(target.to_path_buf());
        let result = self.read_module(target).and_then(|loaded| {
            let scope = self.module_scope(target, &loaded, fixtures)?;
            Ok(exports_of(&loaded.module, &scope))
        });
        self.loading.pop();
        result
    }

    /// Resolve `import` against the importing file's directory, then each include path.
    fn resolve_import(&self, import: &str, from: &Path) -> Result<PathBuf, LoadError> {
        let base = from.parent().map(Path::to_path_buf).unwrap_or_default();
        std::iter::once(base)
            .chain(self.include_paths.iter().cloned())
            .map(|dir| dir.join(import))
            .find(|candidate| candidate.is_file())
            .map(|found| fs::canonicalize(&found).unwrap_or(found))
            .ok_or_else(|| LoadError::UnresolvedImport {
                import: import.to_string(),
                from: from.to_path_buf(),
            })
    }
}

/// Register `block` (and everything nested in it) under `parent`.
fn register_suite(
    env: &mut Environment,
    parent: Option<SuiteId>,
    block: &DescribeBlock,
    span: Span,
    scope: &Rc<Scope>,
    source: &Rc<SourceInfo>,
) -> Result<(), LoadError> {
    let mut suite_scope = Scope::child(scope);
    for item in &block.body {
        if let SuiteItem::Let(binding) = &item.node {
            let value = eval::eval(&binding.value, &suite_scope).map_err(|e| eval_error(source, e))?;
            suite_scope.define(binding.name.node.clone(), value);
        }
    }
    let suite_scope = Rc::new(suite_scope);

    let id = env.describe(parent, block.description.clone());
    tracing::trace!(suite = %block.description, at = %source.location(span), "registering suite");
    for item in &block.body {
        match &item.node {
            SuiteItem::Let(_) => {}
            SuiteItem::It(spec) => {
                check_matchers(spec, source)?;
                let body = eval::spec_body(Rc::new(spec.clone()), Rc::clone(&suite_scope), Rc::clone(source));
                env.it(id, spec.description.clone(), body);
            }
            SuiteItem::Describe(nested) => register_suite(env, Some(id), nested, item.span, &suite_scope, source)?,
        }
    }
    Ok(())
}

/// Reject unknown matchers and wrong argument counts before anything runs.
fn check_matchers(spec: &ItBlock, source: &SourceInfo) -> Result<(), LoadError> {
    for stmt in &spec.body {
        let Statement::Expect(expect) = &stmt.node else {
            continue;
        };
        let location = source.location(expect.matcher.span);
        let matcher = Matcher::from_name(&expect.matcher.node).ok_or_else(|| LoadError::UnknownMatcher {
            location: location.clone(),
            name: expect.matcher.node.clone(),
            available: Matcher::names().collect::<Vec<_>>().join(", "),
        })?;
        matcher
            .check_arity(expect.args.len())
            .map_err(|e| LoadError::Eval {
                location,
                message: e.to_string(),
            })?;
    }
    Ok(())
}

fn exports_of(module: &Module, scope: &Scope) -> Vec<(String, Value)> {
    module
        .exports()
        .filter_map(|b| scope.lookup(&b.name.node).map(|v| (b.name.node.clone(), v.clone())))
        .collect()
}

fn eval_error(source: &SourceInfo, err: EvalError) -> LoadError {
    LoadError::Eval {
        location: source.location(err.span),
        message: err.message,
    }
}
