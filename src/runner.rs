//! Spec execution: discover spec files, load them into an environment and run it.

use std::io::{self, Write};
use std::path::PathBuf;

use miette::Diagnostic;
use regex::Regex;
use specdrive_runtime::{Environment, ReporterError, Runner};
use thiserror::Error;

use crate::discovery::{self, ScanError};
use crate::host::{FixtureRegistry, LoadError, ScriptHost};
use crate::reporter::ConsoleReporter;

/// Called once when the run finishes, with the runner and the reporter's log.
pub type OnComplete = Box<dyn FnOnce(&Runner<'_>, &[String])>;

#[derive(Debug, Error, Diagnostic)]
pub enum RunError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Reporter(#[from] ReporterError),

    #[error("failed to start the spec runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// How a run reports.
pub struct RunOptions {
    /// Log passing specs too
    pub verbose: bool,
    /// ANSI colors for glyphs and the summary
    pub show_colors: bool,
    pub on_complete: Option<OnComplete>,
    /// Where the report goes
    pub output: Box<dyn Write>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            show_colors: true,
            on_complete: None,
            output: Box::new(io::stdout()),
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_colors(mut self, show_colors: bool) -> Self {
        self.show_colors = show_colors;
        self
    }

    pub fn with_on_complete(mut self, on_complete: impl FnOnce(&Runner<'_>, &[String]) + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }
}

/// Find every spec file under `entries`, load them all, then run them with the console reporter.
///
/// Load failures abort before any output is produced. Results are only observable through
/// `options.on_complete`.
#[tracing::instrument(skip_all, fields(entries = entries.len()))]
pub fn execute_specs(
    entries: &[PathBuf],
    pattern: &Regex,
    host: &mut ScriptHost,
    fixtures: &FixtureRegistry,
    options: RunOptions,
) -> Result<(), RunError> {
    let files = discovery::scan(entries, pattern)?;
    tracing::debug!(files = files.len(), "found spec files");

    let mut env = Environment::new().with_wait_timeout(host.wait_timeout());
    for file in &files {
        host.load_spec(file, &mut env, fixtures)?;
    }
    tracing::debug!(suites = env.suite_count(), specs = env.spec_count(), "loaded specs");

    let reporter = ConsoleReporter::new(options.output)
        .with_verbose(options.verbose)
        .with_colors(options.show_colors)
        .with_on_complete(options.on_complete);
    env.set_reporter(Box::new(reporter));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(RunError::Runtime)?;
    runtime.block_on(env.execute())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::SpecPatterns;
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn spec_pattern() -> Regex {
        SpecPatterns::from_extensions(&["bdd".to_string()]).unwrap().spec
    }

    #[test]
    fn test_runs_only_spec_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a/oneSpec.bdd", "describe \"one\" { it \"x\" { expect(1).to_equal(1) } }");
        write(dir.path(), "a/two_spec.bdd", "describe \"two\" { it \"y\" { expect(1).to_equal(2) } }");
        write(dir.path(), "a/util.bdd", "describe \"util\" { it \"z\" { fail('never runs') } }");

        let failed = Rc::new(Cell::new(usize::MAX));
        let suites = Rc::new(Cell::new(0));
        let (f, s) = (Rc::clone(&failed), Rc::clone(&suites));
        let options = RunOptions::new()
            .with_output(Box::new(io::sink()))
            .with_on_complete(move |runner, _log| {
                f.set(runner.results().failed_count);
                s.set(runner.suites().len());
            });

        execute_specs(
            &[dir.path().to_path_buf()],
            &spec_pattern(),
            &mut ScriptHost::default(),
            &FixtureRegistry::new(),
            options,
        )
        .unwrap();
        assert_eq!(failed.get(), 1);
        assert_eq!(suites.get(), 2);
    }

    #[test]
    fn test_load_error_aborts_before_reporting() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "badSpec.bdd", "describe \"bad\" {");
        let called = Rc::new(Cell::new(false));
        let c = Rc::clone(&called);

        let err = execute_specs(
            &[dir.path().to_path_buf()],
            &spec_pattern(),
            &mut ScriptHost::default(),
            &FixtureRegistry::new(),
            RunOptions::new()
                .with_output(Box::new(io::sink()))
                .with_on_complete(move |_, _| c.set(true)),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Load(LoadError::Syntax(_))));
        assert!(!called.get());
    }

    #[test]
    fn test_missing_entry_is_scan_error() {
        let dir = TempDir::new().unwrap();
        let err = execute_specs(
            &[dir.path().join("nope")],
            &spec_pattern(),
            &mut ScriptHost::default(),
            &FixtureRegistry::new(),
            RunOptions::new().with_output(Box::new(io::sink())),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Scan(ScanError::Access { .. })));
    }
}
