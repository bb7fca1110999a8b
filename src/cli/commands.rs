//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::cell::Cell;
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;

use crate::config::SpecdriveConfig;
use crate::discovery::SpecPatterns;
use crate::helpers;
use crate::host::{FixtureRegistry, JsonLoader, LoaderRegistry, ModuleLoader, ScriptHost, ScriptLoader};
use crate::runner::{self, RunError, RunOptions};

use super::{CliError, CliResult, ExitCode};

/// Load helpers, run every spec under `entries` and turn the failure count into the exit code.
///
/// Any `on_complete` already set in `options` is replaced.
pub fn run_specs(config: &SpecdriveConfig, entries: &[PathBuf], options: RunOptions) -> CliResult<ExitCode> {
    let loaders = loader_registry(&config.extensions)?;
    let mut host = ScriptHost::new(loaders)
        .with_include_paths(config.include_paths.clone())
        .with_wait_timeout(config.wait_timeout);
    let patterns = SpecPatterns::from_extensions(&host.loaders().extensions())
        .map_err(|e| CliError::failure(format!("Error building file patterns: {}", e)))?;

    let mut fixtures = FixtureRegistry::new();
    helpers::load_helpers(&config.helpers_dir(), &patterns.helper, &mut host, &mut fixtures).map_err(render)?;

    let failed = Rc::new(Cell::new(0));
    let sink = Rc::clone(&failed);
    let options = options.with_on_complete(move |runner, _log| {
        let mut stdout = io::stdout();
        let _ = writeln!(stdout);
        let _ = stdout.flush();
        sink.set(runner.results().failed_count);
    });

    runner::execute_specs(entries, &patterns.spec, &mut host, &fixtures, options).map_err(render)?;
    Ok(ExitCode::from_failures(failed.get()))
}

/// One loader per recognized extension.
fn loader_registry(extensions: &[String]) -> CliResult<LoaderRegistry> {
    let mut registry = LoaderRegistry::with_defaults();
    for ext in extensions {
        let loader: Box<dyn ModuleLoader> = match ext.as_str() {
            "bdd" => Box::new(ScriptLoader),
            "json" => Box::new(JsonLoader),
            other => return Err(CliError::failure(format!("Error: no loader for `.{}` files", other))),
        };
        registry
            .register(loader)
            .map_err(|e| CliError::failure(format!("Error: {}", e)))?;
    }
    Ok(registry)
}

/// Render a run error with its diagnostic context.
fn render(err: RunError) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(err)))
}
