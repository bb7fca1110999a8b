//! CLI module for specdrive
//!
//! ```text
//! specdrive [OPTIONS] [PATH]...
//! ```
//!
//! With no paths, specs are taken from `spec/bdd` (or `$SPECDRIVE_SPEC_DIR`). Helpers always
//! come from `<spec dir>/helpers`.
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//!
//! ## Design
//!
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits. The process exit code is the
//! negated number of failed expectations.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use crate::config::SpecdriveConfig;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);

    /// Exit code for a finished run: minus the failed expectation count.
    pub fn from_failures(failed: usize) -> Self {
        ExitCode(-i32::try_from(failed).unwrap_or(i32::MAX))
    }
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Run behavior specs written as .bdd scripts
#[derive(Parser, Debug)]
#[command(name = "specdrive")]
#[command(version = VERSION)]
#[command(about = "Run behavior specs written as .bdd scripts", long_about = None)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Spec files or directories (default: spec/bdd)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Enable color coding for output (default)
    #[arg(long, overrides_with = "no_color")]
    pub color: bool,

    /// Disable color coding for output
    #[arg(long = "no-color", overrides_with = "color")]
    pub no_color: bool,

    /// Print every spec, not only failures
    #[arg(long)]
    pub verbose: bool,

    /// Add a directory to the import search path
    #[arg(short = 'i', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Also load .json spec and helper modules
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn show_colors(&self) -> bool {
        !self.no_color
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported as "errors" that go to stdout
            let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            let _ = e.print();
            process::exit(code.0);
        }
    };

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let show_colors = cli.show_colors();
    let config = build_config(SpecdriveConfig::from_env(), &cli)?;
    let entries = spec_entries(&config, cli.paths)?;
    let options = crate::runner::RunOptions::new()
        .with_verbose(cli.verbose)
        .with_colors(show_colors);
    commands::run_specs(&config, &entries, options)
}

/// Layer CLI flags over `config`.
fn build_config(mut config: SpecdriveConfig, cli: &Cli) -> CliResult<SpecdriveConfig> {
    for dir in &cli.include {
        if !dir.exists() {
            return Err(CliError::failure(format!("Include path '{}' doesn't exist!", dir.display())));
        }
        config = config.with_include_path(dir.clone());
    }
    if cli.json {
        config = config.with_extension("json");
    }
    Ok(config)
}

/// Positional paths as given, or the spec directory when there are none.
fn spec_entries(config: &SpecdriveConfig, paths: Vec<PathBuf>) -> CliResult<Vec<PathBuf>> {
    if !paths.is_empty() {
        return Ok(paths);
    }
    if config.spec_dir.exists() {
        Ok(vec![config.spec_dir.clone()])
    } else {
        Err(CliError::failure(format!(
            "I couldn't find a {} directory here, so I'm not sure where your spec files are.\n\
             Give me a path to a spec file or a spec directory.\n",
            config.spec_dir.display()
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["specdrive"]).unwrap();
        assert!(cli.paths.is_empty());
        assert!(cli.show_colors());
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parse_paths_in_order() {
        let cli = Cli::try_parse_from(["specdrive", "spec/a", "--verbose", "spec/b"]).unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from("spec/a"), PathBuf::from("spec/b")]);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_color_last_flag_wins() {
        let cli = Cli::try_parse_from(["specdrive", "--color", "--no-color"]).unwrap();
        assert!(!cli.show_colors());
        let cli = Cli::try_parse_from(["specdrive", "--no-color", "--color"]).unwrap();
        assert!(cli.show_colors());
    }

    #[test]
    fn test_cli_repeatable_include() {
        let cli = Cli::try_parse_from(["specdrive", "-i", "lib", "--include", "vendor"]).unwrap();
        assert_eq!(cli.include, vec![PathBuf::from("lib"), PathBuf::from("vendor")]);
    }

    #[test]
    fn test_cli_json_twice_is_accepted() {
        let cli = Cli::try_parse_from(["specdrive", "--json", "--json"]).unwrap();
        assert!(cli.json);
    }

    #[test]
    fn test_cli_unknown_flag_is_error() {
        let err = Cli::try_parse_from(["specdrive", "--bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_cli_help_is_not_a_failure() {
        let err = Cli::try_parse_from(["specdrive", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert!(!err.use_stderr());
    }

    #[test]
    fn test_exit_code_from_failures() {
        assert_eq!(ExitCode::from_failures(0), ExitCode::SUCCESS);
        assert_eq!(ExitCode::from_failures(3), ExitCode(-3));
    }

    #[test]
    fn test_missing_include_path() {
        let cli = Cli::try_parse_from(["specdrive", "-i", "/definitely/not/here"]).unwrap();
        let err = build_config(SpecdriveConfig::new(), &cli).unwrap_err();
        assert_eq!(err.message, "Include path '/definitely/not/here' doesn't exist!");
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_json_flag_adds_extension() {
        let cli = Cli::try_parse_from(["specdrive", "--json"]).unwrap();
        let config = build_config(SpecdriveConfig::new(), &cli).unwrap();
        assert_eq!(config.extensions, vec!["bdd".to_string(), "json".to_string()]);
    }

    #[test]
    fn test_missing_default_spec_dir() {
        let dir = TempDir::new().unwrap();
        let config = SpecdriveConfig::new().with_spec_dir(dir.path().join("spec/bdd"));
        let err = spec_entries(&config, Vec::new()).unwrap_err();
        assert!(err.message.starts_with("I couldn't find a "));
        assert!(err.message.ends_with("Give me a path to a spec file or a spec directory.\n"));
    }

    #[test]
    fn test_default_spec_dir_is_used() {
        let dir = TempDir::new().unwrap();
        let config = SpecdriveConfig::new().with_spec_dir(dir.path());
        assert_eq!(spec_entries(&config, Vec::new()).unwrap(), vec![dir.path().to_path_buf()]);
        let given = vec![PathBuf::from("x")];
        assert_eq!(spec_entries(&config, given.clone()).unwrap(), given);
    }
}
