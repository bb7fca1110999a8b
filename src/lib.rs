#![forbid(unsafe_code)]
//! specdrive: a behavior-spec runner
//!
//! Spec files (`fooSpec.bdd`, `foo_spec.bdd`, `foo-spec.bdd`) declare nested `describe` suites
//! and `it` specs. specdrive discovers them, loads shared helpers, runs every spec on a
//! single-threaded runtime and prints a progress line, a failure log and a summary.
//!
//! ## Pipeline
//!
//! 1. [`discovery::scan`] finds helper and spec files
//! 2. [`helpers::load_helpers`] publishes helper exports as fixtures
//! 3. [`runner::execute_specs`] loads specs through the [`host::ScriptHost`] and runs them
//! 4. [`reporter::ConsoleReporter`] reports the run
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod helpers;
pub mod host;
pub mod reporter;
pub mod runner;

pub use config::SpecdriveConfig;
pub use discovery::{ScanError, SpecPatterns, scan};
pub use helpers::load_helpers;
pub use host::{FixtureRegistry, LoadError, ScriptHost};
pub use reporter::{ConsoleReporter, RunSummary, format_summary};
pub use runner::{RunError, RunOptions, execute_specs};
