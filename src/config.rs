//! Run configuration for specdrive
//!
//! Defaults follow the conventional project layout (`spec/bdd`, `.bdd` files). Environment
//! variables override the defaults; CLI flags are layered on top by the caller.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use specdrive_runtime::DEFAULT_WAIT_TIMEOUT;

/// Default spec directory, relative to the working directory
pub const DEFAULT_SPEC_DIR: &str = "spec/bdd";
/// Directory under the spec root holding helper modules
pub const HELPERS_DIR: &str = "helpers";
/// Overrides [`DEFAULT_SPEC_DIR`]
pub const SPEC_DIR_ENV: &str = "SPECDRIVE_SPEC_DIR";
/// Overrides the `wait` timeout, in milliseconds
pub const WAIT_TIMEOUT_ENV: &str = "SPECDRIVE_WAIT_TIMEOUT_MS";

/// Run configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SpecdriveConfig {
    /// Root directory searched for specs when no paths are given
    pub spec_dir: PathBuf,
    /// Recognized module extensions, without the dot
    pub extensions: Vec<String>,
    /// Extra directories searched by `import`
    pub include_paths: Vec<PathBuf>,
    /// Timeout for `wait` in spec bodies
    pub wait_timeout: Duration,
}

impl Default for SpecdriveConfig {
    fn default() -> Self {
        Self {
            spec_dir: PathBuf::from(DEFAULT_SPEC_DIR),
            extensions: vec!["bdd".to_string()],
            include_paths: Vec::new(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl SpecdriveConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with [`SPEC_DIR_ENV`] and [`WAIT_TIMEOUT_ENV`] applied.
    ///
    /// An unparsable timeout is ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = env::var(SPEC_DIR_ENV).ok().filter(|d| !d.is_empty()) {
            config.spec_dir = PathBuf::from(dir);
        }
        if let Ok(raw) = env::var(WAIT_TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.wait_timeout = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "ignoring invalid {}", WAIT_TIMEOUT_ENV),
            }
        }
        config
    }

    /// Set the spec root directory
    pub fn with_spec_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spec_dir = dir.into();
        self
    }

    /// Add a recognized extension (no-op if already present)
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        if !self.extensions.contains(&ext) {
            self.extensions.push(ext);
        }
        self
    }

    /// Append an include path
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Set the `wait` timeout
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// `<spec_dir>/helpers`
    pub fn helpers_dir(&self) -> PathBuf {
        self.spec_dir.join(HELPERS_DIR)
    }
}
