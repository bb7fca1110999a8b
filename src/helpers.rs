//! Helper modules: shared fixtures loaded before any spec file.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::discovery;
use crate::host::{FixtureRegistry, ScriptHost};
use crate::runner::RunError;

/// Load every helper under `dir` and publish its exports into `fixtures`.
///
/// Helpers load in scan order and see the fixtures published by earlier helpers. A later
/// export with an existing name replaces the earlier value. A missing `dir` means there are no
/// helpers.
///
/// Returns the helper files that were loaded.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn load_helpers(
    dir: &Path,
    pattern: &Regex,
    host: &mut ScriptHost,
    fixtures: &mut FixtureRegistry,
) -> Result<Vec<PathBuf>, RunError> {
    if !dir.exists() {
        tracing::debug!("no helpers directory");
        return Ok(Vec::new());
    }

    let helpers = discovery::scan(&[dir.to_path_buf()], pattern)?;
    for helper in &helpers {
        let exports = host.load_exports(helper, fixtures)?;
        if exports.suites > 0 {
            tracing::warn!(
                helper = %helper.display(),
                suites = exports.suites,
                "ignoring describe blocks in helper"
            );
        }
        for (name, value) in exports.bindings {
            if let Some(previous) = fixtures.insert(name.as_str(), value) {
                tracing::debug!(%name, %previous, "fixture replaced");
            }
        }
        tracing::debug!(helper = %helper.display(), fixtures = fixtures.len(), "loaded helper");
    }
    Ok(helpers)
}
