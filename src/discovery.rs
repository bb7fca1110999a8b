//! Spec and helper file discovery
//!
//! [`scan`] walks files and directories recursively and keeps every file whose path matches a
//! pattern. Results follow directory listing order; nothing is sorted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access {}: {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot list directory {}: {source}", path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Access { path, .. } | ScanError::ListDir { path, .. } => path,
        }
    }
}

/// The helper and spec file patterns for a set of recognized extensions.
#[derive(Debug, Clone)]
pub struct SpecPatterns {
    /// Any file with a recognized extension
    pub helper: Regex,
    /// `fooSpec.ext`, `foo_spec.ext` or `foo-spec.ext`
    pub spec: Regex,
}

impl SpecPatterns {
    pub fn from_extensions(extensions: &[String]) -> Result<Self, regex::Error> {
        let alternatives = extensions.iter().map(|e| regex::escape(e)).collect::<Vec<_>>().join("|");
        Ok(Self {
            helper: Regex::new(&format!(r"\.(?:{})$", alternatives))?,
            spec: Regex::new(&format!(r"(?:_s|-s|S)pec\.(?:{})$", alternatives))?,
        })
    }
}

/// Every file under `entries` whose path matches `pattern`.
///
/// Entries are resolved against the working directory. Files are tested against the pattern;
/// directories are descended into (never tested); anything else is skipped. Symlinks are
/// followed without cycle detection.
///
/// ## Errors
/// Fails on the first entry that does not exist or directory that cannot be listed.
#[tracing::instrument(skip_all, fields(entries = entries.len(), pattern = %pattern))]
pub fn scan(entries: &[PathBuf], pattern: &Regex) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    for entry in entries {
        let path = std::path::absolute(entry).map_err(|source| ScanError::Access {
            path: entry.clone(),
            source,
        })?;
        scan_entry(&path, pattern, &mut found)?;
    }
    Ok(found)
}

fn scan_entry(path: &Path, pattern: &Regex, found: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    let metadata = fs::metadata(path).map_err(|source| ScanError::Access {
        path: path.to_path_buf(),
        source,
    })?;

    if metadata.is_file() {
        if pattern.is_match(&path.to_string_lossy()) {
            tracing::debug!(file = %path.display(), "matched");
            found.push(path.to_path_buf());
        }
    } else if metadata.is_dir() {
        let list_err = |source| ScanError::ListDir {
            path: path.to_path_buf(),
            source,
        };
        for child in fs::read_dir(path).map_err(list_err)? {
            let child = child.map_err(list_err)?;
            scan_entry(&child.path(), pattern, found)?;
        }
    }
    Ok(())
}
