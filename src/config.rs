//! Build options

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DocError, Result};
use crate::metadata::MetadataOverrides;
use crate::walker::{find_ignore_file, read_ignore_file, ExcludeFilter};

pub const DEFAULT_README: &str = "README.md";

/// Options for a single project build.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub root: PathBuf,
    pub overrides: MetadataOverrides,
    /// Exclusion patterns; `None` uses the defaults, an explicit list
    /// replaces them
    pub exclude: Option<Vec<String>>,
    /// Also exclude the patterns of the first ignore file in the root
    pub read_ignore_file: bool,
    pub documents: Vec<PathBuf>,
    /// Read `pyproject.toml` from the root
    pub use_descriptor: bool,
    /// README used as the project docstring; defaults to `README.md`
    pub readme: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            overrides: MetadataOverrides::default(),
            exclude: None,
            read_ignore_file: false,
            documents: Vec::new(),
            use_descriptor: true,
            readme: None,
        }
    }
}

impl BuildOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_overrides(mut self, overrides: MetadataOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_ignore_file(mut self, read_ignore_file: bool) -> Self {
        self.read_ignore_file = read_ignore_file;
        self
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents.push(path.into());
        self
    }

    pub fn with_descriptor(mut self, use_descriptor: bool) -> Self {
        self.use_descriptor = use_descriptor;
        self
    }

    pub fn with_readme(mut self, path: impl Into<PathBuf>) -> Self {
        self.readme = Some(path.into());
        self
    }

    /// Resolves a path given relative to the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Checks the options that do not depend on the descriptor.
    pub fn validate(&self) -> Result<()> {
        if self.documents.iter().any(|d| d.as_os_str().is_empty()) {
            return Err(DocError::config("`documents` contains an empty path"));
        }
        if self
            .exclude
            .as_ref()
            .is_some_and(|patterns| patterns.iter().any(|p| p.is_empty()))
        {
            return Err(DocError::config("`exclude` contains an empty pattern"));
        }
        Ok(())
    }

    /// Builds the exclusion filter: the explicit list (or the defaults),
    /// plus the ignore file patterns when requested.
    pub fn exclude_filter(&self) -> Result<ExcludeFilter> {
        let mut filter = match &self.exclude {
            Some(patterns) => ExcludeFilter::new(patterns)?,
            None => ExcludeFilter::defaults(),
        };

        if self.read_ignore_file {
            match find_ignore_file(&self.root) {
                Some(path) => filter = filter.with_ignore_patterns(read_ignore_file(&path)?),
                None => debug!("No ignore file in {}", self.root.display()),
            }
        }

        Ok(filter)
    }
}
