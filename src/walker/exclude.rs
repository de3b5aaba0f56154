use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};

use crate::error::{DocError, Result};

/// Patterns excluded when the caller gives no explicit list
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "env",
    ".env",
    "venv",
    "docs",
    "tests",
    "*.tests",
    "test_*",
    "migrations",
    "__pycache__",
    ".git",
    ".hg",
    ".svn",
];

/// Ignore files looked up in the project root, in order of preference
pub const IGNORE_FILES: &[&str] = &[".gitignore", ".hgignore", ".agignore", ".ignore"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Shell-style exclusion patterns.
///
/// A path is excluded when any pattern matches either its path relative to
/// the project root or its basename.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    patterns: Vec<Pattern>,
}

impl ExcludeFilter {
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::default().with_patterns(patterns)
    }

    pub fn defaults() -> Self {
        Self {
            patterns: DEFAULT_EXCLUDES
                .iter()
                .filter_map(|p| Pattern::new(p).ok())
                .collect(),
        }
    }

    /// Adds patterns; an invalid pattern is a configuration error.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let compiled = Pattern::new(pattern).map_err(|e| {
                DocError::config_with_detail(
                    format!("invalid exclude pattern `{}`", pattern),
                    e.to_string(),
                )
            })?;
            self.patterns.push(compiled);
        }
        Ok(self)
    }

    /// Adds patterns read from an ignore file, skipping the ones that do not
    /// compile.
    pub fn with_ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Pattern::new(pattern) {
                Ok(compiled) => self.patterns.push(compiled),
                Err(e) => warn!("Skipping ignore pattern `{}`: {}", pattern, e),
            }
        }
        self
    }

    pub fn patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(Pattern::as_str).collect()
    }

    pub fn is_excluded(&self, relative: &Path) -> bool {
        let full = relative.to_string_lossy();
        let basename = relative
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        self.patterns.iter().any(|pattern| {
            pattern.matches_with(&full, MATCH_OPTIONS)
                || pattern.matches_with(&basename, MATCH_OPTIONS)
        })
    }
}

/// Finds the first ignore file present in `root`.
pub fn find_ignore_file(root: &Path) -> Option<PathBuf> {
    IGNORE_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Reads exclusion patterns from an ignore file.
///
/// Blank lines, comments and negations are skipped; leading and trailing
/// slashes are stripped since patterns match path components.
pub fn read_ignore_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;

    let patterns: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| line.trim_matches('/').to_string())
        .filter(|line| !line.is_empty())
        .collect();

    debug!(
        "Read {} exclude patterns from {}",
        patterns.len(),
        path.display()
    );
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_basename() {
        let filter = ExcludeFilter::defaults();
        assert!(filter.is_excluded(Path::new("src/pkg/tests")));
        assert!(filter.is_excluded(Path::new("pkg/test_models.py")));
        assert!(filter.is_excluded(Path::new("pkg/unit.tests")));
        assert!(filter.is_excluded(Path::new(".git")));
        assert!(!filter.is_excluded(Path::new("pkg/models.py")));
        assert!(!filter.is_excluded(Path::new("pkg/testing")));
    }

    #[test]
    fn test_patterns_match_full_relative_path() {
        let filter = ExcludeFilter::new(["pkg/generated*"]).unwrap();
        assert!(filter.is_excluded(Path::new("pkg/generated_api.py")));
        assert!(!filter.is_excluded(Path::new("other/generated_api.py")));
    }

    #[test]
    fn test_wildcard_crosses_separators() {
        let filter = ExcludeFilter::new(["*/internal"]).unwrap();
        assert!(filter.is_excluded(Path::new("pkg/sub/internal")));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let filter = ExcludeFilter::new(["Build"]).unwrap();
        assert!(filter.is_excluded(Path::new("Build")));
        assert!(!filter.is_excluded(Path::new("build")));
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = ExcludeFilter::new(["[unclosed"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.detail().is_some());
    }

    #[test]
    fn test_invalid_ignore_patterns_are_skipped() {
        let filter = ExcludeFilter::default().with_ignore_patterns(["build**", "dist", "[oops"]);
        assert_eq!(filter.patterns(), vec!["dist"]);
        assert!(filter.is_excluded(Path::new("pkg/dist")));
    }

    #[test]
    fn test_read_ignore_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".gitignore");
        fs::write(&path, "# build output\n/build/\n\n*.egg-info\n!keep.py\n").unwrap();

        assert_eq!(find_ignore_file(temp_dir.path()), Some(path.clone()));
        assert_eq!(read_ignore_file(&path).unwrap(), vec!["build", "*.egg-info"]);
    }

    #[test]
    fn test_find_ignore_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_ignore_file(temp_dir.path()).is_none());
    }
}
