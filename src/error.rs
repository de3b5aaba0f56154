use std::path::{Path, PathBuf};

use thiserror::Error;

/// Coarse classification of a [`DocError`], for callers that only need to
/// decide how to report a failed build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Io,
    Configuration,
}

#[derive(Error, Debug)]
pub enum DocError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in {}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        detail: Option<String>,
    },
}

impl DocError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn syntax(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        DocError::Syntax {
            path: path.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DocError::Configuration {
            message: message.into(),
            detail: None,
        }
    }

    pub fn config_with_detail(message: impl Into<String>, detail: impl Into<String>) -> Self {
        DocError::Configuration {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// Converts a `walkdir` failure, keeping the offending path when known.
    pub fn walk(root: &Path, err: walkdir::Error) -> Self {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
        DocError::Io { path, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DocError::Io { .. } => ErrorKind::Io,
            DocError::Syntax { .. } => ErrorKind::Syntax,
            DocError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Optional diagnostic text to show below the main message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            DocError::Configuration { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocError>;
