use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::exclude::ExcludeFilter;
use crate::error::{DocError, Result};

pub const SOURCE_EXTENSION: &str = "py";
pub const PACKAGE_INIT: &str = "__init__.py";
pub const ENTRY_POINT: &str = "__main__.py";

/// A directory of Python sources found by the [`PathWalker`]
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDir {
    pub name: String,
    pub path: PathBuf,
    /// Package init file, when present
    pub init: Option<PathBuf>,
    /// Subdirectories and source files, sorted by file name
    pub children: Vec<SourceNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceNode {
    Dir(SourceDir),
    File(PathBuf),
}

impl SourceDir {
    fn new(path: &Path) -> Self {
        Self {
            name: file_name(path),
            path: path.to_path_buf(),
            init: None,
            children: Vec::new(),
        }
    }

    pub fn dirs(&self) -> impl Iterator<Item = &SourceDir> {
        self.children.iter().filter_map(|child| match child {
            SourceNode::Dir(dir) => Some(dir),
            SourceNode::File(_) => None,
        })
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.children.iter().filter_map(|child| match child {
            SourceNode::File(path) => Some(path.as_path()),
            SourceNode::Dir(_) => None,
        })
    }

    /// Number of source files in this directory and below, init files
    /// included.
    pub fn file_count(&self) -> usize {
        let own = self.files().count() + usize::from(self.init.is_some());
        own + self.dirs().map(SourceDir::file_count).sum::<usize>()
    }
}

/// Walks package directories, collecting Python sources.
///
/// Exclusion patterns are applied to directories and files alike, relative
/// to the project root. Entry-point scripts (`__main__.py`) are never
/// collected. Symbolic links are followed; a link that loops back to an
/// ancestor is reported and skipped.
pub struct PathWalker<'a> {
    root: &'a Path,
    filter: &'a ExcludeFilter,
}

impl<'a> PathWalker<'a> {
    pub fn new(root: &'a Path, filter: &'a ExcludeFilter) -> Self {
        Self { root, filter }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        self.filter.is_excluded(relative)
    }

    pub fn walk(&self, dir: &Path) -> Result<SourceDir> {
        let walker = WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded(entry.path()));

        let mut stack: Vec<SourceDir> = Vec::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.loop_ancestor().is_some() => {
                    warn!(
                        "Skipping symlink loop at {}",
                        err.path().unwrap_or(dir).display()
                    );
                    continue;
                }
                Err(err) if is_dangling_link(&err) => {
                    warn!(
                        "Skipping dangling symlink {}",
                        err.path().unwrap_or(dir).display()
                    );
                    continue;
                }
                Err(err) => return Err(DocError::walk(dir, err)),
            };

            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Err(DocError::io(
                        entry.path(),
                        std::io::Error::new(
                            std::io::ErrorKind::InvalidInput,
                            "package path is not a directory",
                        ),
                    ));
                }
                stack.push(SourceDir::new(entry.path()));
                continue;
            }

            while stack.len() > entry.depth() {
                pop_into_parent(&mut stack);
            }

            let path = entry.path();
            if entry.file_type().is_dir() {
                stack.push(SourceDir::new(path));
                continue;
            }

            let Some(current) = stack.last_mut() else {
                continue;
            };
            let name = file_name(path);
            if name == PACKAGE_INIT {
                current.init = Some(path.to_path_buf());
            } else if name == ENTRY_POINT {
                debug!("Skipping entry point {}", path.display());
            } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                current.children.push(SourceNode::File(path.to_path_buf()));
            }
        }

        while stack.len() > 1 {
            pop_into_parent(&mut stack);
        }

        stack.pop().ok_or_else(|| {
            DocError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "package directory not found"),
            )
        })
    }
}

fn pop_into_parent(stack: &mut Vec<SourceDir>) {
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(SourceNode::Dir(done));
        }
    }
}

fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
    not_found
        && err
            .path()
            .and_then(|path| std::fs::symlink_metadata(path).ok())
            .is_some_and(|meta| meta.file_type().is_symlink())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn names(dir: &SourceDir) -> Vec<String> {
        dir.children
            .iter()
            .map(|child| match child {
                SourceNode::Dir(d) => format!("{}/", d.name),
                SourceNode::File(p) => file_name(p),
            })
            .collect()
    }

    #[test]
    fn test_walk_collects_sources_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "pkg/__init__.py", "");
        create_file(root, "pkg/zeta.py", "");
        create_file(root, "pkg/alpha.py", "");
        create_file(root, "pkg/notes.txt", "");
        create_file(root, "pkg/sub/mod.py", "");

        let filter = ExcludeFilter::defaults();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(tree.name, "pkg");
        assert_eq!(tree.init, Some(root.join("pkg/__init__.py")));
        assert_eq!(names(&tree), vec!["alpha.py", "sub/", "zeta.py"]);
        assert_eq!(tree.file_count(), 4);
    }

    #[test]
    fn test_walk_skips_entry_points_and_excluded() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "pkg/__main__.py", "");
        create_file(root, "pkg/api.py", "");
        create_file(root, "pkg/test_api.py", "");
        create_file(root, "pkg/tests/test_more.py", "");
        create_file(root, "pkg/__pycache__/api.cpython-311.pyc", "");

        let filter = ExcludeFilter::defaults();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(names(&tree), vec!["api.py"]);
        assert!(tree.init.is_none());
    }

    #[test]
    fn test_walk_keeps_directories_without_init() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "pkg/plain/helpers.py", "");
        fs::create_dir_all(root.join("pkg/empty")).unwrap();

        let filter = ExcludeFilter::default();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(names(&tree), vec!["empty/", "plain/"]);
        let plain = tree.dirs().find(|d| d.name == "plain").unwrap();
        assert_eq!(plain.files().count(), 1);
    }

    #[test]
    fn test_walk_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let filter = ExcludeFilter::default();
        let err = PathWalker::new(temp_dir.path(), &filter)
            .walk(&temp_dir.path().join("missing"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_symlink_loops() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "pkg/mod.py", "");
        std::os::unix::fs::symlink(root.join("pkg"), root.join("pkg/again")).unwrap();

        let filter = ExcludeFilter::default();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(names(&tree), vec!["mod.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_follows_symlinked_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "shared/common.py", "");
        fs::create_dir_all(root.join("pkg")).unwrap();
        std::os::unix::fs::symlink(root.join("shared/common.py"), root.join("pkg/common.py"))
            .unwrap();

        let filter = ExcludeFilter::default();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(names(&tree), vec!["common.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_skips_dangling_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        create_file(root, "pkg/core.py", "");
        std::os::unix::fs::symlink("user@host.1234", root.join("pkg/.#core.py")).unwrap();
        std::os::unix::fs::symlink(root.join("missing"), root.join("pkg/gone")).unwrap();

        let filter = ExcludeFilter::default();
        let tree = PathWalker::new(root, &filter).walk(&root.join("pkg")).unwrap();

        assert_eq!(names(&tree), vec!["core.py"]);
    }
}
