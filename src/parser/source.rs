use std::path::{Path, PathBuf};

use tree_sitter::Node;

use crate::error::{DocError, Result};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parses Python source files into tree-sitter syntax trees.
///
/// Files that do not parse cleanly are rejected with a syntax error carrying
/// the 1-based position of the first offending node.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceParser;

impl SourceParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let source = std::fs::read_to_string(path).map_err(|e| DocError::io(path, e))?;
        self.parse_source(&source, path)
    }

    pub fn parse_source(&self, source: &str, path: impl Into<PathBuf>) -> Result<ParsedFile> {
        let path = path.into();
        let source = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| DocError::syntax(&path, 1, 1, e.to_string()))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| DocError::syntax(&path, 1, 1, "failed to parse source"))?;

        let parsed = ParsedFile {
            tree,
            source: source.to_string(),
            path,
        };
        parsed.check_syntax()?;
        Ok(parsed)
    }
}

pub struct ParsedFile {
    pub tree: tree_sitter::Tree,
    pub source: String,
    pub path: PathBuf,
}

impl ParsedFile {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn source_bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    pub fn node_text(&self, node: &Node) -> &str {
        node.utf8_text(self.source_bytes()).unwrap_or("")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_syntax(&self) -> Result<()> {
        let root = self.root_node();
        if !root.has_error() {
            return Ok(());
        }

        let node = first_error(root).unwrap_or(root);
        let position = node.start_position();
        let message = if node.is_missing() {
            format!("expected `{}`", node.kind())
        } else {
            let snippet: String = self
                .node_text(&node)
                .lines()
                .next()
                .unwrap_or("")
                .chars()
                .take(40)
                .collect();
            format!("invalid syntax near `{}`", snippet.trim())
        };

        Err(DocError::syntax(
            &self.path,
            position.row + 1,
            position.column + 1,
            message,
        ))
    }
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find_map(first_error);
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_source_module() {
        let parser = SourceParser::new();
        let parsed = parser
            .parse_source("def hello():\n    pass\n", "hello.py")
            .unwrap();

        let root = parsed.root_node();
        assert_eq!(root.kind(), "module");
        assert_eq!(parsed.path(), Path::new("hello.py"));
        assert_eq!(parsed.node_text(&root), "def hello():\n    pass\n");
    }

    #[test]
    fn test_parse_source_empty() {
        let parser = SourceParser::new();
        let parsed = parser.parse_source("", "empty.py").unwrap();
        assert_eq!(parsed.source, "");
        assert_eq!(parsed.root_node().named_child_count(), 0);
    }

    #[test]
    fn test_syntax_error_position() {
        let parser = SourceParser::new();
        let err = parser
            .parse_source("x = 1\ndef broken(:\n    pass\n", "broken.py")
            .err()
            .expect("should fail");

        assert_eq!(err.kind(), ErrorKind::Syntax);
        match err {
            DocError::Syntax { path, line, .. } => {
                assert_eq!(path, PathBuf::from("broken.py"));
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_file_with_byte_order_mark() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.py");
        std::fs::write(&path, "\u{feff}\"\"\"Doc.\"\"\"\ndef f():\n    pass\n").unwrap();

        let parsed = SourceParser::new().parse_file(&path).unwrap();

        assert!(parsed.source.starts_with("\"\"\"Doc."));
        assert_eq!(parsed.root_node().named_child_count(), 2);
    }

    #[test]
    fn test_parse_missing_file() {
        let parser = SourceParser::new();
        let err = parser
            .parse_file(Path::new("/nonexistent/module.py"))
            .err()
            .expect("should fail");
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
