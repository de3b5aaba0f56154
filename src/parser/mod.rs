//! Python source parsing
//!
//! Source files are parsed with tree-sitter, expressions are lowered into a
//! closed [`Expr`] union, and model entities are built from the syntax tree
//! by [`ModelExtractor`].

pub mod expr;
pub mod extractor;
pub mod literal;
pub mod render;
pub mod source;

pub use expr::{Arguments, Expr};
pub use extractor::ModelExtractor;
pub use render::{render, render_expr, INVALID_MARKER, UNKNOWN_MARKER};
pub use source::{ParsedFile, SourceParser};
