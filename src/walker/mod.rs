//! Source discovery: exclusion patterns and package directory walking

pub mod exclude;
pub mod tree;

pub use exclude::{find_ignore_file, read_ignore_file, ExcludeFilter, DEFAULT_EXCLUDES};
pub use tree::{PathWalker, SourceDir, SourceNode};
