pub mod builder;
pub mod config;
pub mod error;
pub mod metadata;
pub mod model;
pub mod parser;
pub mod walker;

pub use builder::{build_project, ProjectBuilder};
pub use config::BuildOptions;
pub use error::{DocError, ErrorKind, Result};
pub use metadata::{Descriptor, Metadata, MetadataOverrides};
pub use model::{
    Atom, AtomKind, Class, Decorator, Document, Function, Module, Parameter, Project, Variable,
};
pub use parser::{render, render_expr, Expr, INVALID_MARKER, UNKNOWN_MARKER};
pub use walker::{ExcludeFilter, DEFAULT_EXCLUDES};
