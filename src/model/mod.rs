//! Documentation model
//!
//! The entities in this module form an immutable ownership tree rooted at a
//! [`Project`]. Each entity keeps a non-owning reference to its owner (the
//! owner's qualified name) which is only used to compute fully-qualified
//! names; traversal always goes from owners down to children.

pub mod class;
pub mod function;
pub mod module;
pub mod project;

pub use class::{Class, Variable};
pub use function::{Decorator, Function, Parameter};
pub use module::Module;
pub use project::{Document, ModuleWalk, Project};

use once_cell::sync::OnceCell;
use serde::{Serialize, Serializer};

/// Kind of a model entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomKind {
    Project,
    Document,
    Module,
    Class,
    Function,
    Parameter,
    Decorator,
    Variable,
}

impl AtomKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomKind::Project => "project",
            AtomKind::Document => "document",
            AtomKind::Module => "module",
            AtomKind::Class => "class",
            AtomKind::Function => "function",
            AtomKind::Parameter => "parameter",
            AtomKind::Decorator => "decorator",
            AtomKind::Variable => "variable",
        }
    }
}

/// Common view over every entity of the model.
pub trait Atom {
    fn name(&self) -> &str;

    fn doc(&self) -> Option<&str> {
        None
    }

    fn kind(&self) -> AtomKind;

    /// Qualified name of the owning atom; `None` when the only owner is the
    /// project (or there is no owner at all).
    fn owner(&self) -> Option<&str>;

    /// Dot-joined chain of names from the top-level module down to this atom.
    fn qualified_name(&self) -> &str;
}

/// Owner reference plus the lazily computed fully-qualified name.
///
/// The joined name is computed on first access and cached; entities are
/// immutable once built so the cache never goes stale.
#[derive(Debug, Clone, Default)]
pub struct QualifiedName {
    owner: Option<String>,
    cache: OnceCell<String>,
}

impl QualifiedName {
    pub fn new(owner: Option<&str>) -> Self {
        Self {
            owner: owner.map(str::to_string),
            cache: OnceCell::new(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn resolve(&self, name: &str) -> &str {
        self.cache.get_or_init(|| match &self.owner {
            Some(owner) => format!("{}.{}", owner, name),
            None => name.to_string(),
        })
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.owner.serialize(serializer)
    }
}

/// Normalizes an optional docstring: blank docstrings are treated as absent.
pub(crate) fn normalize_doc(doc: Option<String>) -> Option<String> {
    doc.filter(|d| !d.trim().is_empty())
}
