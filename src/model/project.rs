use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{normalize_doc, Atom, AtomKind, Class, Function, Module};

/// An external document (README-like file) attached to a project
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    name: String,
    path: PathBuf,
    doc: Option<String>,
}

impl Document {
    pub(crate) fn new(name: impl Into<String>, path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            doc: normalize_doc(Some(contents)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Atom for Document {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Document
    }

    fn owner(&self) -> Option<&str> {
        None
    }

    fn qualified_name(&self) -> &str {
        &self.name
    }
}

/// Root of the documentation model
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    name: String,
    doc: Option<String>,
    metadata: BTreeMap<String, serde_json::Value>,
    documents: Vec<Document>,
    modules: Vec<Module>,
}

impl Project {
    pub(crate) fn new(name: impl Into<String>, doc: Option<String>) -> Self {
        Self {
            name: name.into(),
            doc: normalize_doc(doc),
            metadata: BTreeMap::new(),
            documents: Vec::new(),
            modules: Vec::new(),
        }
    }

    pub(crate) fn set_metadata(&mut self, metadata: BTreeMap<String, serde_json::Value>) {
        self.metadata = metadata;
    }

    pub(crate) fn add_document(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Attaches a top-level module; empty modules are dropped.
    pub(crate) fn add_module(&mut self, module: Module) -> bool {
        if module.is_empty() {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub fn metadata(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.metadata
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Top-level modules, in discovery order
    pub fn top_level_modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn is_empty(&self) -> bool {
        self.modules.iter().all(Module::is_empty)
    }

    /// Pre-order walk over the module tree, visiting modules down to
    /// `max_depth` (top-level modules are at depth 1; `None` is unbounded).
    pub fn walk(&self, max_depth: Option<usize>) -> ModuleWalk<'_> {
        ModuleWalk::new(&self.modules, max_depth)
    }

    /// All modules reachable within `max_depth`, sorted by qualified name.
    ///
    /// `Some(0)` returns the top-level modules only.
    pub fn modules(&self, max_depth: Option<usize>) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        for module in self.walk(max_depth) {
            modules.extend(module.modules());
        }

        modules.sort_by(|a, b| a.qualified_name().cmp(b.qualified_name()));
        modules
    }

    /// Module-level functions within `max_depth`, sorted by name.
    pub fn functions(&self, max_depth: Option<usize>) -> Vec<&Function> {
        let mut functions: Vec<&Function> = self
            .walk(max_depth)
            .flat_map(|m| m.functions())
            .collect();

        functions.sort_by(|a, b| a.name().cmp(b.name()));
        functions
    }

    /// Module-level classes within `max_depth`, sorted by name.
    pub fn classes(&self, max_depth: Option<usize>) -> Vec<&Class> {
        let mut classes: Vec<&Class> = self.walk(max_depth).flat_map(|m| m.classes()).collect();

        classes.sort_by(|a, b| a.name().cmp(b.name()));
        classes
    }

    /// Looks up a module by its fully-qualified name.
    pub fn find(&self, qualified_name: &str) -> Option<&Module> {
        self.walk(None)
            .find(|m| m.qualified_name() == qualified_name)
    }
}

impl Atom for Project {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Project
    }

    fn owner(&self) -> Option<&str> {
        None
    }

    fn qualified_name(&self) -> &str {
        &self.name
    }
}

/// Depth-bounded pre-order iterator over a module tree
pub struct ModuleWalk<'a> {
    stack: Vec<(&'a Module, usize)>,
    max_depth: Option<usize>,
}

impl<'a> ModuleWalk<'a> {
    fn new(roots: &'a [Module], max_depth: Option<usize>) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            max_depth,
        };
        walk.push_children(roots, 1);
        walk
    }

    fn within(&self, depth: usize) -> bool {
        self.max_depth.map_or(true, |max| depth <= max)
    }

    fn push_children(&mut self, modules: &'a [Module], depth: usize) {
        if !self.within(depth) {
            return;
        }
        // reversed so that the first child is popped first
        for module in modules.iter().rev() {
            self.stack.push((module, depth));
        }
    }
}

impl<'a> Iterator for ModuleWalk<'a> {
    type Item = &'a Module;

    fn next(&mut self) -> Option<Self::Item> {
        let (module, depth) = self.stack.pop()?;
        self.push_children(module.modules(), depth + 1);
        Some(module)
    }
}
