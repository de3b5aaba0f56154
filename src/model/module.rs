use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{normalize_doc, Atom, AtomKind, Class, Function, QualifiedName, Variable};

/// A module: either a single source file or a package directory.
///
/// Once built the two are indistinguishable; a package's `__init__.py` is
/// merged into the directory module.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    name: String,
    doc: Option<String>,
    path: PathBuf,
    modules: Vec<Module>,
    classes: Vec<Class>,
    functions: Vec<Function>,
    variables: Vec<Variable>,
    owner: QualifiedName,
}

impl Module {
    pub(crate) fn new(name: impl Into<String>, path: impl Into<PathBuf>, owner: Option<&str>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            path: path.into(),
            modules: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            owner: QualifiedName::new(owner),
        }
    }

    pub(crate) fn set_doc(&mut self, doc: Option<String>) {
        self.doc = normalize_doc(doc);
    }

    /// Attaches a nested module; empty modules are dropped.
    ///
    /// Returns whether the module was attached.
    pub(crate) fn add_module(&mut self, module: Module) -> bool {
        if module.is_empty() {
            return false;
        }
        self.modules.push(module);
        true
    }

    pub(crate) fn add_class(&mut self, class: Class) {
        self.classes.push(class);
    }

    pub(crate) fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub(crate) fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Merges a package-init module into this directory module.
    ///
    /// The docstring is overwritten; classes, functions and variables are
    /// appended after the ones already present.
    pub(crate) fn merge(&mut self, other: Module) {
        self.doc = other.doc;
        self.classes.extend(other.classes);
        self.functions.extend(other.functions);
        self.variables.extend(other.variables);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name() == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }

    /// True when the module has no classes, no functions and only empty
    /// nested modules.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
            && self.functions.is_empty()
            && self.modules.iter().all(Module::is_empty)
    }
}

impl Atom for Module {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Module
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.name)
    }
}
