use serde::Serialize;

use super::{normalize_doc, Atom, AtomKind, Decorator, Function, QualifiedName};

/// A name bound by a direct assignment in a module or class body
#[derive(Debug, Clone, Serialize)]
pub struct Variable {
    name: String,
    owner: QualifiedName,
}

impl Variable {
    pub(crate) fn new(name: impl Into<String>, owner: Option<&str>) -> Self {
        Self {
            name: name.into(),
            owner: QualifiedName::new(owner),
        }
    }
}

impl Atom for Variable {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Variable
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.name)
    }
}

/// A class definition
#[derive(Debug, Clone, Serialize)]
pub struct Class {
    name: String,
    doc: Option<String>,
    /// Rendered base-class expressions, in source order
    bases: Vec<String>,
    decorators: Vec<Decorator>,
    variables: Vec<Variable>,
    functions: Vec<Function>,
    owner: QualifiedName,
}

impl Class {
    pub(crate) fn new(name: impl Into<String>, doc: Option<String>, owner: Option<&str>) -> Self {
        Self {
            name: name.into(),
            doc: normalize_doc(doc),
            bases: Vec::new(),
            decorators: Vec::new(),
            variables: Vec::new(),
            functions: Vec::new(),
            owner: QualifiedName::new(owner),
        }
    }

    pub(crate) fn add_base(&mut self, base: impl Into<String>) {
        self.bases.push(base.into());
    }

    pub(crate) fn add_decorator(&mut self, decorator: Decorator) {
        self.decorators.push(decorator);
    }

    pub(crate) fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub(crate) fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Methods, in source order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn method(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name() == name)
    }
}

impl Atom for Class {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Class
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.name)
    }
}
