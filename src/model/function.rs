use serde::Serialize;

use super::{normalize_doc, Atom, AtomKind, QualifiedName};

/// A function parameter
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    name: String,
    /// Rendered default expression; `None` when the parameter has no default
    default: Option<String>,
    is_vararg: bool,
    is_kwarg: bool,
    is_keyword_only: bool,
    owner: QualifiedName,
}

impl Parameter {
    pub(crate) fn positional(
        name: impl Into<String>,
        default: Option<String>,
        owner: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            default,
            is_vararg: false,
            is_kwarg: false,
            is_keyword_only: false,
            owner: QualifiedName::new(owner),
        }
    }

    pub(crate) fn keyword_only(
        name: impl Into<String>,
        default: Option<String>,
        owner: Option<&str>,
    ) -> Self {
        Self {
            is_keyword_only: true,
            ..Self::positional(name, default, owner)
        }
    }

    pub(crate) fn vararg(name: impl Into<String>, owner: Option<&str>) -> Self {
        Self {
            is_vararg: true,
            ..Self::positional(name, None, owner)
        }
    }

    pub(crate) fn kwarg(name: impl Into<String>, owner: Option<&str>) -> Self {
        Self {
            is_kwarg: true,
            ..Self::positional(name, None, owner)
        }
    }

    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_vararg(&self) -> bool {
        self.is_vararg
    }

    pub fn is_kwarg(&self) -> bool {
        self.is_kwarg
    }

    pub fn is_keyword_only(&self) -> bool {
        self.is_keyword_only
    }

    /// Source-like text of the parameter: `name`, `name=default`, `*name`
    /// or `**name`.
    pub fn render(&self) -> String {
        if self.is_vararg {
            format!("*{}", self.name)
        } else if self.is_kwarg {
            format!("**{}", self.name)
        } else {
            match &self.default {
                Some(default) => format!("{}={}", self.name, default),
                None => self.name.clone(),
            }
        }
    }
}

impl Atom for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Parameter
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.name)
    }
}

/// A decorator, kept as its rendered expression text
#[derive(Debug, Clone, Serialize)]
pub struct Decorator {
    text: String,
    owner: QualifiedName,
}

impl Decorator {
    pub(crate) fn new(text: impl Into<String>, owner: Option<&str>) -> Self {
        Self {
            text: text.into(),
            owner: QualifiedName::new(owner),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Atom for Decorator {
    fn name(&self) -> &str {
        &self.text
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Decorator
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.text)
    }
}

/// A function or method definition
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    name: String,
    doc: Option<String>,
    is_async: bool,
    parameters: Vec<Parameter>,
    decorators: Vec<Decorator>,
    owner: QualifiedName,
}

impl Function {
    pub(crate) fn new(name: impl Into<String>, doc: Option<String>, owner: Option<&str>) -> Self {
        Self {
            name: name.into(),
            doc: normalize_doc(doc),
            is_async: false,
            parameters: Vec::new(),
            decorators: Vec::new(),
            owner: QualifiedName::new(owner),
        }
    }

    pub(crate) fn set_async(&mut self, is_async: bool) {
        self.is_async = is_async;
    }

    pub(crate) fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub(crate) fn add_decorator(&mut self, decorator: Decorator) {
        self.decorators.push(decorator);
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn decorators(&self) -> &[Decorator] {
        &self.decorators
    }

    pub fn vararg(&self) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.is_vararg)
    }

    pub fn kwarg(&self) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.is_kwarg)
    }

    /// Comma-joined parameter list, e.g. `self, x, y=1, *args, key=None, **kw`.
    ///
    /// A bare `*` is inserted before keyword-only parameters when there is
    /// no vararg to separate them.
    pub fn signature(&self) -> String {
        render_parameters(&self.parameters)
    }
}

impl Atom for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn kind(&self) -> AtomKind {
        AtomKind::Function
    }

    fn owner(&self) -> Option<&str> {
        self.owner.owner()
    }

    fn qualified_name(&self) -> &str {
        self.owner.resolve(&self.name)
    }
}

pub(crate) fn render_parameters(parameters: &[Parameter]) -> String {
    let has_vararg = parameters.iter().any(|p| p.is_vararg);
    let mut parts = Vec::with_capacity(parameters.len() + 1);
    let mut separated = has_vararg;

    for parameter in parameters {
        if parameter.is_keyword_only && !separated {
            parts.push("*".to_string());
            separated = true;
        }
        parts.push(parameter.render());
    }

    parts.join(", ")
}
