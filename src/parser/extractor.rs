use tracing::debug;
use tree_sitter::Node;

use super::expr::{lower_expr, Arguments, Expr};
use super::literal::clean_doc;
use super::render::render_expr;
use super::source::ParsedFile;
use crate::error::{DocError, Result};
use crate::model::{Atom, Class, Decorator, Function, Module, Variable};

/// Builds model entities from a parsed source file.
///
/// Each entity is created with the qualified name of its owner, so names
/// resolve without any back-pointers into the tree.
pub struct ModelExtractor<'a> {
    parsed: &'a ParsedFile,
}

impl<'a> ModelExtractor<'a> {
    pub fn new(parsed: &'a ParsedFile) -> Self {
        Self { parsed }
    }

    /// Builds the module for the whole file.
    ///
    /// `owner` is the qualified name of the enclosing package, if any.
    pub fn extract_module(&self, name: &str, owner: Option<&str>) -> Result<Module> {
        let root = self.parsed.root_node();
        let qualified = qualify(owner, name);

        let mut module = Module::new(name, self.parsed.path(), owner);
        module.set_doc(self.docstring(root));

        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            let (definition, decorators) = self.unwrap_decorated(statement);
            match definition.kind() {
                "class_definition" => {
                    module.add_class(self.extract_class(definition, &decorators, &qualified)?)
                }
                "function_definition" => module.add_function(self.extract_function(
                    definition,
                    &decorators,
                    &qualified,
                )?),
                "expression_statement" => {
                    for name in self.assigned_names(definition) {
                        if !module.variables().iter().any(|v| v.name() == name) {
                            module.add_variable(Variable::new(name, Some(&qualified)));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(module)
    }

    fn extract_class(&self, node: Node<'_>, decorators: &[Expr], owner: &str) -> Result<Class> {
        let name = self.field_text(node, "name");
        let qualified = qualify(Some(owner), &name);
        let body = node.child_by_field_name("body");

        let mut class = Class::new(name, body.and_then(|b| self.docstring(b)), Some(owner));

        for decorator in decorators {
            class.add_decorator(Decorator::new(render_expr(decorator), Some(&qualified)));
        }

        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            let mut cursor = superclasses.walk();
            for base in superclasses.named_children(&mut cursor) {
                match base.kind() {
                    // metaclass=... and other class keywords are not bases
                    "keyword_argument" | "dictionary_splat" | "comment" => {}
                    _ => class.add_base(render_expr(&self.lower(base))),
                }
            }
        }

        let Some(body) = body else {
            return Ok(class);
        };

        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            let (definition, decorators) = self.unwrap_decorated(statement);
            match definition.kind() {
                "function_definition" => {
                    class.add_function(self.extract_function(definition, &decorators, &qualified)?)
                }
                "expression_statement" => {
                    for name in self.assigned_names(definition) {
                        if !class.variables().iter().any(|v| v.name() == name) {
                            class.add_variable(Variable::new(name, Some(&qualified)));
                        }
                    }
                }
                "class_definition" => {
                    debug!(
                        "Skipping nested class {} in {}",
                        self.field_text(definition, "name"),
                        qualified
                    );
                }
                _ => {}
            }
        }

        Ok(class)
    }

    fn extract_function(
        &self,
        node: Node<'_>,
        decorators: &[Expr],
        owner: &str,
    ) -> Result<Function> {
        let name = self.field_text(node, "name");
        let qualified = qualify(Some(owner), &name);
        let doc = node
            .child_by_field_name("body")
            .and_then(|body| self.docstring(body));

        let mut function = Function::new(name, doc, Some(owner));

        let mut cursor = node.walk();
        let is_async = node.children(&mut cursor).any(|c| c.kind() == "async");
        function.set_async(is_async);

        for decorator in decorators {
            function.add_decorator(Decorator::new(render_expr(decorator), Some(&qualified)));
        }

        if let Some(params) = node.child_by_field_name("parameters") {
            let arguments = Arguments::lower(params, self.parsed.source_bytes())
                .map_err(|message| self.syntax_error(params, message))?;
            for parameter in arguments.to_parameters(Some(&qualified)) {
                function.add_parameter(parameter);
            }
        }

        Ok(function)
    }

    /// Splits a `decorated_definition` into its definition and decorator
    /// expressions; other statements are returned as is.
    fn unwrap_decorated<'t>(&self, node: Node<'t>) -> (Node<'t>, Vec<Expr>) {
        if node.kind() != "decorated_definition" {
            return (node, Vec::new());
        }

        let mut decorators = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "decorator" {
                continue;
            }
            let mut inner = child.walk();
            let expression = child
                .named_children(&mut inner)
                .find(|c| c.kind() != "comment");
            decorators.push(match expression {
                Some(expression) => self.lower(expression),
                None => Expr::Unsupported(child.kind().to_string()),
            });
        }

        match node.child_by_field_name("definition") {
            Some(definition) => (definition, decorators),
            None => (node, Vec::new()),
        }
    }

    /// Docstring of a module root or a block: the leading string
    /// expression statement, with indentation cleaned up.
    fn docstring(&self, body: Node<'_>) -> Option<String> {
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }

        let expression = first.named_child(0)?;
        if !matches!(expression.kind(), "string" | "concatenated_string") {
            return None;
        }

        match self.lower(expression) {
            Expr::Str(doc) => Some(clean_doc(&doc)),
            _ => None,
        }
    }

    /// Names bound by the assignments of an expression statement, including
    /// every target of chained and unpacking assignments.
    fn assigned_names(&self, statement: Node<'_>) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = statement.walk();
        for child in statement.named_children(&mut cursor) {
            let mut assignment = Some(child);
            while let Some(node) = assignment.filter(|n| n.kind() == "assignment") {
                if let Some(left) = node.child_by_field_name("left") {
                    self.collect_targets(left, &mut names);
                }
                assignment = node.child_by_field_name("right");
            }
        }
        names
    }

    fn collect_targets(&self, target: Node<'_>, names: &mut Vec<String>) {
        match target.kind() {
            "identifier" => names.push(self.parsed.node_text(&target).to_string()),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern"
            | "tuple" | "list" | "expression_list" | "list_splat"
            | "parenthesized_expression" => {
                let mut cursor = target.walk();
                for child in target.named_children(&mut cursor) {
                    self.collect_targets(child, names);
                }
            }
            // attribute and subscript targets do not bind new names
            _ => {}
        }
    }

    fn lower(&self, node: Node<'_>) -> Expr {
        lower_expr(node, self.parsed.source_bytes())
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> String {
        node.child_by_field_name(field)
            .map(|n| self.parsed.node_text(&n).to_string())
            .unwrap_or_default()
    }

    fn syntax_error(&self, node: Node<'_>, message: String) -> DocError {
        let position = node.start_position();
        DocError::syntax(
            self.parsed.path(),
            position.row + 1,
            position.column + 1,
            message,
        )
    }
}

/// Joins an owner's qualified name and a child name.
pub(crate) fn qualify(owner: Option<&str>, name: &str) -> String {
    match owner {
        Some(owner) => format!("{}.{}", owner, name),
        None => name.to_string(),
    }
}
