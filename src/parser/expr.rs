//! Expression union lowered from tree-sitter nodes
//!
//! Only the node kinds the renderer can print get their own variant;
//! everything else becomes [`Expr::Unsupported`] carrying the node kind, so
//! that the renderer can report it instead of guessing.

use tree_sitter::Node;

use super::literal::parse_string;
use super::render::render_expr;
use crate::model::Parameter;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal, kept as source text
    Number(String),
    /// Decoded string literal
    Str(String),
    Bytes,
    Bool(bool),
    None,
    Ellipsis,
    Name(String),
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<DictEntry>),
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    Starred(Box<Expr>),
    Lambda {
        params: Arguments,
        body: Box<Expr>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        comparisons: Vec<(CmpOp, Expr)>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictEntry {
    Pair(Expr, Expr),
    Splat(Expr),
}

/// Call keyword argument; `arg` is `None` for `**mapping`
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Invert,
    Not,
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Invert => "~",
            UnaryOp::Not => "not ",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl BinOp {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mult,
            "/" => BinOp::Div,
            "//" => BinOp::FloorDiv,
            "%" => BinOp::Mod,
            "**" => BinOp::Pow,
            "<<" => BinOp::LShift,
            ">>" => BinOp::RShift,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "&" => BinOp::BitAnd,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mult => "*",
            BinOp::Div => "/",
            BinOp::FloorDiv => "//",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::LShift => "<<",
            BinOp::RShift => ">>",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOp {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" => CmpOp::Eq,
            "!=" => CmpOp::NotEq,
            "<" => CmpOp::Lt,
            "<=" => CmpOp::LtE,
            ">" => CmpOp::Gt,
            ">=" => CmpOp::GtE,
            "is" => CmpOp::Is,
            "is not" => CmpOp::IsNot,
            "in" => CmpOp::In,
            "not in" => CmpOp::NotIn,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "!=",
            CmpOp::Lt => "<",
            CmpOp::LtE => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtE => ">=",
            CmpOp::Is => "is",
            CmpOp::IsNot => "is not",
            CmpOp::In => "in",
            CmpOp::NotIn => "not in",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "and" => Some(BoolOp::And),
            "or" => Some(BoolOp::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }
}

/// Parameter list of a function or lambda.
///
/// Positional defaults apply to the trailing positional parameters; each
/// keyword-only parameter carries its own optional default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub positional: Vec<String>,
    pub defaults: Vec<Expr>,
    pub vararg: Option<String>,
    pub keyword_only: Vec<String>,
    pub kw_defaults: Vec<Option<Expr>>,
    pub kwarg: Option<String>,
}

impl Arguments {
    /// Lowers a `parameters` or `lambda_parameters` node.
    ///
    /// Fails with a message when the list is not valid Python, e.g. a
    /// parameter without default after one with a default.
    pub fn lower(node: Node<'_>, source: &[u8]) -> Result<Self, String> {
        let mut args = Arguments::default();
        let mut keyword_only = false;

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "identifier" => args.push(text(child, source), None, keyword_only)?,
                "default_parameter" | "typed_default_parameter" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| text(n, source))
                        .unwrap_or_default();
                    let default = child
                        .child_by_field_name("value")
                        .map(|v| lower_expr(v, source))
                        .unwrap_or_else(|| Expr::Unsupported(child.kind().to_string()));
                    args.push(name, Some(default), keyword_only)?;
                }
                "typed_parameter" => {
                    let Some(inner) = first_named(child) else {
                        continue;
                    };
                    match inner.kind() {
                        "list_splat_pattern" => {
                            args.vararg = splat_name(inner, source);
                            keyword_only = true;
                        }
                        "dictionary_splat_pattern" => args.kwarg = splat_name(inner, source),
                        _ => args.push(text(inner, source), None, keyword_only)?,
                    }
                }
                "list_splat_pattern" => {
                    args.vararg = splat_name(child, source);
                    keyword_only = true;
                }
                "keyword_separator" => keyword_only = true,
                "dictionary_splat_pattern" => args.kwarg = splat_name(child, source),
                "positional_separator" | "comment" => {}
                "tuple_pattern" => {
                    return Err("tuple parameter unpacking is not supported".to_string())
                }
                other => return Err(format!("unexpected parameter `{}`", other)),
            }
        }

        Ok(args)
    }

    fn push(&mut self, name: String, default: Option<Expr>, keyword_only: bool) -> Result<(), String> {
        if keyword_only {
            self.keyword_only.push(name);
            self.kw_defaults.push(default);
            return Ok(());
        }

        match default {
            Some(default) => self.defaults.push(default),
            None if !self.defaults.is_empty() => {
                return Err(format!(
                    "parameter `{}` without a default follows parameter with a default",
                    name
                ))
            }
            None => {}
        }
        self.positional.push(name);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
            && self.vararg.is_none()
            && self.keyword_only.is_empty()
            && self.kwarg.is_none()
    }

    /// Builds model parameters in declaration order, rendering defaults.
    pub fn to_parameters(&self, owner: Option<&str>) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        let defaults = align_defaults(self.positional.len(), &self.defaults);
        for (name, default) in self.positional.iter().zip(defaults) {
            parameters.push(Parameter::positional(
                name.as_str(),
                default.map(render_expr),
                owner,
            ));
        }

        if let Some(vararg) = &self.vararg {
            parameters.push(Parameter::vararg(vararg.as_str(), owner));
        }

        let kw_defaults = align_defaults(self.keyword_only.len(), &self.kw_defaults);
        for (name, default) in self.keyword_only.iter().zip(kw_defaults) {
            parameters.push(Parameter::keyword_only(
                name.as_str(),
                default.and_then(Option::as_ref).map(render_expr),
                owner,
            ));
        }

        if let Some(kwarg) = &self.kwarg {
            parameters.push(Parameter::kwarg(kwarg.as_str(), owner));
        }

        parameters
    }
}

/// Matches `defaults` against the last `count` parameters.
///
/// Yields one entry per parameter: `None` for the leading parameters that
/// have no default. Surplus leading defaults are ignored.
fn align_defaults<T>(count: usize, defaults: &[T]) -> impl Iterator<Item = Option<&T>> {
    let defaults = &defaults[defaults.len().saturating_sub(count)..];
    let offset = count - defaults.len();
    (0..count).map(move |idx| idx.checked_sub(offset).map(|i| &defaults[i]))
}

/// Lowers an expression node into an [`Expr`].
pub fn lower_expr(node: Node<'_>, source: &[u8]) -> Expr {
    match node.kind() {
        "integer" | "float" => Expr::Number(text(node, source)),
        "string" => lower_string(node, source),
        "concatenated_string" => lower_concatenated(node, source),
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "none" => Expr::None,
        "ellipsis" => Expr::Ellipsis,
        "identifier" | "keyword_identifier" => Expr::Name(text(node, source)),
        "attribute" => {
            match (
                node.child_by_field_name("object"),
                node.child_by_field_name("attribute"),
            ) {
                (Some(object), Some(attr)) => Expr::Attribute {
                    value: Box::new(lower_expr(object, source)),
                    attr: text(attr, source),
                },
                _ => unsupported(node),
            }
        }
        "parenthesized_expression" => match first_named(node) {
            Some(inner) => lower_expr(inner, source),
            None => unsupported(node),
        },
        "list" => Expr::List(lower_children(node, source)),
        "set" => Expr::Set(lower_children(node, source)),
        "tuple" | "expression_list" => Expr::Tuple(lower_children(node, source)),
        "dictionary" => lower_dictionary(node, source),
        "list_splat" => match first_named(node) {
            Some(inner) => Expr::Starred(Box::new(lower_expr(inner, source))),
            None => unsupported(node),
        },
        "call" => lower_call(node, source),
        "lambda" => lower_lambda(node, source),
        "unary_operator" => {
            let op = node
                .child_by_field_name("operator")
                .and_then(|op| match op.kind() {
                    "~" => Some(UnaryOp::Invert),
                    "+" => Some(UnaryOp::Plus),
                    "-" => Some(UnaryOp::Minus),
                    _ => None,
                });
            match (op, node.child_by_field_name("argument")) {
                (Some(op), Some(operand)) => Expr::UnaryOp {
                    op,
                    operand: Box::new(lower_expr(operand, source)),
                },
                _ => unsupported(node),
            }
        }
        "not_operator" => match node.child_by_field_name("argument") {
            Some(operand) => Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(lower_expr(operand, source)),
            },
            None => unsupported(node),
        },
        "binary_operator" => {
            let op = node
                .child_by_field_name("operator")
                .and_then(|op| BinOp::from_token(op.kind()));
            match (
                node.child_by_field_name("left"),
                op,
                node.child_by_field_name("right"),
            ) {
                (Some(left), Some(op), Some(right)) => Expr::BinOp {
                    left: Box::new(lower_expr(left, source)),
                    op,
                    right: Box::new(lower_expr(right, source)),
                },
                _ => unsupported(node),
            }
        }
        "comparison_operator" => lower_comparison(node, source),
        "boolean_operator" => lower_boolean(node, source),
        _ => unsupported(node),
    }
}

fn lower_string(node: Node<'_>, source: &[u8]) -> Expr {
    match parse_string(&text(node, source)) {
        Some(lit) if lit.is_formatted => Expr::Unsupported("f-string".to_string()),
        Some(lit) if lit.is_bytes => Expr::Bytes,
        Some(lit) => Expr::Str(lit.value),
        None => unsupported(node),
    }
}

fn lower_concatenated(node: Node<'_>, source: &[u8]) -> Expr {
    let mut value = String::new();
    let mut bytes = 0;
    let mut parts = 0;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        parts += 1;
        match lower_expr(child, source) {
            Expr::Str(part) => value.push_str(&part),
            Expr::Bytes => bytes += 1,
            other => return other,
        }
    }

    match bytes {
        0 => Expr::Str(value),
        n if n == parts => Expr::Bytes,
        _ => unsupported(node),
    }
}

fn lower_dictionary(node: Node<'_>, source: &[u8]) -> Expr {
    let mut entries = Vec::new();

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "pair" => match (
                child.child_by_field_name("key"),
                child.child_by_field_name("value"),
            ) {
                (Some(key), Some(value)) => entries.push(DictEntry::Pair(
                    lower_expr(key, source),
                    lower_expr(value, source),
                )),
                _ => return unsupported(child),
            },
            "dictionary_splat" => match first_named(child) {
                Some(inner) => entries.push(DictEntry::Splat(lower_expr(inner, source))),
                None => return unsupported(child),
            },
            "comment" => {}
            _ => return unsupported(child),
        }
    }

    Expr::Dict(entries)
}

fn lower_call(node: Node<'_>, source: &[u8]) -> Expr {
    let (Some(function), Some(arguments)) = (
        node.child_by_field_name("function"),
        node.child_by_field_name("arguments"),
    ) else {
        return unsupported(node);
    };

    if arguments.kind() == "generator_expression" {
        return Expr::Call {
            func: Box::new(lower_expr(function, source)),
            args: vec![unsupported(arguments)],
            keywords: Vec::new(),
        };
    }
    if arguments.kind() != "argument_list" {
        return unsupported(arguments);
    }

    let mut args = Vec::new();
    let mut keywords = Vec::new();

    let mut cursor = arguments.walk();
    for child in arguments.named_children(&mut cursor) {
        match child.kind() {
            "keyword_argument" => match (
                child.child_by_field_name("name"),
                child.child_by_field_name("value"),
            ) {
                (Some(name), Some(value)) => keywords.push(Keyword {
                    arg: Some(text(name, source)),
                    value: lower_expr(value, source),
                }),
                _ => args.push(unsupported(child)),
            },
            "dictionary_splat" => match first_named(child) {
                Some(inner) => keywords.push(Keyword {
                    arg: None,
                    value: lower_expr(inner, source),
                }),
                None => args.push(unsupported(child)),
            },
            "comment" => {}
            _ => args.push(lower_expr(child, source)),
        }
    }

    Expr::Call {
        func: Box::new(lower_expr(function, source)),
        args,
        keywords,
    }
}

fn lower_lambda(node: Node<'_>, source: &[u8]) -> Expr {
    let params = match node.child_by_field_name("parameters") {
        Some(params) => match Arguments::lower(params, source) {
            Ok(params) => params,
            Err(_) => return unsupported(node),
        },
        None => Arguments::default(),
    };

    match node.child_by_field_name("body") {
        Some(body) => Expr::Lambda {
            params,
            body: Box::new(lower_expr(body, source)),
        },
        None => unsupported(node),
    }
}

fn lower_comparison(node: Node<'_>, source: &[u8]) -> Expr {
    let mut operands = Vec::new();
    let mut ops = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_named() {
            if child.kind() != "comment" {
                operands.push(lower_expr(child, source));
            }
            continue;
        }
        match CmpOp::from_token(child.kind()) {
            Some(op) => ops.push(op),
            None => return unsupported(node),
        }
    }

    if operands.len() != ops.len() + 1 {
        return unsupported(node);
    }

    let mut operands = operands.into_iter();
    let Some(left) = operands.next() else {
        return unsupported(node);
    };

    Expr::Compare {
        left: Box::new(left),
        comparisons: ops.into_iter().zip(operands).collect(),
    }
}

fn lower_boolean(node: Node<'_>, source: &[u8]) -> Expr {
    let op = node
        .child_by_field_name("operator")
        .and_then(|op| BoolOp::from_token(op.kind()));
    let (Some(op), Some(left), Some(right)) = (
        op,
        node.child_by_field_name("left"),
        node.child_by_field_name("right"),
    ) else {
        return unsupported(node);
    };

    // `a and b and c` nests on the left; parenthesized operands stay grouped
    let mut values = match lower_expr(left, source) {
        Expr::BoolOp { op: inner, values } if left.kind() == "boolean_operator" && inner == op => {
            values
        }
        other => vec![other],
    };
    values.push(lower_expr(right, source));

    Expr::BoolOp { op, values }
}

fn lower_children(node: Node<'_>, source: &[u8]) -> Vec<Expr> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .map(|child| lower_expr(child, source))
        .collect()
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}

fn splat_name(node: Node<'_>, source: &[u8]) -> Option<String> {
    first_named(node).map(|name| text(name, source))
}

fn unsupported(node: Node<'_>) -> Expr {
    Expr::Unsupported(node.kind().to_string())
}

fn text(node: Node<'_>, source: &[u8]) -> String {
    node.utf8_text(source).unwrap_or("").to_string()
}
