//! Source-like rendering of lowered expressions
//!
//! Rendering is deterministic: the same expression always produces the same
//! text, with literals in canonical form. Boolean chains are always wrapped
//! in parentheses so nesting stays unambiguous.

use tracing::warn;

use super::expr::{DictEntry, Expr, Keyword};
use super::literal::{canonical_number, python_repr};
use crate::model::function::render_parameters;

/// Placeholder for expression kinds the renderer does not support
pub const UNKNOWN_MARKER: &str = "???";
/// Placeholder for an absent expression
pub const INVALID_MARKER: &str = "!!!";

/// Renders an optional expression; `None` yields [`INVALID_MARKER`].
pub fn render(expr: Option<&Expr>) -> String {
    match expr {
        Some(expr) => render_expr(expr),
        None => INVALID_MARKER.to_string(),
    }
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Number(raw) => canonical_number(raw),
        Expr::Str(value) => python_repr(value),
        Expr::Bytes => "b'...'".to_string(),
        Expr::Bool(true) => "True".to_string(),
        Expr::Bool(false) => "False".to_string(),
        Expr::None => "None".to_string(),
        Expr::Ellipsis => "...".to_string(),
        Expr::Name(name) => name.clone(),
        Expr::Attribute { value, attr } => format!("{}.{}", render_expr(value), attr),
        Expr::List(items) => format!("[{}]", join(items)),
        Expr::Set(items) => format!("{{{}}}", join(items)),
        Expr::Tuple(items) => match items.as_slice() {
            [] => "()".to_string(),
            [single] => format!("({}, )", render_expr(single)),
            _ => format!("({})", join(items)),
        },
        Expr::Dict(entries) => {
            let entries: Vec<String> = entries
                .iter()
                .map(|entry| match entry {
                    DictEntry::Pair(key, value) => {
                        format!("{}: {}", render_expr(key), render_expr(value))
                    }
                    DictEntry::Splat(value) => format!("**{}", render_expr(value)),
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Expr::Call {
            func,
            args,
            keywords,
        } => {
            let mut parts: Vec<String> = args.iter().map(render_expr).collect();
            parts.extend(keywords.iter().map(render_keyword));
            format!("{}({})", render_expr(func), parts.join(", "))
        }
        Expr::Starred(value) => format!("*{}", render_expr(value)),
        Expr::Lambda { params, body } => {
            if params.is_empty() {
                format!("lambda: {}", render_expr(body))
            } else {
                format!(
                    "lambda {}: {}",
                    render_parameters(&params.to_parameters(None)),
                    render_expr(body)
                )
            }
        }
        Expr::UnaryOp { op, operand } => format!("{}{}", op.as_str(), render_expr(operand)),
        Expr::BinOp { left, op, right } => format!(
            "{} {} {}",
            render_expr(left),
            op.as_str(),
            render_expr(right)
        ),
        Expr::Compare { left, comparisons } => {
            let mut out = render_expr(left);
            for (op, operand) in comparisons {
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                out.push_str(&render_expr(operand));
            }
            out
        }
        Expr::BoolOp { op, values } => {
            let separator = format!(" {} ", op.as_str());
            let values: Vec<String> = values.iter().map(render_expr).collect();
            format!("({})", values.join(&separator))
        }
        Expr::Unsupported(kind) => {
            warn!("Unsupported expression node: {}", kind);
            UNKNOWN_MARKER.to_string()
        }
    }
}

fn render_keyword(keyword: &Keyword) -> String {
    match &keyword.arg {
        Some(arg) => format!("{}={}", arg, render_expr(&keyword.value)),
        None => format!("**{}", render_expr(&keyword.value)),
    }
}

fn join(items: &[Expr]) -> String {
    items.iter().map(render_expr).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::expr::lower_expr;
    use crate::parser::SourceParser;

    fn render_source(code: &str) -> String {
        let source = format!("x = {}\n", code);
        let parsed = SourceParser::new().parse_source(&source, "test.py").unwrap();
        let statement = parsed.root_node().named_child(0).unwrap();
        let assignment = statement.named_child(0).unwrap();
        let right = assignment.child_by_field_name("right").unwrap();
        render_expr(&lower_expr(right, parsed.source_bytes()))
    }

    #[test]
    fn test_absent_expression_is_invalid_marker() {
        assert_eq!(render(None), "!!!");
    }

    #[test]
    fn test_unsupported_expression_is_unknown_marker() {
        assert_eq!(render(Some(&Expr::Unsupported("await".to_string()))), "???");
        assert_eq!(render_source("[i for i in range(3)]"), "???");
    }

    #[test]
    fn test_render_literals() {
        assert_eq!(render_source("-1"), "-1");
        assert_eq!(render_source("2.30"), "2.3");
        assert_eq!(render_source("0x10"), "16");
        assert_eq!(render_source("\"baz\""), "'baz'");
        assert_eq!(render_source("b'asdf'"), "b'...'");
        assert_eq!(render_source("..."), "...");
    }

    #[test]
    fn test_render_containers() {
        assert_eq!(render_source("('baz',)"), "('baz', )");
        assert_eq!(render_source("()"), "()");
        assert_eq!(render_source("(1, 2)"), "(1, 2)");
        assert_eq!(render_source("[1, [2]]"), "[1, [2]]");
        assert_eq!(render_source("{1, 2, 3}"), "{1, 2, 3}");
        assert_eq!(render_source("{True: None, **extra}"), "{True: None, **extra}");
    }

    #[test]
    fn test_render_calls_put_keywords_last() {
        assert_eq!(
            render_source("bar(-1, 2.3, nope={True: None})"),
            "bar(-1, 2.3, nope={True: None})"
        );
        assert_eq!(
            render_source("call(a, key=1, *rest, **opts)"),
            "call(a, *rest, key=1, **opts)"
        );
        assert_eq!(render_source("os.path.join('a')"), "os.path.join('a')");
    }

    #[test]
    fn test_render_operators() {
        assert_eq!(render_source("x * 2"), "x * 2");
        assert_eq!(render_source("not x"), "not x");
        assert_eq!(render_source("~x"), "~x");
        assert_eq!(render_source("('baz',) == b'asdf'"), "('baz', ) == b'...'");
        assert_eq!(render_source("a is not None"), "a is not None");
    }

    #[test]
    fn test_render_boolean_chains() {
        assert_eq!(
            render_source("True and False or {1, 2, 3}"),
            "((True and False) or {1, 2, 3})"
        );
        assert_eq!(render_source("a or b or c"), "(a or b or c)");
        assert_eq!(render_source("a or (b or c)"), "(a or (b or c))");
    }

    #[test]
    fn test_render_lambda() {
        assert_eq!(render_source("lambda x: x * 2"), "lambda x: x * 2");
        assert_eq!(render_source("lambda: 0"), "lambda: 0");
        assert_eq!(
            render_source("lambda a, b=1, *c, d, **e: a"),
            "lambda a, b=1, *c, d, **e: a"
        );
    }
}
