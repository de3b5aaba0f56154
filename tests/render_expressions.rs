//! Integration tests for expression rendering.
//!
//! Signatures, defaults and decorators are checked through the full
//! parse-and-extract path, the way they end up in the model.

use pydoctree::parser::{ModelExtractor, SourceParser};
use pydoctree::{Atom, Function, Module};

/// Parses `source` as module `test` and returns it.
fn extract(source: &str) -> Module {
    let parsed = SourceParser::new()
        .parse_source(source, "test.py")
        .expect("source should parse");
    ModelExtractor::new(&parsed)
        .extract_module("test", None)
        .expect("module should build")
}

fn function<'m>(module: &'m Module, name: &str) -> &'m Function {
    module
        .function(name)
        .unwrap_or_else(|| panic!("function {name} not found"))
}

fn signature(source: &str) -> String {
    let module = extract(source);
    function(&module, "foo").signature()
}

// ============================================================================
// Signatures
// ============================================================================

mod signatures {
    use super::*;

    #[test]
    fn test_no_parameters() {
        assert_eq!(signature("def foo():\n    pass\n"), "");
    }

    #[test]
    fn test_single_parameter() {
        assert_eq!(signature("def foo(bar):\n    pass\n"), "bar");
    }

    #[test]
    fn test_string_default() {
        assert_eq!(signature("def foo(bar='baz'):\n    pass\n"), "bar='baz'");
    }

    #[test]
    fn test_lambda_default() {
        assert_eq!(
            signature("def foo(bar=lambda x: x * 2):\n    pass\n"),
            "bar=lambda x: x * 2"
        );
    }

    #[test]
    fn test_comparison_default() {
        assert_eq!(
            signature("def foo(bar=('baz',) == b'asdf'):\n    pass\n"),
            "bar=('baz', ) == b'...'"
        );
    }

    #[test]
    fn test_varargs() {
        assert_eq!(signature("def foo(*bar):\n    pass\n"), "*bar");
    }

    #[test]
    fn test_kwargs() {
        assert_eq!(signature("def foo(**bar):\n    pass\n"), "**bar");
    }

    #[test]
    fn test_combined() {
        assert_eq!(
            signature("def foo(foo, bar=[baz], *quux):\n    pass\n"),
            "foo, bar=[baz], *quux"
        );
    }

    #[test]
    fn test_keyword_only_after_bare_star() {
        assert_eq!(
            signature("def foo(a, /, b=2, *, c, d=0x10, **rest):\n    pass\n"),
            "a, b=2, *, c, d=16, **rest"
        );
    }

    #[test]
    fn test_annotations_are_dropped() {
        assert_eq!(
            signature("def foo(a: int, b: 'str' = 'x') -> None:\n    pass\n"),
            "a, b='x'"
        );
    }

    #[test]
    fn test_unsupported_default_renders_marker() {
        assert_eq!(
            signature("def foo(bar=[i for i in range(3)], baz=a[0]):\n    pass\n"),
            "bar=???, baz=???"
        );
    }
}

// ============================================================================
// Decorators
// ============================================================================

mod decorators {
    use super::*;

    #[test]
    fn test_decorator_renderings() {
        let module = extract(
            r#"
@quux.okay
@baz(True and False or {1, 2, 3})
@bar(-1, 2.3, nope={True: None})
def foo(bar, *baz, **quux):
    pass
"#,
        );

        let foo = function(&module, "foo");
        assert_eq!(foo.signature(), "bar, *baz, **quux");

        let decorators: Vec<&str> = foo.decorators().iter().map(|d| d.text()).collect();
        assert_eq!(
            decorators,
            vec![
                "quux.okay",
                "baz(((True and False) or {1, 2, 3}))",
                "bar(-1, 2.3, nope={True: None})",
            ]
        );
    }

    #[test]
    fn test_class_decorators_and_bases() {
        let module = extract(
            r#"
@dataclass(frozen=True)
class Point(typing.NamedTuple, Generic[T], metaclass=Meta):
    x = 0
"#,
        );

        let point = module.class("Point").expect("class should exist");
        assert_eq!(point.decorators()[0].text(), "dataclass(frozen=True)");
        assert_eq!(point.bases(), &["typing.NamedTuple".to_string(), "???".to_string()]);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let source = "@route('/a', methods=['GET'])\ndef foo():\n    pass\n";
        let first = extract(source);
        let second = extract(source);
        assert_eq!(
            function(&first, "foo").decorators()[0].text(),
            function(&second, "foo").decorators()[0].text()
        );
    }

    #[test]
    fn test_decorator_qualified_names() {
        let module = extract("class A:\n    @property\n    def size(self):\n        pass\n");
        let size = module.class("A").unwrap().method("size").unwrap();
        assert_eq!(size.qualified_name(), "test.A.size");
        assert_eq!(size.decorators()[0].qualified_name(), "test.A.size.property");
    }
}
