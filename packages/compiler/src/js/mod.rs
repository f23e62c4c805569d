//! JavaScript modules of cards
//!
//! Schema and template files are ordinary ES modules that may use decorators.
//! They are parsed with swc. The compiler only ever inspects imports, the
//! default-exported class with its decorators, and the arguments of a handful
//! of calls; every rewrite is expressed as a text edit over the original
//! source, using [`offsets`] to turn swc spans into byte ranges.

mod module;

pub use module::{offsets, parse_module, Binding, Imported, ParseError, ParsedModule};
pub use swc_core::ecma::ast;

use ast::{Expr, PropName};

/// Render `value` as a double-quoted JS string literal
pub fn string_literal(value: &str) -> String {
    // JSON string syntax is a subset of JS string syntax
    serde_json::Value::String(value.to_string()).to_string()
}

/// `expr` with any wrapping parentheses removed
pub fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unparen(&paren.expr),
        other => other,
    }
}

/// Name of the identifier `expr` refers to
pub fn ident_name(expr: &Expr) -> Option<&str> {
    match unparen(expr) {
        Expr::Ident(ident) => Some(&*ident.sym),
        _ => None,
    }
}

/// Static name of an object or class key; computed keys have none
pub fn prop_name(key: &PropName) -> Option<&str> {
    match key {
        PropName::Ident(ident) => Some(&*ident.sym),
        PropName::Str(s) => Some(&*s.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("a\"b"), r#""a\"b""#);
        assert_eq!(string_literal("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_ident_name_looks_through_parens() {
        let module = parse_module("export default ((Post));").unwrap();
        assert_eq!(ident_name(module.default_export_expr().unwrap()), Some("Post"));
    }
}
