//! Parsing and module-level queries

use super::ast::{
    Class, Decl, DefaultDecl, EsVersion, ExportDecl, ExportDefaultDecl, Expr, Ident, ImportDecl,
    ImportSpecifier, Module, ModuleDecl, ModuleExportName, ModuleItem, Pat, PropName, Stmt,
};
use super::unparen;
use std::collections::HashMap;
use std::ops::Range;
use swc_core::common::{BytePos, Span, Spanned};
use swc_core::ecma::parser::{error::Error as SwcError, lexer::Lexer, EsConfig, Parser, StringInput, Syntax};
use swc_core::ecma::visit::{Visit, VisitWith};
use thiserror::Error;

/// Position of the first source byte; swc reserves `BytePos(0)` for dummy spans
const START: u32 = 1;

/// Syntax error with its position in the source
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message} (line {line}, column {column})")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = offset - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    fn from_swc(source: &str, err: &SwcError) -> Self {
        Self::at(source, offsets(err.span()).start, err.kind().msg())
    }
}

/// Byte range of `span` in the source handed to [`parse_module`]
pub fn offsets(span: Span) -> Range<usize> {
    let lo = span.lo.0.saturating_sub(START) as usize;
    let hi = span.hi.0.saturating_sub(START) as usize;
    lo..hi
}

/// Parse an ES module with decorators enabled
///
/// Errors swc recovers from still fail the parse.
pub fn parse_module(source: &str) -> Result<ParsedModule, ParseError> {
    let syntax = Syntax::Es(EsConfig {
        decorators: true,
        decorators_before_export: true,
        ..Default::default()
    });
    let input = StringInput::new(source, BytePos(START), BytePos(START + source.len() as u32));
    let mut parser = Parser::new_from(Lexer::new(syntax, EsVersion::EsNext, input, None));

    let module = parser
        .parse_module()
        .map_err(|e| ParseError::from_swc(source, &e))?;
    if let Some(err) = parser.take_errors().first() {
        return Err(ParseError::from_swc(source, err));
    }
    Ok(ParsedModule { module })
}

/// What a module-level name is bound to
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Import { source: String, imported: Imported },
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Imported {
    Default,
    Named(String),
    Namespace,
}

/// A parsed card module
#[derive(Debug, Clone)]
pub struct ParsedModule {
    module: Module,
}

impl ParsedModule {
    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.module.body.iter().filter_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(import)) => Some(import),
            _ => None,
        })
    }

    /// Every module-level binding by local name
    pub fn bindings(&self) -> HashMap<String, Binding> {
        let mut bindings = HashMap::new();

        for import in self.imports() {
            let source = import.src.value.to_string();
            for specifier in &import.specifiers {
                let (local, imported) = match specifier {
                    ImportSpecifier::Named(named) => {
                        let imported = match &named.imported {
                            Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                            Some(ModuleExportName::Str(name)) => name.value.to_string(),
                            None => named.local.sym.to_string(),
                        };
                        (&named.local, Imported::Named(imported))
                    }
                    ImportSpecifier::Default(default) => (&default.local, Imported::Default),
                    ImportSpecifier::Namespace(namespace) => (&namespace.local, Imported::Namespace),
                };
                bindings.insert(
                    local.sym.to_string(),
                    Binding::Import {
                        source: source.clone(),
                        imported,
                    },
                );
            }
        }

        let mut locals = Vec::new();
        for decl in self.declarations() {
            match decl {
                Decl::Class(class) => locals.push(class.ident.sym.to_string()),
                Decl::Fn(function) => locals.push(function.ident.sym.to_string()),
                Decl::Var(var) => {
                    for declarator in &var.decls {
                        locals.extend(pattern_names(&declarator.name));
                    }
                }
                _ => {}
            }
        }
        if let Some(ident) = self.default_declaration_name() {
            locals.push(ident.sym.to_string());
        }
        for name in locals {
            bindings.entry(name).or_insert(Binding::Local);
        }

        bindings
    }

    /// Every class declared at the top level, default export included
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.declarations()
            .filter_map(|decl| match decl {
                Decl::Class(class) => Some(&*class.class),
                _ => None,
            })
            .chain(self.default_declared_class())
    }

    /// The default-exported class, either declared inline or exported by name
    pub fn default_class(&self) -> Option<&Class> {
        if let Some(class) = self.default_declared_class() {
            return Some(class);
        }

        match unparen(self.default_export_expr()?) {
            Expr::Class(class) => Some(&*class.class),
            Expr::Ident(name) => self.declarations().find_map(|decl| match decl {
                Decl::Class(class) if class.ident.sym == name.sym => Some(&*class.class),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Expression of an `export default <expression>` statement
    pub fn default_export_expr(&self) -> Option<&Expr> {
        self.module.body.iter().find_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => Some(&*export.expr),
            _ => None,
        })
    }

    /// Top-level declarations, exported or not
    fn declarations(&self) -> impl Iterator<Item = &Decl> {
        self.module.body.iter().filter_map(|item| match item {
            ModuleItem::Stmt(Stmt::Decl(decl))
            | ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { decl, .. })) => Some(decl),
            _ => None,
        })
    }

    fn default_declared_class(&self) -> Option<&Class> {
        self.module.body.iter().find_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(ExportDefaultDecl {
                decl: DefaultDecl::Class(class),
                ..
            })) => Some(&*class.class),
            _ => None,
        })
    }

    /// Name of `export default class Foo {}` or `export default function foo() {}`
    fn default_declaration_name(&self) -> Option<&Ident> {
        self.module.body.iter().find_map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
                DefaultDecl::Class(class) => class.ident.as_ref(),
                DefaultDecl::Fn(function) => function.ident.as_ref(),
                _ => None,
            },
            _ => None,
        })
    }
}

/// Names bound by a declaration pattern (`a`, `{ a, b: c }`, `[d, ...e]`)
fn pattern_names(pat: &Pat) -> Vec<String> {
    let mut collector = PatternNames::default();
    pat.visit_with(&mut collector);
    collector.names
}

#[derive(Default)]
struct PatternNames {
    names: Vec<String>,
}

impl Visit for PatternNames {
    fn visit_ident(&mut self, ident: &Ident) {
        self.names.push(ident.sym.to_string());
    }

    // default values and computed keys bind nothing
    fn visit_expr(&mut self, _: &Expr) {}

    fn visit_prop_name(&mut self, _: &PropName) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js::{ast::ClassMember, prop_name};

    #[test]
    fn test_import_bindings() {
        let module = parse_module(
            r#"
            import { contains, adopts as inherits } from "@cardstack/types";
            import string from "https://cardstack.com/base/string";
            import * as everything from "./mod";
            import "./side-effect.css";
            "#,
        )
        .unwrap();

        assert_eq!(module.imports().count(), 4);
        let bindings = module.bindings();
        assert_eq!(
            bindings["inherits"],
            Binding::Import {
                source: "@cardstack/types".to_string(),
                imported: Imported::Named("adopts".to_string()),
            }
        );
        assert_eq!(
            bindings["string"],
            Binding::Import {
                source: "https://cardstack.com/base/string".to_string(),
                imported: Imported::Default,
            }
        );
        assert_eq!(
            bindings["everything"],
            Binding::Import {
                source: "./mod".to_string(),
                imported: Imported::Namespace,
            }
        );
    }

    #[test]
    fn test_local_bindings() {
        let module = parse_module(
            "const Person = 'person', { slug, meta: info = Fallback } = config;\nfunction helper() {}\nclass Local {}",
        )
        .unwrap();
        let bindings = module.bindings();
        for name in ["Person", "slug", "info", "helper", "Local"] {
            assert_eq!(bindings.get(name), Some(&Binding::Local), "{}", name);
        }
        assert!(!bindings.contains_key("meta"));
        assert!(!bindings.contains_key("Fallback"));
    }

    #[test]
    fn test_decorated_default_class() {
        let module = parse_module(
            r#"
            import { adopts, contains } from "@cardstack/types";
            import Person from "http://mirage/cards/person";
            import string from "https://cardstack.com/base/string";

            export default @adopts(Person) class User {
              @contains(string)
              username

              @contains(string) nickname = "none";

              static displayName = 'User';

              get greeting() { return `hi ${this.username}`; }
            }
            "#,
        )
        .unwrap();

        let class = module.default_class().unwrap();
        assert_eq!(class.decorators.len(), 1);

        let keys: Vec<_> = class
            .body
            .iter()
            .filter_map(|member| match member {
                ClassMember::ClassProp(prop) => prop_name(&prop.key),
                ClassMember::Method(method) => prop_name(&method.key),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec!["username", "nickname", "displayName", "greeting"]);
    }

    #[test]
    fn test_default_export_by_name() {
        let module = parse_module("class Other {}\nclass Post { title; }\nexport default Post;").unwrap();
        let class = module.default_class().unwrap();
        assert_eq!(class.body.len(), 1);
        assert_eq!(module.classes().count(), 2);
    }

    #[test]
    fn test_modern_syntax_is_accepted() {
        let module = parse_module(
            r#"
            const SLUG = /[a-z]+/g;
            export default class Post {
              #cache = null;
              static { this.ready = true; }
              get slug() { return this.#cache?.slug ?? SLUG.source; }
            }
            "#,
        )
        .unwrap();
        assert_eq!(module.default_class().unwrap().body.len(), 3);
    }

    #[test]
    fn test_offsets_match_source() {
        let source = "export default Post;";
        let module = parse_module(source).unwrap();
        let Some(Expr::Ident(ident)) = module.default_export_expr() else {
            panic!("expected an identifier");
        };
        assert_eq!(&source[offsets(ident.span)], "Post");
    }

    #[test]
    fn test_syntax_error_position() {
        let err = parse_module("import { x } from ;").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.column > 1, "{}", err);

        let err = parse_module("const a = 1;\nexport default class {").unwrap_err();
        assert_eq!(err.line, 2);
    }
}
