//! Recognition of schema annotations on decorators

use super::SchemaError;
use crate::js::ast::{Callee, Decorator, Expr, ExprOrSpread, MemberProp};
use crate::js::{ident_name, unparen, Binding, Imported};
use crate::models::FieldType;
use crate::utils::resolve_card_url;
use std::collections::HashMap;

/// The closed set of annotations a schema may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// `@contains(card)`, `@containsMany(card)`, `@belongsTo(card)`, `@hasMany(card)`
    Field(FieldType),
    /// `@adopts(card)` on the class declaration
    Adopts,
}

impl Annotation {
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "adopts" {
            return Some(Annotation::Adopts);
        }
        FieldType::from_decorator(name).map(Annotation::Field)
    }

    /// Exported name of the annotation, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Annotation::Field(field_type) => field_type.decorator_name(),
            Annotation::Adopts => "adopts",
        }
    }

    /// Match a decorator against annotations imported from `types_module`
    ///
    /// Both `@contains(...)` with a named import and `@types.contains(...)`
    /// with a namespace import are recognized. Decorators that do not refer to
    /// the types module are not annotations and yield `None`.
    pub fn recognize(
        decorator: &Decorator,
        bindings: &HashMap<String, Binding>,
        types_module: &str,
    ) -> Option<Self> {
        let target = match unparen(&decorator.expr) {
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => unparen(callee),
                _ => return None,
            },
            other => other,
        };

        match target {
            Expr::Ident(ident) => match bindings.get(&*ident.sym)? {
                Binding::Import {
                    source,
                    imported: Imported::Named(imported),
                } if source == types_module => Self::from_name(imported),
                _ => None,
            },
            Expr::Member(member) => {
                let namespace = ident_name(&member.obj)?;
                let MemberProp::Ident(property) = &member.prop else {
                    return None;
                };
                match bindings.get(namespace)? {
                    Binding::Import {
                        source,
                        imported: Imported::Namespace,
                    } if source == types_module => Self::from_name(&property.sym),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Resolve the annotation's single argument to an absolute card URL
    ///
    /// The argument must be an identifier bound to the default import of a
    /// module; that module's specifier, resolved against `card_url`, is the
    /// referenced card.
    pub fn card_argument(
        &self,
        decorator: &Decorator,
        bindings: &HashMap<String, Binding>,
        card_url: &str,
    ) -> Result<String, SchemaError> {
        let kind = || self.name().to_string();

        let [argument] = arguments(decorator) else {
            return Err(SchemaError::ArgumentCount { kind: kind() });
        };
        let Some(name) = ident_name(&argument.expr).filter(|_| argument.spread.is_none()) else {
            return Err(SchemaError::ArgumentNotIdentifier { kind: kind() });
        };

        match bindings.get(name) {
            None => Err(SchemaError::ArgumentUndefined { kind: kind() }),
            Some(Binding::Import {
                source,
                imported: Imported::Default,
            }) => resolve_card_url(source, card_url).map_err(|e| SchemaError::InvalidCardUrl {
                specifier: source.clone(),
                message: e.to_string(),
            }),
            Some(_) => Err(SchemaError::ArgumentNotDefaultImport { kind: kind() }),
        }
    }
}

/// Call arguments of `@name(...)`; a bare `@name` has none
fn arguments(decorator: &Decorator) -> &[ExprOrSpread] {
    match unparen(&decorator.expr) {
        Expr::Call(call) => &call.args,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js::parse_module;

    const CARD_URL: &str = "https://demo.com/cards/user";

    fn first_class_decorator(source: &str) -> (Decorator, HashMap<String, Binding>) {
        let module = parse_module(source).unwrap();
        let class = module.default_class().unwrap();
        (class.decorators[0].clone(), module.bindings())
    }

    #[test]
    fn test_recognize_aliased_import() {
        let (decorator, bindings) = first_class_decorator(
            r#"
            import { adopts as inherits } from "@cardstack/types";
            import Person from "../person";
            export default @inherits(Person) class User {}
            "#,
        );

        let annotation = Annotation::recognize(&decorator, &bindings, "@cardstack/types");
        assert_eq!(annotation, Some(Annotation::Adopts));
        assert_eq!(
            Annotation::Adopts.card_argument(&decorator, &bindings, CARD_URL).unwrap(),
            "https://demo.com/person"
        );
    }

    #[test]
    fn test_recognize_namespace_import() {
        let (decorator, bindings) = first_class_decorator(
            r#"
            import * as types from "@cardstack/types";
            import Person from "https://demo.com/person";
            export default @types.adopts(Person) class User {}
            "#,
        );

        assert_eq!(
            Annotation::recognize(&decorator, &bindings, "@cardstack/types"),
            Some(Annotation::Adopts)
        );
    }

    #[test]
    fn test_foreign_decorator_is_not_an_annotation() {
        let (decorator, bindings) = first_class_decorator(
            r#"
            import { adopts } from "some-other-lib";
            export default @adopts(Person) class User {}
            "#,
        );

        assert_eq!(Annotation::recognize(&decorator, &bindings, "@cardstack/types"), None);
    }

    #[test]
    fn test_named_import_argument_is_rejected() {
        let (decorator, bindings) = first_class_decorator(
            r#"
            import { adopts } from "@cardstack/types";
            import { Person } from "https://demo.com/person";
            export default @adopts(Person) class User {}
            "#,
        );

        assert_eq!(
            Annotation::Adopts.card_argument(&decorator, &bindings, CARD_URL),
            Err(SchemaError::ArgumentNotDefaultImport {
                kind: "adopts".to_string()
            })
        );
    }

    #[test]
    fn test_argument_shape_errors() {
        let (decorator, bindings) = first_class_decorator(
            r#"
            import { adopts } from "@cardstack/types";
            export default @adopts("person") class User {}
            "#,
        );
        assert_eq!(
            Annotation::Adopts.card_argument(&decorator, &bindings, CARD_URL),
            Err(SchemaError::ArgumentNotIdentifier {
                kind: "adopts".to_string()
            })
        );

        let (decorator, bindings) = first_class_decorator(
            r#"
            import { adopts } from "@cardstack/types";
            export default @adopts class User {}
            "#,
        );
        assert_eq!(
            Annotation::Adopts.card_argument(&decorator, &bindings, CARD_URL),
            Err(SchemaError::ArgumentCount {
                kind: "adopts".to_string()
            })
        );
    }
}
