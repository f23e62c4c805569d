//! Schema extraction and rewriting

use super::{Annotation, CompiledSchema, FieldMeta, ParentMeta, SchemaContext, SchemaError, SchemaMeta};
use crate::js::ast::{Class, ClassMember, Decorator};
use crate::js::{self, offsets, parse_module, prop_name, Binding, ParsedModule};
use crate::utils::{apply_edits, Edit};
use serde_json::json;
use std::collections::HashMap;

/// Extract field and parent declarations from a schema module
///
/// Annotation decorators and the types-module import are removed from the
/// emitted code. In their place the default class receives two static
/// properties describing what was declared:
///
/// ```js
/// static cardFields = {"username": {"cardURL":"https://cardstack.com/base/string","type":"contains"}};
/// static adoptsFrom = "https://demo.com/person";
/// ```
///
/// # Errors
///
/// Returns a [`SchemaError`] for syntax errors, a missing default class, and
/// every malformed annotation shape.
pub fn compile_schema(source: &str, ctx: SchemaContext<'_>) -> Result<CompiledSchema, SchemaError> {
    let module = parse_module(source)?;
    let bindings = module.bindings();

    let default_class = module.default_class().ok_or(SchemaError::MissingDefaultClass)?;
    reject_annotations_elsewhere(&module, default_class, &bindings, ctx.types_module)?;

    let mut meta = SchemaMeta::default();
    let mut edits = Vec::new();

    for decorator in &default_class.decorators {
        match Annotation::recognize(decorator, &bindings, ctx.types_module) {
            None => {}
            Some(Annotation::Adopts) => {
                if meta.parent.is_some() {
                    return Err(SchemaError::DuplicateAdopts);
                }
                let card_url = Annotation::Adopts.card_argument(decorator, &bindings, ctx.card_url)?;
                meta.parent = Some(ParentMeta { card_url });
                edits.push(Edit::remove(offsets(decorator.span)));
            }
            Some(annotation) => {
                return Err(SchemaError::FieldNotOnProperty {
                    kind: annotation.name().to_string(),
                })
            }
        }
    }

    for member in &default_class.body {
        let Some((decorators, shape)) = member_shape(member) else {
            continue;
        };
        for decorator in decorators {
            let Some(annotation) = Annotation::recognize(decorator, &bindings, ctx.types_module) else {
                continue;
            };
            let Annotation::Field(field_type) = annotation else {
                return Err(SchemaError::AdoptsOnProperty);
            };
            let kind = || annotation.name().to_string();
            let name = match shape {
                MemberShape::Property {
                    key: Some(key),
                    is_static: false,
                } => key.to_string(),
                MemberShape::PrivateProperty => return Err(SchemaError::PrivateField { kind: kind() }),
                _ => return Err(SchemaError::FieldNotOnProperty { kind: kind() }),
            };
            if meta.fields.contains_key(&name) {
                return Err(SchemaError::DuplicateField { name });
            }

            let card_url = annotation.card_argument(decorator, &bindings, ctx.card_url)?;
            meta.fields.insert(
                name.clone(),
                FieldMeta {
                    name,
                    card_url,
                    field_type,
                },
            );
            edits.push(Edit::remove(offsets(decorator.span)));
        }
    }

    for import in module.imports().filter(|import| &*import.src.value == ctx.types_module) {
        edits.push(Edit::remove(offsets(import.span)));
    }
    // just before the closing brace of the class body
    edits.push(Edit::insert(offsets(default_class.span).end - 1, static_metadata(&meta)));

    Ok(CompiledSchema {
        meta,
        code: apply_edits(source, edits),
    })
}

/// What kind of class member carries a set of decorators
#[derive(Debug, Clone, Copy)]
enum MemberShape<'a> {
    /// Public property; computed keys have no static name
    Property { key: Option<&'a str>, is_static: bool },
    PrivateProperty,
    Method,
}

fn member_shape(member: &ClassMember) -> Option<(&[Decorator], MemberShape<'_>)> {
    match member {
        ClassMember::ClassProp(prop) => Some((
            prop.decorators.as_slice(),
            MemberShape::Property {
                key: prop_name(&prop.key),
                is_static: prop.is_static,
            },
        )),
        ClassMember::PrivateProp(prop) => Some((prop.decorators.as_slice(), MemberShape::PrivateProperty)),
        ClassMember::Method(method) => Some((method.function.decorators.as_slice(), MemberShape::Method)),
        ClassMember::PrivateMethod(method) => Some((method.function.decorators.as_slice(), MemberShape::Method)),
        _ => None,
    }
}

/// Annotations are only meaningful on the default class
fn reject_annotations_elsewhere(
    module: &ParsedModule,
    default_class: &Class,
    bindings: &HashMap<String, Binding>,
    types_module: &str,
) -> Result<(), SchemaError> {
    let other_classes = module
        .classes()
        .filter(|class| !std::ptr::eq(*class, default_class));

    for class in other_classes {
        let decorators = class.decorators.iter().chain(
            class
                .body
                .iter()
                .filter_map(member_shape)
                .flat_map(|(decorators, _)| decorators.iter()),
        );
        if let Some(annotation) = decorators
            .filter_map(|d: &Decorator| Annotation::recognize(d, bindings, types_module))
            .next()
        {
            return Err(SchemaError::OutsideDefaultClass {
                kind: annotation.name().to_string(),
            });
        }
    }
    Ok(())
}

fn static_metadata(meta: &SchemaMeta) -> String {
    let fields: Vec<String> = meta
        .fields
        .values()
        .map(|field| {
            format!(
                "{}: {}",
                js::string_literal(&field.name),
                json!({ "type": field.field_type, "cardURL": field.card_url })
            )
        })
        .collect();

    let mut out = format!("\n  static cardFields = {{{}}};", fields.join(", "));
    if let Some(parent) = &meta.parent {
        out.push_str(&format!("\n  static adoptsFrom = {};", js::string_literal(&parent.card_url)));
    }
    out.push('\n');
    out
}
