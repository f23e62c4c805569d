//! Component modules for card templates
//!
//! A template file is either a plain `.hbs` template or a JS module whose
//! default export calls `precompileTemplate`:
//!
//! ```js
//! import { precompileTemplate } from "@ember/template-compilation";
//! import { setComponentTemplate } from "@ember/component";
//! import templateOnlyComponent from "@ember/component/template-only";
//! export default setComponentTemplate(
//!   precompileTemplate(`<@fields.title/>`, { strictMode: true }),
//!   templateOnlyComponent()
//! );
//! ```
//!
//! Either way the output is a JS module whose template has field invocations
//! rewritten, with one import per field component and the component names
//! added to the template scope. Every output module also exports a `Model`
//! class whose static `serializerMap` lists the used fields needing
//! deserialization.

use super::glimmer::{transform_template, TransformOptions};
use super::usage::{serializer_map, used_fields};
use super::{ModelUsage, TemplateError, TemplateUsageMeta};
use crate::js::ast::{BlockStmtOrExpr, CallExpr, Callee, Expr, ExprOrSpread, Lit, ObjectLit, Prop, PropOrSpread};
use crate::js::{self, ident_name, offsets, parse_module, prop_name, unparen, Binding, Imported};
use crate::models::{Fields, Format, SerializerMap};
use crate::utils::{apply_edits, choose_name, Edit};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use std::ops::Range;
use swc_core::common::Spanned;
use swc_core::ecma::visit::{Visit, VisitWith};

const BASE_MODEL_MODULE: &str = "@cardstack/core/src/card-model";
const COMPONENT_MODULE: &str = "@ember/component";
const TEMPLATE_ONLY_MODULE: &str = "@ember/component/template-only";

/// Input for [`compile_template`]
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    /// Card the template file belongs to
    pub card_url: &'a str,

    /// Path of the template inside the card's files
    pub local_file: &'a str,

    /// Merged field set to compile against
    pub fields: &'a Fields,

    pub format: Format,

    /// Module `precompileTemplate` must be imported from
    pub template_compilation_module: &'a str,
}

impl TemplateContext<'_> {
    fn module_name(&self) -> String {
        format!("{}/{}", self.card_url, self.local_file)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    /// Generated component module
    pub code: String,
    pub usage: TemplateUsageMeta,
    pub used_fields: Vec<String>,
    pub deserialize: SerializerMap,
    /// Rewritten template, when it needs no scope of its own
    pub inline_hbs: Option<String>,
}

/// Compile one template file against a field set
///
/// # Errors
///
/// Returns a [`TemplateError`] when the JS wrapper is malformed, when the
/// template references an unknown field, or when a nested field has no usable
/// format.
pub fn compile_template(source: &str, ctx: TemplateContext<'_>) -> Result<CompiledTemplate, TemplateError> {
    if ctx.local_file.ends_with(".hbs") {
        compile_hbs(source, ctx)
    } else {
        compile_js(source, ctx)
    }
}

/// Local names chosen for imported modules
struct Imports {
    taken: HashSet<String>,
    /// module specifier → local name
    chosen: IndexMap<String, String>,
}

impl Imports {
    fn new(taken: impl IntoIterator<Item = String>) -> Self {
        Self {
            taken: taken.into_iter().collect(),
            chosen: IndexMap::new(),
        }
    }

    /// Local name for the default export of `module`, reusing earlier choices
    fn import(&mut self, desired: &str, module: &str) -> String {
        if let Some(name) = self.chosen.get(module) {
            return name.clone();
        }
        let name = choose_name(desired, |candidate| self.taken.contains(candidate));
        self.taken.insert(name.clone());
        self.chosen.insert(module.to_string(), name.clone());
        name
    }

    /// Claim a name for a declaration the generated code adds itself
    fn reserve(&mut self, desired: &str) -> String {
        let name = choose_name(desired, |candidate| self.taken.contains(candidate));
        self.taken.insert(name.clone());
        name
    }

    fn declarations(&self) -> String {
        self.chosen
            .iter()
            .map(|(module, name)| format!("import {} from {};\n", name, js::string_literal(module)))
            .collect()
    }
}

/// Rewrite one template body, returning the scope names it needs
fn transform(
    template: &str,
    ctx: &TemplateContext<'_>,
    imports: &mut Imports,
) -> Result<(String, TemplateUsageMeta, IndexSet<String>), TemplateError> {
    let module_name = ctx.module_name();
    let mut needed = IndexSet::new();
    let output = transform_template(
        template,
        TransformOptions {
            fields: ctx.fields,
            default_format: ctx.format.default_nested_format(),
            module_name: &module_name,
        },
        &mut |desired, module| {
            let name = imports.import(desired, module);
            needed.insert(name.clone());
            name
        },
    )?;
    Ok((output.template, output.usage, needed))
}

fn compile_hbs(source: &str, ctx: TemplateContext<'_>) -> Result<CompiledTemplate, TemplateError> {
    let mut imports = Imports::new(
        ["setComponentTemplate", "precompileTemplate", "templateOnlyComponent", "BaseModel", "Model"]
            .map(String::from),
    );
    let (template, usage, needed) = transform(source, &ctx, &mut imports)?;

    let used_fields = used_fields(ctx.fields, &usage);
    let deserialize = serializer_map(ctx.fields, &used_fields);

    let mut code = String::new();
    code.push_str(&format!(
        "import {{ setComponentTemplate }} from {};\n",
        js::string_literal(COMPONENT_MODULE)
    ));
    code.push_str(&format!(
        "import {{ precompileTemplate }} from {};\n",
        js::string_literal(ctx.template_compilation_module)
    ));
    code.push_str(&format!(
        "import templateOnlyComponent from {};\n",
        js::string_literal(TEMPLATE_ONLY_MODULE)
    ));
    code.push_str(&format!("import BaseModel from {};\n", js::string_literal(BASE_MODEL_MODULE)));
    code.push_str(&imports.declarations());

    let scope = if needed.is_empty() {
        String::new()
    } else {
        format!(", scope: () => ({{ {} }})", join_names(&needed))
    };
    code.push_str(&format!(
        "export default setComponentTemplate(precompileTemplate({}, {{ strictMode: true{} }}), templateOnlyComponent());\n",
        js::string_literal(&template),
        scope
    ));
    code.push_str(&model_class("Model", "BaseModel", &deserialize));

    let inline_hbs = needed.is_empty().then_some(template);
    Ok(CompiledTemplate {
        code,
        usage,
        used_fields,
        deserialize,
        inline_hbs,
    })
}

fn compile_js(source: &str, ctx: TemplateContext<'_>) -> Result<CompiledTemplate, TemplateError> {
    let module = parse_module(source)?;
    let bindings = module.bindings();

    let precompile_names: HashSet<&str> = bindings
        .iter()
        .filter(|(_, binding)| {
            matches!(binding, Binding::Import { source, imported: Imported::Named(name) }
                if source == ctx.template_compilation_module && name == "precompileTemplate")
        })
        .map(|(local, _)| local.as_str())
        .collect();

    let mut calls = PrecompileCalls {
        names: &precompile_names,
        found: Vec::new(),
    };
    if let Some(expr) = module.default_export_expr() {
        expr.visit_with(&mut calls);
    }
    let calls = calls.found;
    if calls.is_empty() {
        return Err(TemplateError::MissingTemplate {
            module: ctx.module_name(),
        });
    }

    let mut imports = Imports::new(bindings.keys().cloned());
    let base_model = imports.reserve("BaseModel");
    let model = imports.reserve("Model");

    let mut edits = Vec::new();
    let mut usage = TemplateUsageMeta::default();
    let mut inline_hbs = None;

    for call in &calls {
        let (template_arg, template, options) = precompile_arguments(&call.args)?;
        let (rewritten, call_usage, needed) = transform(&template, &ctx, &mut imports)?;
        edits.push(Edit::replace(template_arg, js::string_literal(&rewritten)));

        match find_prop(options, "scope") {
            None => {
                if needed.is_empty() {
                    inline_hbs = Some(rewritten);
                } else if let Some(last) = options.props.last() {
                    edits.push(Edit::insert(
                        offsets(last.span()).end,
                        format!(", scope: () => ({{ {} }})", join_names(&needed)),
                    ));
                }
            }
            Some(scope) => {
                let scope_object = scope_object(scope).ok_or(TemplateError::InvalidScope)?;
                if !needed.is_empty() {
                    edits.push(extend_object(scope_object, &needed));
                }
            }
        }

        merge_usage(&mut usage, call_usage);
    }

    let used_fields = used_fields(ctx.fields, &usage);
    let deserialize = serializer_map(ctx.fields, &used_fields);

    let mut header = format!("import {} from {};\n", base_model, js::string_literal(BASE_MODEL_MODULE));
    header.push_str(&imports.declarations());
    edits.push(Edit::insert(0, header));
    edits.push(Edit::insert(
        source.len(),
        format!("\n{}", model_class(&model, &base_model, &deserialize)),
    ));

    Ok(CompiledTemplate {
        code: apply_edits(source, edits),
        usage,
        used_fields,
        deserialize,
        inline_hbs,
    })
}

/// Calls to `precompileTemplate` under any of its local names, outermost first
struct PrecompileCalls<'a> {
    names: &'a HashSet<&'a str>,
    found: Vec<CallExpr>,
}

impl Visit for PrecompileCalls<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if let Callee::Expr(callee) = &call.callee {
            if ident_name(callee).is_some_and(|name| self.names.contains(name)) {
                self.found.push(call.clone());
            }
        }
        call.visit_children_with(self);
    }
}

/// Validate `precompileTemplate(template, options)` arguments
///
/// Returns the source range of the template argument, its text, and the
/// options object.
fn precompile_arguments(args: &[ExprOrSpread]) -> Result<(Range<usize>, String, &ObjectLit), TemplateError> {
    let [template_arg, options_arg, ..] = args else {
        return Err(TemplateError::MissingArguments);
    };

    let template = match unparen(&template_arg.expr) {
        Expr::Lit(Lit::Str(literal)) => literal.value.to_string(),
        Expr::Tpl(tpl) if !tpl.exprs.is_empty() => return Err(TemplateError::TemplateHasExpressions),
        Expr::Tpl(tpl) => tpl
            .quasis
            .iter()
            .map(|quasi| quasi.cooked.as_ref().unwrap_or(&quasi.raw).to_string())
            .collect(),
        _ => return Err(TemplateError::TemplateNotString),
    };

    let Expr::Object(options) = unparen(&options_arg.expr) else {
        return Err(TemplateError::OptionsNotObject);
    };

    let strict = find_prop(options, "strictMode").is_some_and(|prop| match prop {
        Prop::KeyValue(entry) => matches!(unparen(&entry.value), Expr::Lit(Lit::Bool(flag)) if flag.value),
        _ => false,
    });
    if !strict {
        return Err(TemplateError::StrictModeRequired);
    }

    Ok((offsets(template_arg.span()), template, options))
}

fn find_prop<'a>(object: &'a ObjectLit, key: &str) -> Option<&'a Prop> {
    object.props.iter().find_map(|prop| match prop {
        PropOrSpread::Prop(prop) if prop_key(prop) == Some(key) => Some(&**prop),
        _ => None,
    })
}

fn prop_key(prop: &Prop) -> Option<&str> {
    match prop {
        Prop::Shorthand(ident) => Some(&*ident.sym),
        Prop::KeyValue(entry) => prop_name(&entry.key),
        Prop::Getter(getter) => prop_name(&getter.key),
        Prop::Setter(setter) => prop_name(&setter.key),
        Prop::Method(method) => prop_name(&method.key),
        _ => None,
    }
}

/// The object returned by `scope: () => ({ ... })`
fn scope_object(prop: &Prop) -> Option<&ObjectLit> {
    let Prop::KeyValue(entry) = prop else {
        return None;
    };
    let Expr::Arrow(arrow) = unparen(&entry.value) else {
        return None;
    };
    match &*arrow.body {
        BlockStmtOrExpr::Expr(body) => match unparen(body) {
            Expr::Object(object) => Some(object),
            _ => None,
        },
        _ => None,
    }
}

/// Append shorthand properties to an object literal
fn extend_object(object: &ObjectLit, names: &IndexSet<String>) -> Edit {
    match object.props.last() {
        Some(last) => Edit::insert(offsets(last.span()).end, format!(", {}", join_names(names))),
        None => Edit::insert(offsets(object.span).start + 1, format!(" {} ", join_names(names))),
    }
}

fn merge_usage(into: &mut TemplateUsageMeta, from: TemplateUsageMeta) {
    match from.model {
        ModelUsage::Whole => into.model = ModelUsage::Whole,
        ModelUsage::Paths(paths) => {
            for path in paths {
                into.model.insert(&path);
            }
        }
    }
    into.fields.extend(from.fields);
}

fn join_names(names: &IndexSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn model_class(name: &str, base: &str, deserialize: &SerializerMap) -> String {
    let entries: Vec<String> = deserialize
        .iter()
        .map(|(serializer, paths)| {
            let paths: Vec<String> = paths.iter().map(|p| js::string_literal(p)).collect();
            format!("{}: [{}]", js::string_literal(serializer.as_str()), paths.join(", "))
        })
        .collect();

    format!(
        "export class {} extends {} {{\n  static serializerMap = {{{}}};\n}}\n",
        name,
        base,
        entries.join(", ")
    )
}
