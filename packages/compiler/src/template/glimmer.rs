//! Rewrite pass over Glimmer template text
//!
//! The template is scanned as a sequence of mustaches and element tags; text
//! between them and HTML comments are copied through untouched. Field
//! invocations are rewritten into invocations of the field card's compiled
//! component:
//!
//! ```hbs
//! <@fields.author @format="isolated"/>
//! ```
//!
//! becomes
//!
//! ```hbs
//! <AuthorField @model={{@model.author}}/>
//! ```
//!
//! where `AuthorField` is a name handed out by the caller-provided importer.
//! Plural fields are iterated with `{{#each @fields.list as |item|}}` and
//! rendered with `<item/>` inside the block.

use super::{TemplateError, TemplateUsageMeta};
use crate::models::{Fields, Format};
use crate::utils::field_for_path;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)(?P<comment><!--.*?-->)|\{\{!--.*?--\}\}|\{\{!.*?\}\}|\{\{.*?\}\}|<(?P<close>/?)(?P<tag>@?[A-Za-z_][\w.$-]*)(?P<attrs>(?:[^<>"'{]|"[^"]*"|'[^']*'|\{\{.*?\}\})*?)(?P<selfclose>/?)>"#,
    )
    .unwrap()
});

static MUSTACHE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

static MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@model([\w$]*)((?:\.[A-Za-z_$][\w$]*)*)").unwrap());

static EACH_FIELDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^#each\s+@fields\.(?P<path>[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s+as\s+\|\s*(?P<item>[A-Za-z_$][\w$]*)(?:\s+[A-Za-z_$][\w$]*)?\s*\|$",
    )
    .unwrap()
});

static FORMAT_ATTR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s*@format=(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Settings for one rewrite
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions<'a> {
    /// Merged field set the template is compiled against
    pub fields: &'a Fields,

    /// Format used for field invocations without `@format`; `None` makes them an error
    pub default_format: Option<Format>,

    /// `{card_url}/{file}`, used in error messages
    pub module_name: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub template: String,
    pub usage: TemplateUsageMeta,
}

/// Rewrite field invocations and record usage
///
/// `import_component(desired_name, module)` must return the local name under
/// which the component module is available to the template.
pub fn transform_template(
    source: &str,
    options: TransformOptions<'_>,
    import_component: &mut dyn FnMut(&str, &str) -> String,
) -> Result<TransformOutput, TemplateError> {
    let mut transformer = Transformer {
        options,
        import_component,
        usage: TemplateUsageMeta::default(),
        blocks: Vec::new(),
    };

    let mut template = String::with_capacity(source.len());
    let mut last = 0;
    for caps in SEGMENT_RE.captures_iter(source) {
        let Some(segment) = caps.get(0) else { continue };
        template.push_str(&source[last..segment.start()]);
        last = segment.end();

        let rewritten = if caps.name("comment").is_some() {
            segment.as_str().to_string()
        } else if caps.name("tag").is_some() {
            transformer.element(&caps)?
        } else {
            transformer.mustache(segment.as_str())?
        };
        template.push_str(&rewritten);
    }
    template.push_str(&source[last..]);

    Ok(TransformOutput {
        template,
        usage: transformer.usage,
    })
}

/// `{{#each @fields.path as |item|}}` currently open
struct EachFrame {
    item: String,
    path: String,
}

struct Transformer<'a, 'i> {
    options: TransformOptions<'a>,
    import_component: &'i mut dyn FnMut(&str, &str) -> String,
    usage: TemplateUsageMeta,
    /// One entry per open block; `Some` for blocks iterating a field
    blocks: Vec<Option<EachFrame>>,
}

impl Transformer<'_, '_> {
    fn mustache(&mut self, text: &str) -> Result<String, TemplateError> {
        if text.starts_with("{{!") {
            return Ok(text.to_string());
        }

        let body = text[2..text.len() - 2].trim_matches('~').trim();
        if body.starts_with('/') {
            self.blocks.pop();
            return Ok(text.to_string());
        }

        if let Some(caps) = EACH_FIELDS_RE.captures(body) {
            let path = caps["path"].to_string();
            let format = self.field_format(&path, None)?;
            self.usage.fields.insert(path.clone(), format);
            self.blocks.push(Some(EachFrame {
                item: caps["item"].to_string(),
                path,
            }));
            return Ok(text.replacen("@fields.", "@model.", 1));
        }

        if body.starts_with('#') {
            self.blocks.push(None);
        }
        if text.contains("@fields") {
            return Err(TemplateError::UnsupportedFieldsUsage {
                module: self.options.module_name.to_string(),
            });
        }

        self.record_model_reads(text);
        Ok(text.to_string())
    }

    fn element(&mut self, caps: &Captures<'_>) -> Result<String, TemplateError> {
        let text = &caps[0];
        let closing = &caps["close"] == "/";
        let self_closing = &caps["selfclose"] == "/";
        let tag = &caps["tag"];
        let attrs = &caps["attrs"];

        if let Some(path) = tag.strip_prefix("@fields.") {
            if closing || !self_closing {
                return Err(TemplateError::NotSelfClosing {
                    path: path.to_string(),
                    module: self.options.module_name.to_string(),
                });
            }
            return self.invoke_field(path, &format!("@model.{}", path), attrs);
        }

        if tag == "@fields" {
            return Err(TemplateError::UnsupportedFieldsUsage {
                module: self.options.module_name.to_string(),
            });
        }

        if let Some(rest) = tag.strip_prefix("@model") {
            if rest.is_empty() || rest.starts_with('.') {
                self.usage.model.insert(rest.trim_start_matches('.'));
            }
        } else if !closing {
            let item_path = self
                .blocks
                .iter()
                .rev()
                .flatten()
                .find(|frame| frame.item == tag)
                .map(|frame| frame.path.clone());
            if let Some(path) = item_path {
                if !self_closing {
                    return Err(TemplateError::NotSelfClosing {
                        path,
                        module: self.options.module_name.to_string(),
                    });
                }
                return self.invoke_field(&path, tag, attrs);
            }
        }

        for mustache in MUSTACHE_RE.find_iter(attrs) {
            self.record_model_reads(mustache.as_str());
        }
        Ok(text.to_string())
    }

    /// Emit `<Name @model={{model_expr}} .../>` for the field at `path`
    fn invoke_field(&mut self, path: &str, model_expr: &str, attrs: &str) -> Result<String, TemplateError> {
        let (explicit, rest) = match FORMAT_ATTR_RE.captures(attrs) {
            Some(caps) => {
                let value = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
                let format = value.parse::<Format>().map_err(|_| TemplateError::InvalidFormat {
                    value: value.to_string(),
                    path: path.to_string(),
                    module: self.options.module_name.to_string(),
                })?;
                let range = caps.get(0).map_or(0..0, |m| m.range());
                (Some(format), format!("{}{}", &attrs[..range.start], &attrs[range.end..]))
            }
            None => (None, attrs.to_string()),
        };

        let format = self.field_format(path, explicit)?;
        let field = field_for_path(self.options.fields, path).ok_or_else(|| self.unknown_field(path))?;
        let module = &field.card.component(format).module_name;
        let name = (self.import_component)(&component_name(path), module);
        self.usage.fields.insert(path.to_string(), format);

        for mustache in MUSTACHE_RE.find_iter(&rest) {
            self.record_model_reads(mustache.as_str());
        }
        Ok(format!("<{} @model={{{{{}}}}}{}/>", name, model_expr, rest.trim_end()))
    }

    /// Effective format for a field invocation, checking the field exists
    fn field_format(&self, path: &str, explicit: Option<Format>) -> Result<Format, TemplateError> {
        if field_for_path(self.options.fields, path).is_none() {
            return Err(self.unknown_field(path));
        }
        explicit
            .or(self.options.default_format)
            .ok_or_else(|| TemplateError::MissingNestedFormat {
                path: path.to_string(),
                module: self.options.module_name.to_string(),
            })
    }

    fn record_model_reads(&mut self, text: &str) {
        for caps in MODEL_RE.captures_iter(text) {
            // `@modelFoo` is a different argument
            if !caps[1].is_empty() {
                continue;
            }
            self.usage.model.insert(caps[2].trim_start_matches('.'));
        }
    }

    fn unknown_field(&self, path: &str) -> TemplateError {
        TemplateError::UnknownField {
            path: path.to_string(),
            module: self.options.module_name.to_string(),
        }
    }
}

/// `author.bestFriend` → `AuthorBestFriendField`
fn component_name(path: &str) -> String {
    let mut name = String::with_capacity(path.len() + 5);
    for segment in path.split('.') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name.push_str("Field");
    name
}
