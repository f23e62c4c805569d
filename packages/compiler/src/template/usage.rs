//! Used-field closure over a merged field set
//!
//! Pure functions over [`TemplateUsageMeta`] and [`Fields`]; nothing here
//! looks at template text.

use super::{ModelUsage, TemplateUsageMeta};
use crate::models::{Fields, Format, SerializerMap};
use crate::utils::field_for_path;
use indexmap::IndexSet;

/// Flatten recorded usage into the field paths a component dereferences
///
/// A path naming a composite field never appears itself. Model reads expand
/// into every sub-field of the composite card; field renders expand into the
/// used fields of the nested component at the format it was rendered at. The
/// expansion recurses until it reaches primitive cards, so the result only
/// holds leaf paths such as `"author.bestFriend.species"`.
///
/// Model paths come first, followed by field paths, each in recorded order.
/// A template that only hands on the bare `{{@model}}` contributes no model
/// paths.
pub fn used_fields(fields: &Fields, usage: &TemplateUsageMeta) -> Vec<String> {
    let mut used = IndexSet::new();

    match &usage.model {
        // the bare model names no field of its own
        ModelUsage::Whole => {}
        ModelUsage::Paths(paths) => {
            for path in paths {
                expand_data(&mut used, fields, path, "");
            }
        }
    }

    for (path, format) in &usage.fields {
        expand_component(&mut used, fields, path, *format, "");
    }

    used.into_iter().collect()
}

/// Group used field paths by the serializer their field card declares
pub fn serializer_map(fields: &Fields, used_fields: &[String]) -> SerializerMap {
    let mut map = SerializerMap::new();
    for path in used_fields {
        let Some(serializer) = field_for_path(fields, path).and_then(|field| field.card.serializer) else {
            continue;
        };
        map.entry(serializer).or_default().push(path.clone());
    }
    map
}

fn expand_data(used: &mut IndexSet<String>, fields: &Fields, path: &str, prefix: &str) {
    match field_for_path(fields, path) {
        Some(field) if !field.card.fields.is_empty() => {
            let prefix = join(prefix, path);
            for nested in field.card.fields.keys() {
                expand_component(used, &field.card.fields, nested, Format::Embedded, &prefix);
            }
        }
        _ => {
            used.insert(join(prefix, path));
        }
    }
}

fn expand_component(used: &mut IndexSet<String>, fields: &Fields, path: &str, format: Format, prefix: &str) {
    match field_for_path(fields, path) {
        Some(field) if !field.card.component(format).used_fields.is_empty() => {
            let prefix = join(prefix, path);
            for nested in &field.card.component(format).used_fields {
                expand_component(used, &field.card.fields, nested, Format::Embedded, &prefix);
            }
        }
        _ => {
            used.insert(join(prefix, path));
        }
    }
}

fn join(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        path.to_string()
    } else {
        format!("{}.{}", prefix, path)
    }
}
