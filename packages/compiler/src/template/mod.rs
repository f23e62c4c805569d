//! Template Compilation
//!
//! Card templates read card data through two arguments:
//!
//! - `@model.path` reads a value directly (model usage)
//! - `<@fields.path/>` renders a field through the field card's own component
//!   (field usage), at an explicit `@format` or the format's default
//!
//! Compilation runs in two passes. The [`glimmer`] pass rewrites field
//! invocations into imported sub-components and records a
//! [`TemplateUsageMeta`]. The [`usage`] pass expands that record into the
//! flattened list of used field paths, independent of the template text.
//! [`component`] ties both together for `.hbs` files and for JS modules that
//! call `precompileTemplate`.

pub mod component;
mod error;
pub mod glimmer;
pub mod usage;

pub use component::{compile_template, CompiledTemplate, TemplateContext};
pub use error::TemplateError;
pub use glimmer::{transform_template, TransformOptions, TransformOutput};
pub use usage::{serializer_map, used_fields};

use crate::models::Format;
use indexmap::{IndexMap, IndexSet};

/// What a template reads through `@model`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelUsage {
    /// Bare `{{@model}}`: the whole model is handed on without reading a field
    Whole,
    /// Dotted paths read below `@model`
    Paths(IndexSet<String>),
}

impl Default for ModelUsage {
    fn default() -> Self {
        ModelUsage::Paths(IndexSet::new())
    }
}

impl ModelUsage {
    /// Record a read of `path`; the empty path means the whole model
    pub fn insert(&mut self, path: &str) {
        if path.is_empty() {
            *self = ModelUsage::Whole;
        } else if let ModelUsage::Paths(paths) = self {
            paths.insert(path.to_string());
        }
    }
}

/// Raw usage recorded by the rewrite pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateUsageMeta {
    pub model: ModelUsage,

    /// Field path → format the field component is rendered at
    pub fields: IndexMap<String, Format>,
}
