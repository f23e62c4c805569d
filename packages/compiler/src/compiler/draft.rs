//! Partially assembled compiled card

use super::error::{CompileError, Result};
use crate::models::{Asset, CompiledCard, ComponentInfo, Fields, Format, RawCard, SerializerName};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Accumulates the pieces of a [`CompiledCard`] as the compile steps run
#[derive(Debug, Default)]
pub(crate) struct CardDraft {
    pub url: String,
    pub data: Option<Value>,
    pub serializer: Option<SerializerName>,
    pub schema_module: Option<String>,
    pub fields: Fields,
    pub assets: Vec<Asset>,
    pub adopts_from: Option<Arc<CompiledCard>>,
    pub components: HashMap<Format, ComponentInfo>,
}

impl CardDraft {
    /// Seed from the raw card's url, data and deserializer
    pub fn seed(raw: &RawCard) -> Self {
        Self {
            url: raw.url.clone(),
            data: raw.data.clone(),
            serializer: raw.deserializer,
            ..Default::default()
        }
    }

    /// Check the compiled-card invariants and produce the final value
    pub fn finish(mut self) -> Result<CompiledCard> {
        let schema_module = match self.schema_module.take() {
            Some(module) if !module.is_empty() => module,
            _ => return Err(CompileError::MissingSchema { url: self.url }),
        };

        for (name, field) in &self.fields {
            if &field.name != name {
                return Err(CompileError::invalid_compiled_card(
                    &self.url,
                    format!("field {} is stored under the name {}", field.name, name),
                ));
            }
        }

        for (format, component) in &self.components {
            if component.module_name.is_empty() {
                return Err(CompileError::invalid_compiled_card(
                    &self.url,
                    format!("{} component has no module", format),
                ));
            }
            if component.deserialize.as_ref().is_some_and(|map| map.is_empty()) {
                return Err(CompileError::invalid_compiled_card(
                    &self.url,
                    format!("{} component has an empty deserialization map", format),
                ));
            }
        }

        let mut take = |format: Format| {
            self.components.remove(&format).ok_or_else(|| CompileError::MissingComponent {
                url: self.url.clone(),
                format,
            })
        };
        let isolated = take(Format::Isolated)?;
        let embedded = take(Format::Embedded)?;
        let edit = take(Format::Edit)?;

        Ok(CompiledCard {
            url: self.url,
            adopts_from: self.adopts_from,
            fields: self.fields,
            schema_module,
            serializer: self.serializer,
            data: self.data,
            assets: self.assets,
            isolated,
            embedded,
            edit,
        })
    }
}
