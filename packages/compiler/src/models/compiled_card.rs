//! Compiled card types
//!
//! ## Example
//!
//! ```json
//! {
//!   "url": "https://demo.com/person",
//!   "fields": {
//!     "name": { "type": "contains", "card": { "url": "https://cardstack.com/base/string", ... }, "name": "name" }
//!   },
//!   "schemaModule": "https://demo.com/person/schema.js",
//!   "embedded": {
//!     "moduleName": "https://demo.com/person/embedded-6f1c...js",
//!     "usedFields": ["name", "birthdate"],
//!     "sourceCardURL": "https://demo.com/person",
//!     "deserialize": { "date": ["birthdate"] }
//!   }
//! }
//! ```

use super::format::{FieldType, Format, SerializerName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered field map; insertion order is the order templates iterate fields in
pub type Fields = IndexMap<String, Field>;

/// Serializer name → used field paths needing that serializer
pub type SerializerMap = BTreeMap<SerializerName, Vec<String>>;

/// A named slot on a card, typed by another compiled card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Compiled field-type card
    pub card: Arc<CompiledCard>,

    pub name: String,
}

/// Compiled component for one format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    /// Handle returned by the module sink for the generated component code
    pub module_name: String,

    /// Flattened field paths the template dereferences (`"author.name"`)
    pub used_fields: Vec<String>,

    /// Template body, when it can be inlined without extra scope
    #[serde(rename = "inlineHBS", skip_serializing_if = "Option::is_none")]
    pub inline_hbs: Option<String>,

    /// Card whose file this component was compiled from
    #[serde(rename = "sourceCardURL")]
    pub source_card_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deserialize: Option<SerializerMap>,
}

/// Kind of a non-feature file shipped with a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Css,
    Unknown,
}

impl AssetType {
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".css") {
            AssetType::Css
        } else {
            AssetType::Unknown
        }
    }
}

/// A card file that is neither the schema nor a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub path: String,
}

/// Fully resolved card
///
/// Built once by the compiler and never mutated afterwards. Ancestors and field
/// cards are shared read-only through `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledCard {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopts_from: Option<Arc<CompiledCard>>,

    /// Own fields followed by every inherited field; names are unique across the chain
    pub fields: Fields,

    pub schema_module: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serializer: Option<SerializerName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default)]
    pub assets: Vec<Asset>,

    pub isolated: ComponentInfo,
    pub embedded: ComponentInfo,
    pub edit: ComponentInfo,
}

impl CompiledCard {
    /// Component compiled for `format`
    pub fn component(&self, format: Format) -> &ComponentInfo {
        match format {
            Format::Isolated => &self.isolated,
            Format::Embedded => &self.embedded,
            Format::Edit => &self.edit,
        }
    }

    /// Field names in iteration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Parent URL, if this card adopts from another card
    pub fn parent_url(&self) -> Option<&str> {
        self.adopts_from.as_deref().map(|parent| parent.url.as_str())
    }

    /// A card is primitive when it has no fields of its own or inherited
    pub fn is_primitive(&self) -> bool {
        self.fields.is_empty()
    }
}
