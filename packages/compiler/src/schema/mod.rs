//! Schema Extraction
//!
//! A card schema is a JS module whose default export is a class. Properties of
//! that class are declared as fields by annotating them with decorators imported
//! from the types module, and the class itself may declare its parent card:
//!
//! ```js
//! import { adopts, contains } from "@cardstack/types";
//! import Person from "https://demo.com/person";
//! import string from "https://cardstack.com/base/string";
//!
//! export default @adopts(Person) class User {
//!   @contains(string) username;
//! }
//! ```
//!
//! The extractor matches these shapes on the parsed module and produces a
//! [`SchemaMeta`] record together with rewritten module code in which the
//! annotations are replaced by static metadata properties.

mod annotation;
mod error;
mod extractor;

pub use annotation::Annotation;
pub use error::SchemaError;
pub use extractor::compile_schema;

use crate::models::FieldType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A field declared by the schema itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMeta {
    pub name: String,

    /// Absolute URL of the field-type card
    #[serde(rename = "cardURL")]
    pub card_url: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,
}

/// Parent declared with `@adopts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentMeta {
    #[serde(rename = "cardURL")]
    pub card_url: String,
}

/// Everything the compiler learns from a schema module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMeta {
    /// Own fields in declaration order
    pub fields: IndexMap<String, FieldMeta>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentMeta>,
}

/// Input for [`compile_schema`]
#[derive(Debug, Clone, Copy)]
pub struct SchemaContext<'a> {
    /// URL of the card the schema belongs to; import specifiers resolve against it
    pub card_url: &'a str,

    /// Module specifier annotations must be imported from
    pub types_module: &'a str,
}

/// Output of [`compile_schema`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    pub meta: SchemaMeta,

    /// Module source with annotations replaced by static metadata
    pub code: String,
}
