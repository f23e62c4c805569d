//! Data Models
//!
//! This module contains the card data structures used throughout the compiler:
//!
//! - `RawCard` - Uncompiled card as stored in a realm (card.json plus files)
//! - `CompiledCard` - Resolved card with merged fields and per-format components
//! - `Format`, `FieldType`, `SerializerName` - Closed enums shared by both
//!
//! A `CompiledCard` is a value: it has no mutation API once constructed and
//! shares its ancestors and field cards through `Arc`.

mod compiled_card;
mod format;
mod raw_card;

#[cfg(test)]
pub(crate) mod testing;

pub use compiled_card::{Asset, AssetType, CompiledCard, ComponentInfo, Field, Fields, SerializerMap};
pub use format::{FieldType, Format, SerializerName};
pub use raw_card::{RawCard, RawCardError};
pub(crate) use raw_card::normalize_path;
