//! Utility functions for the card compiler
//!
//! This module provides helpers shared by the schema, template and compiler layers.

mod edits;
mod fields;
mod paths;

pub use edits::{apply_edits, choose_name, Edit};
pub use fields::{field_for_path, hashed_module_path};
pub use paths::{basename_and_extension, resolve_card_url};
