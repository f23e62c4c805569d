//! Raw (uncompiled) card definitions
//!
//! A raw card is what a realm stores: the card.json properties plus a flat map
//! of files. Feature properties (`schema`, `isolated`, `embedded`, `edit`) are
//! paths into that file map.
//!
//! ## Example card.json
//!
//! ```json
//! {
//!   "schema": "schema.js",
//!   "embedded": "embedded.js",
//!   "adoptsFrom": "../person",
//!   "deserializer": "date"
//! }
//! ```

use super::format::{Format, SerializerName};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Raw card shape errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RawCardError {
    #[error("card missing URL")]
    MissingUrl,

    #[error("card.json in {url} refers to non-existent module {path}")]
    NonExistentModule { url: String, path: String },

    #[error("invalid data property in {url}")]
    InvalidData { url: String },

    #[error("invalid card.json for {url}: {message}")]
    InvalidCardJson { url: String, message: String },
}

/// Uncompiled card as provided by a realm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    /// Absolute card URL, the key for every cross-reference
    #[serde(default)]
    pub url: String,

    /// Path of the schema module inside `files`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub isolated: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,

    /// URL (absolute or relative to `url`) of the parent card
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adopts_from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deserializer: Option<SerializerName>,

    /// Flat list of files inside the card, keyed by relative path
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub files: IndexMap<String, String>,

    /// Literal field values when the card is an instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RawCard {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Parse a card.json document for the card at `url`
    ///
    /// The `url` argument wins over any `url` property inside the document.
    pub fn from_card_json(
        url: impl Into<String>,
        card_json: &str,
        files: IndexMap<String, String>,
    ) -> Result<Self, RawCardError> {
        let url = url.into();
        let mut card: RawCard =
            serde_json::from_str(card_json).map_err(|e| RawCardError::InvalidCardJson {
                url: url.clone(),
                message: e.to_string(),
            })?;
        card.url = url;
        card.files = files;
        Ok(card)
    }

    /// Template path declared for a format
    pub fn template_path(&self, format: Format) -> Option<&str> {
        match format {
            Format::Isolated => self.isolated.as_deref(),
            Format::Embedded => self.embedded.as_deref(),
            Format::Edit => self.edit.as_deref(),
        }
    }

    /// Every declared feature file as `(feature name, path)`
    pub fn feature_paths(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("schema", self.schema.as_deref()),
            ("isolated", self.isolated.as_deref()),
            ("embedded", self.embedded.as_deref()),
            ("edit", self.edit.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, path)| path.map(|p| (name, p)))
    }

    /// Look up a file, tolerating a leading `./`
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files
            .get(normalize_path(path))
            .map(String::as_str)
    }

    /// Check the card's shape
    ///
    /// # Errors
    ///
    /// - `MissingUrl`: the URL is empty
    /// - `NonExistentModule`: a feature path is not a key of `files`
    /// - `InvalidData`: `data` is present but not an object
    pub fn validate(&self) -> Result<(), RawCardError> {
        if self.url.is_empty() {
            return Err(RawCardError::MissingUrl);
        }

        for (_, path) in self.feature_paths() {
            if self.file(path).is_none() {
                return Err(RawCardError::NonExistentModule {
                    url: self.url.clone(),
                    path: path.to_string(),
                });
            }
        }

        if let Some(data) = &self.data {
            if !data.is_object() {
                return Err(RawCardError::InvalidData {
                    url: self.url.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Strip the `./` prefix card.json paths are allowed to carry
pub(crate) fn normalize_path(path: &str) -> &str {
    path.strip_prefix("./").unwrap_or(path)
}
