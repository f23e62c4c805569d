//! Compiler Error Types
//!
//! Every failure aborts the whole compile; there is no partial result. The
//! display strings are stable and name the cards and files involved.

use crate::models::{Format, RawCardError, SerializerName};
use crate::schema::SchemaError;
use crate::template::TemplateError;
use thiserror::Error;

/// Card compilation errors
#[derive(Error, Debug)]
pub enum CompileError {
    /// Raw card failed shape validation
    #[error(transparent)]
    InvalidRawCard(#[from] RawCardError),

    /// Compiler configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Schema module could not be extracted
    #[error("{location}: {source}")]
    Schema { location: String, source: SchemaError },

    /// Template module could not be compiled
    #[error("{location}: {source}")]
    Template { location: String, source: TemplateError },

    /// Own fields shadow fields of the ancestor chain
    #[error("Field collision on {} with parent card {parent_url}", .names.join(","))]
    FieldCollision { names: Vec<String>, parent_url: String },

    #[error("BUG: {url} provides itself as its parent. That should not happen.")]
    SelfParent { url: String },

    /// card.json and schema name different parents
    #[error("{url} provides conflicting parent URLs in card.json and schema.js")]
    ConflictingParent { url: String },

    #[error("{url} does not have a parent card. This is wrong and should not happen.")]
    MissingParent { url: String },

    #[error(
        "Your card declares a different deserializer than your parent. Thats not allowed. Card: {url}:{serializer} Parent: {parent_url}:{parent_serializer}"
    )]
    ConflictingDeserializer {
        url: String,
        serializer: SerializerName,
        parent_url: String,
        parent_serializer: SerializerName,
    },

    #[error("{url} does not have a schema. This is wrong and should not happen.")]
    MissingSchema { url: String },

    #[error("{url} doesn't have a {format} component OR a parent card. This is not right.")]
    MissingComponent { url: String, format: Format },

    /// card.json names a file the card does not ship
    #[error("{url} refers to {path} in its card.json but that file does not exist")]
    MissingFile { url: String, path: String },

    /// Parent's component claims a source card that has no such template
    #[error("bug: {parent_url} says it got {format} from {source_card_url}, but that card does not have a {format} component")]
    MissingInheritedComponent {
        parent_url: String,
        format: Format,
        source_card_url: String,
    },

    /// A card is reached again while it is still being compiled
    #[error("Cyclic card reference detected: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("Invalid card URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Assembled card violates a compiled-card invariant
    #[error("{url} compiled to an invalid card: {message}")]
    InvalidCompiledCard { url: String, message: String },

    /// Builder or module sink failure, including errors from nested compiles
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl CompileError {
    pub fn schema(location: impl Into<String>, source: SchemaError) -> Self {
        Self::Schema {
            location: location.into(),
            source,
        }
    }

    pub fn template(location: impl Into<String>, source: TemplateError) -> Self {
        Self::Template {
            location: location.into(),
            source,
        }
    }

    pub fn missing_file(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self::MissingFile {
            url: url.into(),
            path: path.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_compiled_card(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidCompiledCard {
            url: url.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message() {
        let err = CompileError::FieldCollision {
            names: vec!["name".to_string(), "birthdate".to_string()],
            parent_url: "http://mirage/cards/person".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field collision on name,birthdate with parent card http://mirage/cards/person"
        );
    }

    #[test]
    fn test_cycle_message() {
        let err = CompileError::Cycle {
            chain: vec!["https://a".to_string(), "https://b".to_string(), "https://a".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic card reference detected: https://a -> https://b -> https://a");
    }

    #[test]
    fn test_collaborator_error_is_transparent() {
        let inner = CompileError::MissingSchema {
            url: "https://demo.com/x".to_string(),
        };
        let err = CompileError::from(anyhow::Error::new(inner));
        assert_eq!(
            err.to_string(),
            "https://demo.com/x does not have a schema. This is wrong and should not happen."
        );
    }

    #[test]
    fn test_schema_error_location() {
        let err = CompileError::schema("https://demo.com/x/schema.js", SchemaError::AdoptsOnProperty);
        assert_eq!(
            err.to_string(),
            "https://demo.com/x/schema.js: @adopts decorator can only be used on a class"
        );
    }
}
