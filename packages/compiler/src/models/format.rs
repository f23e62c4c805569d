//! Closed enumerations shared by raw and compiled cards

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display format of a card component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Full detail view
    Isolated,
    /// Summary view, used when a card is rendered inside another card
    Embedded,
    /// Editable view
    Edit,
}

impl Format {
    /// Every format, in the order components are compiled
    pub const ALL: [Format; 3] = [Format::Isolated, Format::Embedded, Format::Edit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Isolated => "isolated",
            Format::Embedded => "embedded",
            Format::Edit => "edit",
        }
    }

    /// Format used for a nested field rendered without an explicit `@format`
    ///
    /// Returns `None` for `edit`: composing nested edit components is not supported.
    pub fn default_nested_format(&self) -> Option<Format> {
        match self {
            Format::Isolated | Format::Embedded => Some(Format::Embedded),
            Format::Edit => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isolated" => Ok(Format::Isolated),
            "embedded" => Ok(Format::Embedded),
            "edit" => Ok(Format::Edit),
            other => Err(format!("'{}' is not a valid format", other)),
        }
    }
}

/// Relationship kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Contains,
    ContainsMany,
    BelongsTo,
    HasMany,
}

impl FieldType {
    /// Name of the schema annotation that declares this field type
    pub fn decorator_name(&self) -> &'static str {
        match self {
            FieldType::Contains => "contains",
            FieldType::ContainsMany => "containsMany",
            FieldType::BelongsTo => "belongsTo",
            FieldType::HasMany => "hasMany",
        }
    }

    /// Look up a field type by its annotation name
    pub fn from_decorator(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(FieldType::Contains),
            "containsMany" => Some(FieldType::ContainsMany),
            "belongsTo" => Some(FieldType::BelongsTo),
            "hasMany" => Some(FieldType::HasMany),
            _ => None,
        }
    }

    /// Whether the field holds a list of values
    pub fn is_plural(&self) -> bool {
        matches!(self, FieldType::ContainsMany | FieldType::HasMany)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.decorator_name())
    }
}

/// Named serializer applied to a card's own values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerName {
    Date,
    Datetime,
}

impl SerializerName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SerializerName::Date => "date",
            SerializerName::Datetime => "datetime",
        }
    }
}

impl fmt::Display for SerializerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SerializerName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SerializerName::Date),
            "datetime" => Ok(SerializerName::Datetime),
            other => Err(format!("Unexpected serializer: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_nested_format() {
        assert_eq!(Format::Isolated.default_nested_format(), Some(Format::Embedded));
        assert_eq!(Format::Embedded.default_nested_format(), Some(Format::Embedded));
        assert_eq!(Format::Edit.default_nested_format(), None);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("edit".parse::<Format>().unwrap(), Format::Edit);
        assert!("summary".parse::<Format>().is_err());
    }

    #[test]
    fn test_field_type_from_decorator() {
        assert_eq!(FieldType::from_decorator("containsMany"), Some(FieldType::ContainsMany));
        assert_eq!(FieldType::from_decorator("adopts"), None);
        assert!(FieldType::HasMany.is_plural());
        assert!(!FieldType::BelongsTo.is_plural());
    }

    #[test]
    fn test_serializer_serde_names() {
        let json = serde_json::to_string(&SerializerName::Datetime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let err = "time".parse::<SerializerName>().unwrap_err();
        assert_eq!(err, "Unexpected serializer: time");
    }
}
