//! Adoption rules: parent resolution, field merging, serializer inheritance

use super::error::{CompileError, Result};
use crate::config::CompilerConfig;
use crate::models::{CompiledCard, Fields, RawCard, SerializerName};
use crate::utils::resolve_card_url;

/// Determine the parent URL of a non-base card
///
/// `adoptsFrom` in card.json and `@adopts` in the schema must agree when both
/// are given. Without either, the card adopts from the base card. A card that
/// names itself as parent is rejected before anything is fetched.
pub fn parent_url(raw: &RawCard, schema_parent: Option<&str>, config: &CompilerConfig) -> Result<String> {
    let declared = raw
        .adopts_from
        .as_deref()
        .map(|specifier| resolve_card_url(specifier, &raw.url).map_err(|e| CompileError::invalid_url(specifier, e)))
        .transpose()?;

    let parent = match (declared, schema_parent) {
        (Some(declared), Some(schema)) if declared != schema => {
            if declared == raw.url || schema == raw.url {
                return Err(CompileError::SelfParent { url: raw.url.clone() });
            }
            return Err(CompileError::ConflictingParent { url: raw.url.clone() });
        }
        (_, Some(schema)) => schema.to_string(),
        (Some(declared), None) => declared,
        (None, None) => config.base_card_url.clone(),
    };

    if parent == raw.url {
        return Err(CompileError::SelfParent { url: raw.url.clone() });
    }
    Ok(parent)
}

/// Merge own fields with the parent's
///
/// The parent's field map already holds every ancestor's fields, so one
/// intersection covers the whole chain. Own fields come first.
pub fn adopt_fields(own: Fields, parent: &CompiledCard) -> Result<Fields> {
    let collisions: Vec<String> = own
        .keys()
        .filter(|name| parent.fields.contains_key(*name))
        .cloned()
        .collect();

    if !collisions.is_empty() {
        return Err(CompileError::FieldCollision {
            names: collisions,
            parent_url: parent.url.clone(),
        });
    }

    let mut merged = own;
    merged.extend(parent.fields.iter().map(|(name, field)| (name.clone(), field.clone())));
    Ok(merged)
}

/// A card inherits its parent's serializer but may not declare a different one
pub fn inherit_serializer(
    url: &str,
    own: Option<SerializerName>,
    parent: &CompiledCard,
) -> Result<Option<SerializerName>> {
    match (own, parent.serializer) {
        (Some(serializer), Some(parent_serializer)) if serializer != parent_serializer => {
            Err(CompileError::ConflictingDeserializer {
                url: url.to_string(),
                serializer,
                parent_url: parent.url.clone(),
                parent_serializer,
            })
        }
        (own, None) => Ok(own),
        (_, inherited) => Ok(inherited),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::testing::{blog_cards, CardFixture};

    fn raw(url: &str, adopts_from: Option<&str>) -> RawCard {
        let mut card = RawCard::new(url);
        card.adopts_from = adopts_from.map(str::to_string);
        card
    }

    #[test]
    fn test_parent_defaults_to_base_card() {
        let config = CompilerConfig::default();
        assert_eq!(
            parent_url(&raw("https://demo.com/post", None), None, &config).unwrap(),
            "https://cardstack.com/base/base"
        );
    }

    #[test]
    fn test_card_json_parent_is_relative() {
        let config = CompilerConfig::default();
        assert_eq!(
            parent_url(&raw("https://demo.com/post0", Some("../post")), None, &config).unwrap(),
            "https://demo.com/post"
        );
    }

    #[test]
    fn test_matching_parents_are_accepted() {
        let config = CompilerConfig::default();
        let card = raw("https://demo.com/cards/user", Some("./person"));
        assert_eq!(
            parent_url(&card, Some("https://demo.com/cards/person"), &config).unwrap(),
            "https://demo.com/cards/person"
        );
    }

    #[test]
    fn test_conflicting_parents() {
        let config = CompilerConfig::default();
        let card = raw("https://demo.com/user", Some("https://demo.com/person"));
        let err = parent_url(&card, Some("https://demo.com/admin"), &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "https://demo.com/user provides conflicting parent URLs in card.json and schema.js"
        );
    }

    #[test]
    fn test_self_parent() {
        let config = CompilerConfig::default();
        let card = raw("https://demo.com/user", Some("https://demo.com/user"));
        let err = parent_url(&card, None, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "BUG: https://demo.com/user provides itself as its parent. That should not happen."
        );

        let card = raw("https://demo.com/user", None);
        assert!(matches!(
            parent_url(&card, Some("https://demo.com/user"), &config),
            Err(CompileError::SelfParent { .. })
        ));
    }

    #[test]
    fn test_adopt_fields_order_and_collision() {
        let cards = blog_cards();
        let string = &cards["string"];

        let own = CardFixture::new("https://demo.com/user")
            .field("username", string)
            .build()
            .fields
            .clone();
        let merged = adopt_fields(own, &cards["person"]).unwrap();
        let names: Vec<_> = merged.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["username", "name", "birthdate", "bestFriend"]);

        let own = CardFixture::new("https://demo.com/user")
            .field("birthdate", string)
            .field("name", string)
            .build()
            .fields
            .clone();
        let err = adopt_fields(own, &cards["person"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field collision on birthdate,name with parent card https://demo.com/person"
        );
    }

    #[test]
    fn test_inherit_serializer() {
        let cards = blog_cards();
        let date = &cards["date"];

        assert_eq!(
            inherit_serializer("https://demo.com/d", None, date).unwrap(),
            Some(SerializerName::Date)
        );
        assert_eq!(
            inherit_serializer("https://demo.com/d", Some(SerializerName::Date), date).unwrap(),
            Some(SerializerName::Date)
        );
        assert_eq!(
            inherit_serializer("https://demo.com/d", Some(SerializerName::Datetime), &cards["string"]).unwrap(),
            Some(SerializerName::Datetime)
        );

        let err = inherit_serializer("https://demo.com/d", Some(SerializerName::Datetime), date).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Your card declares a different deserializer than your parent. Thats not allowed. Card: https://demo.com/d:datetime Parent: https://cardstack.com/base/date:date"
        );
    }
}
