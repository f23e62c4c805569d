//! Compiled card fixtures for unit tests

use super::{CompiledCard, ComponentInfo, Field, FieldType, Format, SerializerName};
use indexmap::IndexMap;
use std::sync::Arc;

pub(crate) struct CardFixture {
    card: CompiledCard,
}

impl CardFixture {
    pub(crate) fn new(url: &str) -> Self {
        let component = |format: Format| ComponentInfo {
            module_name: format!("{}/{}.js", url, format),
            used_fields: Vec::new(),
            inline_hbs: None,
            source_card_url: url.to_string(),
            deserialize: None,
        };

        Self {
            card: CompiledCard {
                url: url.to_string(),
                adopts_from: None,
                fields: IndexMap::new(),
                schema_module: format!("{}/schema.js", url),
                serializer: None,
                data: None,
                assets: Vec::new(),
                isolated: component(Format::Isolated),
                embedded: component(Format::Embedded),
                edit: component(Format::Edit),
            },
        }
    }

    pub(crate) fn field(mut self, name: &str, card: &Arc<CompiledCard>) -> Self {
        self.card.fields.insert(
            name.to_string(),
            Field {
                field_type: FieldType::Contains,
                card: Arc::clone(card),
                name: name.to_string(),
            },
        );
        self
    }

    pub(crate) fn used(mut self, format: Format, paths: &[&str]) -> Self {
        let component = match format {
            Format::Isolated => &mut self.card.isolated,
            Format::Embedded => &mut self.card.embedded,
            Format::Edit => &mut self.card.edit,
        };
        component.used_fields = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub(crate) fn serializer(mut self, serializer: SerializerName) -> Self {
        self.card.serializer = Some(serializer);
        self
    }

    pub(crate) fn build(self) -> Arc<CompiledCard> {
        Arc::new(self.card)
    }
}

/// `string`, `date`, `pet`, `person` and `post` cards wired together
pub(crate) fn blog_cards() -> IndexMap<&'static str, Arc<CompiledCard>> {
    let string = CardFixture::new("https://cardstack.com/base/string").build();
    let date = CardFixture::new("https://cardstack.com/base/date")
        .serializer(SerializerName::Date)
        .build();
    let pet = CardFixture::new("https://demo.com/pet")
        .field("species", &string)
        .used(Format::Embedded, &["species"])
        .build();
    let person = CardFixture::new("https://demo.com/person")
        .field("name", &string)
        .field("birthdate", &date)
        .field("bestFriend", &pet)
        .used(Format::Embedded, &["name", "bestFriend.species"])
        .build();
    let post = CardFixture::new("https://demo.com/post")
        .field("title", &string)
        .field("createdAt", &date)
        .field("author", &person)
        .build();

    IndexMap::from([
        ("string", string),
        ("date", date),
        ("pet", pet),
        ("person", person),
        ("post", post),
    ])
}
