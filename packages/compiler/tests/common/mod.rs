//! Shared card fixtures for integration tests
//!
//! Every test gets a fresh [`MemoryRealm`] seeded with the base, string and
//! date cards plus a person card, wrapped in a [`CardBuilder`].

#![allow(dead_code)]

use cardstack_compiler::{CardBuilder, Format, InMemoryModules, MemoryRealm, RawCard, SerializerName};
use std::sync::Arc;

pub const BASE: &str = "https://cardstack.com/base/base";
pub const STRING: &str = "https://cardstack.com/base/string";
pub const DATE: &str = "https://cardstack.com/base/date";
pub const PERSON: &str = "http://mirage/cards/person";

pub const PERSON_SCHEMA: &str = r#"
import { contains } from "@cardstack/types";
import date from "https://cardstack.com/base/date";
import string from "https://cardstack.com/base/string";

export default class Person {
  @contains(string)
  name;

  @contains(date)
  birthdate;
}
"#;

/// Wrap a template in a template-only component module
pub fn template_only(template: &str) -> String {
    format!(
        r#"import {{ precompileTemplate }} from "@ember/template-compilation";
import {{ setComponentTemplate }} from "@ember/component";
import templateOnlyComponent from "@ember/component/template-only";

export default setComponentTemplate(
  precompileTemplate(`{}`, {{ strictMode: true }}),
  templateOnlyComponent()
);
"#,
        template
    )
}

/// Raw card under construction
pub struct CardSource(RawCard);

impl CardSource {
    pub fn new(url: &str) -> Self {
        Self(RawCard::new(url))
    }

    pub fn schema(mut self, source: &str) -> Self {
        self.0.schema = Some("schema.js".to_string());
        self.file("schema.js", source)
    }

    /// Add `{format}.js` as the card's template for `format`
    pub fn template(mut self, format: Format, template: &str) -> Self {
        let path = format!("{}.js", format);
        let slot = match format {
            Format::Isolated => &mut self.0.isolated,
            Format::Embedded => &mut self.0.embedded,
            Format::Edit => &mut self.0.edit,
        };
        *slot = Some(path.clone());
        self.file(&path, &template_only(template))
    }

    pub fn adopts_from(mut self, url: &str) -> Self {
        self.0.adopts_from = Some(url.to_string());
        self
    }

    pub fn deserializer(mut self, serializer: SerializerName) -> Self {
        self.0.deserializer = Some(serializer);
        self
    }

    pub fn file(mut self, path: &str, source: &str) -> Self {
        self.0.files.insert(path.to_string(), source.to_string());
        self
    }

    pub fn build(self) -> RawCard {
        self.0
    }
}

/// Base, string and date cards
pub fn base_realm_cards() -> Vec<RawCard> {
    vec![
        CardSource::new(BASE)
            .schema("export default class Base {}")
            .template(Format::Isolated, "{{@model}}")
            .template(Format::Embedded, "{{@model}}")
            .template(Format::Edit, "{{@model}}")
            .build(),
        CardSource::new(STRING)
            .template(Format::Embedded, "{{@model}}")
            .build(),
        CardSource::new(DATE)
            .deserializer(SerializerName::Date)
            .template(Format::Embedded, "{{@model}}")
            .build(),
    ]
}

pub fn person_card() -> RawCard {
    CardSource::new(PERSON)
        .schema(PERSON_SCHEMA)
        .template(Format::Embedded, "<@model.name/> was born on <@model.birthdate/>")
        .build()
}

pub struct TestEnv {
    pub builder: Arc<CardBuilder<MemoryRealm>>,
    pub modules: Arc<InMemoryModules>,
}

impl TestEnv {
    /// Builder over the base cards and the person card
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let mut cards = base_realm_cards();
        cards.push(person_card());

        let modules = Arc::new(InMemoryModules::new());
        let builder = CardBuilder::new(MemoryRealm::with_cards(cards), modules.clone());
        Self { builder, modules }
    }

    pub async fn add(&self, card: RawCard) {
        self.builder.realm().insert(card).await;
    }
}
