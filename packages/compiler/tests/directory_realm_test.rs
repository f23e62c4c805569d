//! Directory Realm Tests
//!
//! Cards laid out on disk, one directory per card, compiled through a
//! [`CardBuilder`] over a [`DirectoryRealm`].

mod common;

use anyhow::Result;
use cardstack_compiler::{Builder, CardBuilder, DirectoryRealm, InMemoryModules, RawCard, RealmConfig};
use common::{base_realm_cards, PERSON_SCHEMA};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const REALM: &str = "https://cardstack.com/base";

/// Write `card` as `{root}/{name}/card.json` plus its files
async fn write_card(root: &Path, name: &str, card: &RawCard) -> Result<()> {
    let dir = root.join(name);
    tokio::fs::create_dir_all(&dir).await?;

    let mut card_json = card.clone();
    card_json.url = String::new();
    card_json.files.clear();
    tokio::fs::write(dir.join("card.json"), serde_json::to_string_pretty(&card_json)?).await?;

    for (path, source) in &card.files {
        let target = dir.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(target, source).await?;
    }
    Ok(())
}

async fn create_realm() -> Result<TempDir> {
    let temp_dir = TempDir::new()?;
    for card in base_realm_cards() {
        let name = card.url.rsplit('/').next().unwrap_or_default().to_string();
        write_card(temp_dir.path(), &name, &card).await?;
    }

    let mut person = common::CardSource::new(&format!("{}/person", REALM))
        .schema(PERSON_SCHEMA)
        .file("embedded.hbs", "{{@model.name}}")
        .file("styles/person.css", ".person {}")
        .build();
    person.embedded = Some("./embedded.hbs".to_string());
    write_card(temp_dir.path(), "person", &person).await?;

    Ok(temp_dir)
}

#[tokio::test]
async fn test_scan_lists_cards() -> Result<()> {
    let temp_dir = create_realm().await?;
    let realm = DirectoryRealm::new(RealmConfig::new(REALM, temp_dir.path()))?;

    assert_eq!(
        realm.scan().await?,
        vec![
            "https://cardstack.com/base/base",
            "https://cardstack.com/base/date",
            "https://cardstack.com/base/person",
            "https://cardstack.com/base/string",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_prime_compiles_every_card() -> Result<()> {
    let temp_dir = create_realm().await?;
    let realm = DirectoryRealm::new(RealmConfig::new(REALM, temp_dir.path()))?;
    let modules = Arc::new(InMemoryModules::new());
    let builder = CardBuilder::new(realm.clone(), modules.clone());

    assert_eq!(realm.prime(builder.as_ref()).await?, 4);

    let person = builder.get_compiled_card("https://cardstack.com/base/person").await?;
    assert_eq!(person.field_names(), vec!["name", "birthdate"]);
    assert_eq!(person.embedded.used_fields, vec!["name"]);
    assert_eq!(person.embedded.inline_hbs.as_deref(), Some("{{@model.name}}"));
    assert!(person
        .embedded
        .module_name
        .starts_with("https://cardstack.com/base/person/embedded-"));
    assert!(person.embedded.module_name.ends_with(".hbs"));
    assert_eq!(person.assets.len(), 1);
    assert_eq!(person.assets[0].path, "styles/person.css");

    assert!(modules
        .source("https://cardstack.com/base/person/schema.js")
        .await
        .is_some_and(|code| code.contains("static cardFields")));
    Ok(())
}

#[tokio::test]
async fn test_invalid_card_json() -> Result<()> {
    let temp_dir = create_realm().await?;
    let broken = temp_dir.path().join("broken");
    tokio::fs::create_dir_all(&broken).await?;
    tokio::fs::write(broken.join("card.json"), "{ not json").await?;

    let realm = DirectoryRealm::new(RealmConfig::new(REALM, temp_dir.path()))?;
    let builder = CardBuilder::new(realm, Arc::new(InMemoryModules::new()));

    let err = builder
        .get_compiled_card("https://cardstack.com/base/broken")
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("invalid card.json for https://cardstack.com/base/broken:"));
    Ok(())
}
