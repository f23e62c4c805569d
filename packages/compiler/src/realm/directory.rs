//! Directory-backed realm
//!
//! Layout on disk:
//!
//! ```text
//! {directory}/
//!   person/
//!     card.json
//!     schema.js
//!     embedded.js
//!   post/
//!     card.json
//!     ...
//! ```
//!
//! Each child directory holding a `card.json` is one card. Its URL is the
//! realm URL joined with the directory name, and every other file under the
//! directory (recursively) becomes an entry of the card's `files`.

use super::RawCardSource;
use crate::builder::{Builder, BuilderError};
use crate::models::RawCard;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CARD_JSON: &str = "card.json";

/// Where a directory realm lives and which URL it serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmConfig {
    /// Realm URL; card URLs are `{url}/{directory name}`
    pub url: String,

    pub directory: PathBuf,
}

impl RealmConfig {
    pub fn new(url: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            directory: directory.into(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if url::Url::parse(&self.url).is_err() {
            return Err(format!("realm url must be an absolute URL, got '{}'", self.url));
        }

        if self.directory.as_os_str().is_empty() {
            return Err("realm directory cannot be empty".to_string());
        }

        Ok(())
    }

    fn card_url(&self, name: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), name)
    }
}

/// Realm reading one card per directory
#[derive(Debug, Clone)]
pub struct DirectoryRealm {
    config: RealmConfig,
}

impl DirectoryRealm {
    /// # Errors
    ///
    /// Fails if the configuration is invalid
    pub fn new(config: RealmConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow!("Invalid realm configuration: {}", e))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RealmConfig {
        &self.config
    }

    /// URLs of every card in the realm, sorted
    pub async fn scan(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.config.directory)
            .await
            .with_context(|| format!("Failed to read realm directory {}", self.config.directory.display()))?;

        let mut urls = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            if !tokio::fs::try_exists(entry.path().join(CARD_JSON)).await? {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                urls.push(self.config.card_url(name));
            }
        }
        urls.sort();

        tracing::info!("Scanned realm {}: {} cards", self.config.url, urls.len());
        Ok(urls)
    }

    /// Compile every card in the realm through `builder`
    ///
    /// Stops at the first card that fails to compile. Returns the number of
    /// cards compiled.
    pub async fn prime<B: Builder + ?Sized>(&self, builder: &B) -> Result<usize> {
        let urls = self.scan().await?;
        for url in &urls {
            builder
                .get_compiled_card(url)
                .await
                .with_context(|| format!("Failed to compile {}", url))?;
        }
        tracing::info!("Primed realm {}: {} cards compiled", self.config.url, urls.len());
        Ok(urls.len())
    }

    /// Directory holding the card at `url`, if the URL belongs to this realm
    fn card_directory(&self, url: &str) -> Option<PathBuf> {
        let prefix = format!("{}/", self.config.url.trim_end_matches('/'));
        let name = url.strip_prefix(&prefix)?.trim_end_matches('/');
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return None;
        }
        Some(self.config.directory.join(name))
    }
}

/// Every file under `root` except the top-level card.json, keyed by `/`-separated relative path
async fn read_card_files(root: &Path) -> Result<IndexMap<String, String>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
                continue;
            }

            let relative = path
                .strip_prefix(root)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if relative == CARD_JSON {
                continue;
            }

            let source = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            files.push((relative, source));
        }
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files.into_iter().collect())
}

#[async_trait]
impl RawCardSource for DirectoryRealm {
    async fn get_raw_card(&self, url: &str) -> Result<RawCard> {
        let dir = self
            .card_directory(url)
            .ok_or_else(|| BuilderError::not_found(url))?;

        let card_json = match tokio::fs::read_to_string(dir.join(CARD_JSON)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(BuilderError::not_found(url).into()),
            Err(e) => {
                return Err(anyhow::Error::new(e).context(format!("Failed to read card.json of {}", url)));
            }
        };

        let files = read_card_files(&dir).await?;
        tracing::debug!("Loaded raw card {} ({} files)", url, files.len());
        Ok(RawCard::from_card_json(url, &card_json, files)?)
    }
}
