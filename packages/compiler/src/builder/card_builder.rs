//! Memoizing builder over a raw card source
//!
//! # Cache
//!
//! Compiled cards are cached by URL. The cache lock is never held while a
//! card compiles, because compiling one card asks this same builder for its
//! parent and field cards. Two concurrent requests for an uncached URL may
//! both compile it; the later result wins.

use super::{Builder, BuilderError, DefineModule};
use crate::compiler::{CompileError, Compiler};
use crate::config::CompilerConfig;
use crate::models::{CompiledCard, RawCard};
use crate::realm::RawCardSource;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;

/// Builder that compiles cards from `S` on demand and memoizes the results
pub struct CardBuilder<S> {
    source: S,
    define: Arc<dyn DefineModule>,
    config: CompilerConfig,
    cache: RwLock<HashMap<String, Arc<CompiledCard>>>,
    /// Handle to ourselves, so compilers can call back into this builder
    this: Weak<CardBuilder<S>>,
}

impl<S: RawCardSource + 'static> CardBuilder<S> {
    /// Create a builder with the default compiler configuration
    pub fn new(source: S, define: Arc<dyn DefineModule>) -> Arc<Self> {
        Self::build(source, define, CompilerConfig::default())
    }

    /// Create a builder with a custom compiler configuration
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Config` if the configuration is invalid
    pub fn with_config(
        source: S,
        define: Arc<dyn DefineModule>,
        config: CompilerConfig,
    ) -> std::result::Result<Arc<Self>, CompileError> {
        config.validate().map_err(CompileError::Config)?;
        Ok(Self::build(source, define, config))
    }

    fn build(source: S, define: Arc<dyn DefineModule>, config: CompilerConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            source,
            define,
            config,
            cache: RwLock::new(HashMap::new()),
            this: this.clone(),
        })
    }

    /// The raw card source this builder reads from
    pub fn realm(&self) -> &S {
        &self.source
    }

    /// Compile the card at `url` even if it is cached, replacing the cache entry
    ///
    /// Parent and field cards still come from the cache.
    pub async fn build_card(&self, url: &str) -> Result<Arc<CompiledCard>> {
        let raw = self.source.get_raw_card(url).await?;
        let card = Arc::new(self.compiler()?.compile(&raw).await.map_err(into_anyhow)?);

        self.cache
            .write()
            .await
            .insert(url.to_string(), Arc::clone(&card));
        tracing::debug!("Cached compiled card {}", url);
        Ok(card)
    }

    /// Drop the cached compiled card for `url`
    ///
    /// Cards compiled against it keep their own copy until they are
    /// invalidated too. Returns whether an entry was removed.
    pub async fn invalidate(&self, url: &str) -> bool {
        self.cache.write().await.remove(url).is_some()
    }

    /// Drop every cached compiled card
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    pub async fn is_cached(&self, url: &str) -> bool {
        self.cache.read().await.contains_key(url)
    }

    fn compiler(&self) -> Result<Compiler> {
        let this = self.this.upgrade().ok_or(BuilderError::Unavailable)?;
        Ok(Compiler::with_config(
            this,
            Arc::clone(&self.define),
            self.config.clone(),
        )?)
    }
}

/// Unwrap collaborator failures so nested errors keep their original type
fn into_anyhow(err: CompileError) -> anyhow::Error {
    match err {
        CompileError::Collaborator(inner) => inner,
        other => other.into(),
    }
}

#[async_trait]
impl<S: RawCardSource + 'static> Builder for CardBuilder<S> {
    async fn get_raw_card(&self, url: &str) -> Result<RawCard> {
        self.source.get_raw_card(url).await
    }

    async fn get_compiled_card(&self, url: &str) -> Result<Arc<CompiledCard>> {
        if let Some(card) = self.cache.read().await.get(url) {
            return Ok(Arc::clone(card));
        }
        self.build_card(url).await
    }
}
