//! Builder Collaborators
//!
//! The compiler never fetches or caches cards itself. It talks to two
//! collaborators:
//!
//! - [`Builder`] - hands out raw cards and compiled cards by URL
//! - [`DefineModule`] - registers generated code and returns a module handle
//!
//! [`CardBuilder`] is a memoizing builder over any [`RawCardSource`], and
//! [`InMemoryModules`] records defined modules in memory.
//!
//! # Examples
//!
//! ```rust,no_run
//! use cardstack_compiler::{Builder, CardBuilder, InMemoryModules, MemoryRealm};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let modules = Arc::new(InMemoryModules::new());
//! let builder = CardBuilder::new(MemoryRealm::new(), modules.clone());
//! let card = builder.get_compiled_card("https://demo.com/person").await?;
//! println!("{} has {} fields", card.url, card.fields.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`RawCardSource`]: crate::realm::RawCardSource

mod card_builder;
mod modules;

pub use card_builder::CardBuilder;
pub use modules::InMemoryModules;

use crate::models::{CompiledCard, RawCard};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Source of raw and compiled cards
///
/// Implementations must be `Send + Sync`; the compiler awaits them from
/// inside its own futures.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Raw card stored at `url`
    ///
    /// # Errors
    ///
    /// Fails with [`BuilderError::NotFound`] when no card exists at `url`.
    async fn get_raw_card(&self, url: &str) -> Result<RawCard>;

    /// Compiled form of the card at `url`, compiling it if needed
    async fn get_compiled_card(&self, url: &str) -> Result<Arc<CompiledCard>>;
}

/// Sink for generated code
#[async_trait]
pub trait DefineModule: Send + Sync {
    /// Register `source` as `local_module` of the card at `card_url`
    ///
    /// Returns the handle the environment loads the module by.
    async fn define(&self, card_url: &str, local_module: &str, source: String) -> Result<String>;
}

/// Builder errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    /// No card exists at the URL
    #[error("card not found: {url}")]
    NotFound { url: String },

    /// The builder was dropped while a compile still needed it
    #[error("card builder is no longer available")]
    Unavailable,
}

impl BuilderError {
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }
}
