//! Raw Card Sources
//!
//! A realm is where raw cards live. [`CardBuilder`](crate::CardBuilder) reads
//! raw cards through the [`RawCardSource`] trait:
//!
//! - [`MemoryRealm`] - cards held in memory, for tests and embedding
//! - [`DirectoryRealm`] - one directory per card on disk

mod directory;
mod memory;

pub use directory::{DirectoryRealm, RealmConfig};
pub use memory::MemoryRealm;

use crate::models::RawCard;
use anyhow::Result;
use async_trait::async_trait;

/// Source of raw cards by URL
#[async_trait]
pub trait RawCardSource: Send + Sync {
    /// Raw card stored at `url`
    ///
    /// # Errors
    ///
    /// Fails with [`BuilderError::NotFound`](crate::builder::BuilderError::NotFound)
    /// when the realm has no card at `url`.
    async fn get_raw_card(&self, url: &str) -> Result<RawCard>;
}
