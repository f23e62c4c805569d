//! In-memory realm

use super::RawCardSource;
use crate::builder::BuilderError;
use crate::models::RawCard;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Raw cards held in memory, keyed by URL
#[derive(Debug, Default)]
pub struct MemoryRealm {
    cards: RwLock<HashMap<String, RawCard>>,
}

impl MemoryRealm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a realm holding `cards`
    pub fn with_cards(cards: impl IntoIterator<Item = RawCard>) -> Self {
        Self {
            cards: RwLock::new(cards.into_iter().map(|card| (card.url.clone(), card)).collect()),
        }
    }

    /// Store a card under its URL, returning the card it replaced
    pub async fn insert(&self, card: RawCard) -> Option<RawCard> {
        self.cards.write().await.insert(card.url.clone(), card)
    }

    pub async fn remove(&self, url: &str) -> Option<RawCard> {
        self.cards.write().await.remove(url)
    }

    /// URLs of every stored card, sorted
    pub async fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.cards.read().await.keys().cloned().collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl RawCardSource for MemoryRealm {
    async fn get_raw_card(&self, url: &str) -> Result<RawCard> {
        self.cards
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| BuilderError::not_found(url).into())
    }
}
