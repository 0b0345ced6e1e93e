//! TTL cache for discovered agent cards

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::protocol::agent::AgentCard;

/// Conditional-request validators remembered alongside a cached card
#[derive(Debug, Clone, Default)]
pub struct CardValidators {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Internal cache entry wrapping a card with TTL metadata
#[derive(Debug, Clone)]
struct CachedCard {
    card: AgentCard,
    validators: CardValidators,
    expires_at: DateTime<Utc>,
}

/// In-memory TTL cache for agent cards, keyed by base URL
///
/// Writes replace the whole entry under the write lock, so concurrent
/// readers never observe a partially updated card.
#[derive(Debug)]
pub struct AgentCardCache {
    entries: RwLock<HashMap<String, CachedCard>>,
    ttl_seconds: i64,
}

impl AgentCardCache {
    /// Create a new cache with the given TTL in seconds
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_seconds: ttl_seconds as i64,
        }
    }

    /// Get a cached card if it exists and is not expired
    pub async fn get(&self, url: &str) -> Option<AgentCard> {
        let entries = self.entries.read().await;
        entries.get(url).and_then(|cached| {
            if Utc::now() < cached.expires_at {
                Some(cached.card.clone())
            } else {
                None
            }
        })
    }

    /// Get a cached card even if expired, for 304 revalidation
    pub async fn get_even_expired(&self, url: &str) -> Option<AgentCard> {
        let entries = self.entries.read().await;
        entries.get(url).map(|cached| cached.card.clone())
    }

    /// Conditional-request validators for a cached entry, expired or not
    pub async fn validators(&self, url: &str) -> Option<CardValidators> {
        let entries = self.entries.read().await;
        entries.get(url).map(|cached| cached.validators.clone())
    }

    /// Store a card, replacing any previous entry atomically
    pub async fn insert(&self, url: impl Into<String>, card: AgentCard, validators: CardValidators) {
        let cached = CachedCard {
            card,
            validators,
            expires_at: Utc::now() + Duration::seconds(self.ttl_seconds),
        };
        let mut entries = self.entries.write().await;
        entries.insert(url.into(), cached);
    }

    /// Refresh the expiry of an entry after a successful 304 revalidation
    pub async fn touch(&self, url: &str) {
        let mut entries = self.entries.write().await;
        if let Some(cached) = entries.get_mut(url) {
            cached.expires_at = Utc::now() + Duration::seconds(self.ttl_seconds);
        }
    }

    /// Drop an entry
    pub async fn invalidate(&self, url: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(url);
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::agent::Capability;

    use super::*;

    fn card() -> AgentCard {
        AgentCard::new(
            "Agent",
            "desc",
            "https://a.example.com".parse().unwrap(),
            vec![Capability::new("noop", "does nothing")],
        )
    }

    #[tokio::test]
    async fn test_fresh_entry_is_returned() {
        let cache = AgentCardCache::new(300);
        cache
            .insert("https://a.example.com", card(), CardValidators::default())
            .await;

        assert!(cache.get("https://a.example.com").await.is_some());
        assert!(cache.get("https://other.example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_but_keeps_validators() {
        let cache = AgentCardCache::new(0);
        cache
            .insert(
                "https://a.example.com",
                card(),
                CardValidators {
                    etag: Some("\"v1\"".into()),
                    last_modified: None,
                },
            )
            .await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        assert!(cache.get("https://a.example.com").await.is_none());
        assert!(cache.get_even_expired("https://a.example.com").await.is_some());
        assert_eq!(
            cache
                .validators("https://a.example.com")
                .await
                .unwrap()
                .etag
                .as_deref(),
            Some("\"v1\"")
        );
    }

    #[tokio::test]
    async fn test_touch_revives_expired_entry() {
        let cache = AgentCardCache::new(300);
        cache
            .insert("https://a.example.com", card(), CardValidators::default())
            .await;

        // Force expiry, then revalidate
        {
            let mut entries = cache.entries.write().await;
            entries.get_mut("https://a.example.com").unwrap().expires_at =
                Utc::now() - Duration::seconds(1);
        }
        assert!(cache.get("https://a.example.com").await.is_none());

        cache.touch("https://a.example.com").await;
        assert!(cache.get("https://a.example.com").await.is_some());
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = AgentCardCache::new(300);
        cache
            .insert("https://a.example.com", card(), CardValidators::default())
            .await;
        cache.invalidate("https://a.example.com").await;
        assert!(cache.get_even_expired("https://a.example.com").await.is_none());
    }
}
