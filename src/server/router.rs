//! Router assembly for the A2A server endpoints

use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{config::ServerConfig, discovery, health, invoke, registry::SkillRegistry};

/// Stable identity fields of the derived agent card
///
/// Generated once per process so the discovery document (and therefore its
/// ETag) stays byte-identical while the registry is unchanged.
#[derive(Debug, Clone)]
pub struct CardIdentity {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl CardIdentity {
    fn new() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Shared state for all server handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SkillRegistry>,
    pub config: Arc<ServerConfig>,
    pub identity: CardIdentity,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(registry: Arc<SkillRegistry>, config: ServerConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            identity: CardIdentity::new(),
            started_at: Instant::now(),
        }
    }

    /// Derive the discovery document from the live registry, pinned to this
    /// process's card identity.
    pub fn agent_card(&self) -> crate::protocol::agent::AgentCard {
        let mut card = self.registry.agent_card(&self.config);
        card.id = self.identity.id.clone();
        card.created_at = self.identity.created_at;
        card.updated_at = self.identity.created_at;
        card
    }
}

/// Build the router exposing the three A2A endpoints.
///
/// Requests with an unsupported method on a known route get a 405 with the
/// appropriate `Allow` header from the method router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/.well-known/agent.json",
            get(discovery::agent_card_handler),
        )
        .route("/invoke", post(invoke::invoke_handler))
        .route("/health", get(health::health_handler))
        .with_state(state)
}
