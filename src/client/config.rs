//! Client configuration

use std::time::Duration;

use crate::layer::auth::AuthCredentials;

/// Configuration for an A2A client
///
/// Immutable once the client is built; constructed explicitly rather than
/// read from ambient process state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the agent
    pub agent_url: String,

    /// Default request timeout
    pub timeout: Duration,

    /// Maximum number of attempts for network-touching operations
    pub max_retries: u32,

    /// TTL of the agent card cache
    pub card_ttl: Duration,

    /// Bound on idle pooled connections per host
    pub pool_size: usize,

    /// Authentication credentials applied to every request
    pub auth: Option<AuthCredentials>,
}

impl ClientConfig {
    /// Create a new client configuration with defaults
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            card_ttl: Duration::from_secs(300),
            pool_size: 8,
            auth: None,
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the agent card cache TTL
    pub fn with_card_ttl(mut self, card_ttl: Duration) -> Self {
        self.card_ttl = card_ttl;
        self
    }

    /// Set the connection pool bound
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Set the authentication credentials
    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = Some(auth);
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}
