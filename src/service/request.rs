//! A2A service request types

use std::{collections::HashMap, time::Duration};

use uuid::Uuid;

use crate::{layer::auth::AuthCredentials, protocol::operation::A2AOperation};

/// A request to the A2A service
///
/// Wraps an operation with the per-request context needed to execute it.
#[derive(Debug, Clone)]
pub struct A2ARequest {
    /// The A2A operation to execute
    pub operation: A2AOperation,

    /// Request context (auth, timeouts, identity headers)
    pub context: RequestContext,
}

impl A2ARequest {
    /// Create a new A2A request
    pub fn new(operation: A2AOperation, context: RequestContext) -> Self {
        Self { operation, context }
    }
}

/// Request context containing metadata and configuration
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Base URL of the target agent
    pub agent_url: String,

    /// Authentication credentials (if any)
    pub auth: Option<AuthCredentials>,

    /// Request timeout
    pub timeout: Option<Duration>,

    /// Correlation id carried as `X-Request-ID`
    pub request_id: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Additional metadata headers
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Create a new request context with a generated request id
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            auth: None,
            timeout: Some(Duration::from_secs(30)),
            request_id: Uuid::now_v7().to_string(),
            user_agent: concat!("a2a-bridge/", env!("CARGO_PKG_VERSION")).to_string(),
            metadata: HashMap::new(),
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the correlation id
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Add a metadata header
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_creation() {
        let context = RequestContext::new("https://example.com")
            .with_timeout(Duration::from_secs(60))
            .with_metadata("key", "value");

        assert_eq!(context.agent_url, "https://example.com");
        assert_eq!(context.timeout, Some(Duration::from_secs(60)));
        assert_eq!(context.metadata.get("key"), Some(&"value".to_string()));
        assert!(!context.request_id.is_empty());
        assert!(context.user_agent.starts_with("a2a-bridge/"));
    }

    #[test]
    fn test_request_id_override() {
        let context = RequestContext::new("https://example.com").with_request_id("req-7");
        assert_eq!(context.request_id, "req-7");
    }
}
