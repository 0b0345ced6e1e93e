//! Client builder for constructing A2A clients

use std::{sync::Arc, time::Duration};

use url::Url;

use crate::{
    client::{agent::AgentClient, config::ClientConfig},
    codec::{Codec, JsonRpcCodec},
    layer::auth::AuthCredentials,
    protocol::error::A2AError,
    transport::{HttpTransport, Transport},
};

/// Builder for constructing A2A clients
///
/// # Example
///
/// ```rust,no_run
/// use a2a_bridge::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = "https://agent.example.com".parse().unwrap();
/// let mut client = A2AClientBuilder::new_http(url)
///     .with_bearer_auth("token123")
///     .with_timeout(Duration::from_secs(30))
///     .build()?;
///
/// let agent_card = client.fetch_agent_card(false).await?;
/// println!("Connected to: {}", agent_card.name);
/// # Ok(())
/// # }
/// ```
pub struct A2AClientBuilder<T: Transport> {
    agent_url: Url,
    transport: Option<T>,
    codec: Option<Arc<dyn Codec>>,
    auth: Option<AuthCredentials>,
    timeout: Duration,
    max_retries: u32,
    card_ttl: Duration,
    pool_size: usize,
}

impl<T: Transport> A2AClientBuilder<T> {
    /// Create a builder; a transport must be supplied before `build`
    pub fn new(agent_url: Url) -> Self {
        Self {
            agent_url,
            transport: None,
            codec: None,
            auth: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            card_ttl: Duration::from_secs(300),
            pool_size: 8,
        }
    }

    /// Use a custom transport
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom codec
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Enable bearer token authentication
    pub fn with_bearer_auth(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::bearer(token));
        self
    }

    /// Enable API key authentication via a custom header
    pub fn with_api_key_auth(mut self, key: impl Into<String>, header: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::api_key(key, header));
        self
    }

    /// Enable OAuth2 access token authentication
    pub fn with_oauth2_auth(mut self, access_token: impl Into<String>) -> Self {
        self.auth = Some(AuthCredentials::oauth2(access_token));
        self
    }

    /// Enable basic HTTP authentication
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthCredentials::basic(username, password));
        self
    }

    /// Set custom authentication credentials
    pub fn with_auth(mut self, credentials: AuthCredentials) -> Self {
        self.auth = Some(credentials);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of attempts (default: 3)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the agent card cache TTL (default: 300s)
    pub fn with_card_ttl(mut self, card_ttl: Duration) -> Self {
        self.card_ttl = card_ttl;
        self
    }

    /// Bound the outbound connection pool (default: 8)
    pub fn with_connection_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Build the A2A client
    ///
    /// # Errors
    ///
    /// Returns an error if no transport has been configured.
    pub fn build(self) -> Result<AgentClient<T>, A2AError> {
        let transport = self.transport.ok_or_else(|| {
            A2AError::Validation(
                "transport not configured; call new_http() or with_transport()".into(),
            )
        })?;

        let codec = self
            .codec
            .unwrap_or_else(|| Arc::new(JsonRpcCodec::new()));

        let mut config = ClientConfig::new(self.agent_url)
            .with_timeout(self.timeout)
            .with_max_retries(self.max_retries)
            .with_card_ttl(self.card_ttl)
            .with_pool_size(self.pool_size);
        if let Some(auth) = self.auth {
            config = config.with_auth(auth);
        }

        Ok(AgentClient::new(transport, codec, config))
    }
}

impl A2AClientBuilder<HttpTransport> {
    /// Create a builder preconfigured with the HTTP transport
    pub fn new_http(agent_url: Url) -> Self {
        let builder = Self::new(agent_url.clone());
        let transport =
            HttpTransport::with_limits(agent_url, builder.timeout, builder.pool_size);
        builder.with_transport(transport)
    }
}

#[cfg(test)]
mod tests {
    use crate::transport::MockTransport;

    use super::*;

    fn agent_url() -> Url {
        "https://example.com".parse().unwrap()
    }

    #[test]
    fn test_builder_with_http() {
        let client = A2AClientBuilder::new_http(agent_url()).build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_requires_transport() {
        let result = A2AClientBuilder::<MockTransport>::new(agent_url()).build();
        assert!(matches!(result, Err(A2AError::Validation(_))));
    }

    #[test]
    fn test_builder_with_mock_transport() {
        let client = A2AClientBuilder::new(agent_url())
            .with_transport(MockTransport::ok())
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_all_options() {
        let client = A2AClientBuilder::new_http(agent_url())
            .with_bearer_auth("token")
            .with_timeout(Duration::from_secs(45))
            .with_max_retries(5)
            .with_card_ttl(Duration::from_secs(60))
            .with_connection_pool_size(4)
            .build()
            .unwrap();

        assert_eq!(client.config().max_retries, 5);
        assert_eq!(client.config().card_ttl, Duration::from_secs(60));
    }
}
