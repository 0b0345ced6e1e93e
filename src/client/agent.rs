//! High-level A2A agent client

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Map, Value};
use tower_service::Service;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    client::{
        cache::{AgentCardCache, CardValidators},
        config::ClientConfig,
        retry::RetryPolicy,
    },
    codec::{
        jsonrpc::InvocationResult,
        sse::{StreamAccumulator, StreamEvent},
        Codec,
    },
    protocol::{
        agent::AgentCard,
        error::{A2AError, A2AResult},
        operation::{A2AOperation, InvocationTask},
    },
    service::{A2AProtocolService, A2ARequest, A2AResponse, RequestContext},
    transport::Transport,
};

/// Options for a skill invocation
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Correlation id; generated when absent
    pub request_id: Option<String>,

    /// Stream the response over SSE
    pub stream: bool,

    /// Webhook URL forwarded in the task options
    pub webhook_url: Option<String>,
}

/// High-level A2A client for interacting with remote agents
///
/// Discovers capabilities via the agent card (cached with a TTL), invokes
/// named skills blocking or streaming, and probes health. All network-
/// touching operations run under the configured retry policy, which retries
/// transient failures only.
pub struct AgentClient<T: Transport> {
    service: A2AProtocolService<T>,
    transport: T,
    config: ClientConfig,
    cache: Arc<AgentCardCache>,
    retry: RetryPolicy,
    codec: Arc<dyn Codec>,
}

impl<T: Transport> AgentClient<T> {
    /// Create a new agent client
    pub fn new(transport: T, codec: Arc<dyn Codec>, config: ClientConfig) -> Self {
        let cache = Arc::new(AgentCardCache::new(config.card_ttl.as_secs()));
        let retry = RetryPolicy::new(config.max_retries);
        Self {
            service: A2AProtocolService::new(transport.clone(), codec.clone()),
            transport,
            config,
            cache,
            retry,
            codec,
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Override the retry backoff delays (mainly for tests)
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_context(&self) -> RequestContext {
        let mut context = RequestContext::new(self.config.agent_url.clone())
            .with_timeout(self.config.timeout);
        if let Some(auth) = &self.config.auth {
            context = context.with_auth(auth.clone());
        }
        context
    }

    /// Fetch the remote agent's card.
    ///
    /// A fresh cache entry is returned without any network call. On a miss
    /// (or with `force_refresh`) the discovery endpoint is fetched, sending
    /// any stored `ETag`/`Last-Modified` validators; a 304 revalidates the
    /// cached card in place.
    pub async fn fetch_agent_card(&mut self, force_refresh: bool) -> A2AResult<AgentCard> {
        let url = self.config.agent_url.clone();

        if !force_refresh {
            if let Some(card) = self.cache.get(&url).await {
                debug!(agent = %url, "agent card cache hit");
                return Ok(card);
            }
        }

        let validators = self.cache.validators(&url).await.unwrap_or_default();
        let operation = A2AOperation::FetchAgentCard {
            etag: validators.etag,
            last_modified: validators.last_modified,
        };

        let context = self.build_context();
        let service = self.service.clone();
        let response = self
            .retry
            .run(|| {
                let mut service = service.clone();
                let request = A2ARequest::new(operation.clone(), context.clone());
                async move { service.call(request).await }
            })
            .await?;

        match response {
            A2AResponse::NotModified => {
                let card = self.cache.get_even_expired(&url).await.ok_or_else(|| {
                    A2AError::Protocol("server returned 304 but no card is cached".into())
                })?;
                self.cache.touch(&url).await;
                debug!(agent = %url, "agent card revalidated");
                Ok(card)
            }
            A2AResponse::AgentCard {
                card,
                etag,
                last_modified,
            } => {
                info!(
                    agent = %url,
                    name = %card.name,
                    capabilities = card.capabilities.len(),
                    "discovered agent"
                );
                self.cache
                    .insert(
                        &url,
                        (*card).clone(),
                        CardValidators {
                            etag,
                            last_modified,
                        },
                    )
                    .await;
                Ok(*card)
            }
            _ => Err(A2AError::Protocol(
                "expected agent card response from discovery".into(),
            )),
        }
    }

    /// Invoke a skill and wait for its result
    pub async fn invoke_skill(
        &mut self,
        skill: &str,
        parameters: Map<String, Value>,
    ) -> A2AResult<InvocationResult> {
        self.invoke_skill_with(skill, parameters, InvokeOptions::default())
            .await
    }

    /// Invoke a skill with streaming enabled, returning the merged result
    pub async fn invoke_skill_streaming(
        &mut self,
        skill: &str,
        parameters: Map<String, Value>,
    ) -> A2AResult<InvocationResult> {
        self.invoke_skill_with(
            skill,
            parameters,
            InvokeOptions {
                stream: true,
                ..Default::default()
            },
        )
        .await
    }

    /// Invoke a skill with explicit options.
    ///
    /// The skill name is checked against the fetched agent card before any
    /// call to the invocation endpoint; an unknown skill fails locally with
    /// the list of available names.
    pub async fn invoke_skill_with(
        &mut self,
        skill: &str,
        parameters: Map<String, Value>,
        options: InvokeOptions,
    ) -> A2AResult<InvocationResult> {
        let card = self.fetch_agent_card(false).await?;
        if card.find_capability(skill).is_none() {
            return Err(A2AError::SkillNotFound {
                skill: skill.to_string(),
                available: card.capability_names(),
            });
        }

        let request_id = options
            .request_id
            .unwrap_or_else(|| Uuid::now_v7().to_string());
        let mut task = InvocationTask::new(request_id, skill).with_parameters(parameters);
        task.webhook_url = options.webhook_url;

        if options.stream {
            self.invoke_streaming(task).await
        } else {
            self.invoke_blocking(task).await
        }
    }

    async fn invoke_blocking(&mut self, task: InvocationTask) -> A2AResult<InvocationResult> {
        let context = self.build_context().with_request_id(task.id.clone());
        let operation = A2AOperation::InvokeSkill {
            task,
            stream: false,
        };
        let service = self.service.clone();

        let response = self
            .retry
            .run(|| {
                let mut service = service.clone();
                let request = A2ARequest::new(operation.clone(), context.clone());
                async move { service.call(request).await }
            })
            .await?;

        response.into_invocation().ok_or_else(|| {
            A2AError::Protocol("expected invocation result from invoke".into())
        })
    }

    /// Drive a streaming invocation: events are processed strictly in
    /// arrival order and merged into one result once the stream terminates.
    async fn invoke_streaming(&mut self, task: InvocationTask) -> A2AResult<InvocationResult> {
        let context = self.build_context().with_request_id(task.id.clone());
        let operation = A2AOperation::InvokeSkill { task, stream: true };
        let transport = self.transport.clone();
        let codec = self.codec.clone();

        self.retry
            .run(|| {
                let transport = transport.clone();
                let codec = codec.clone();
                let request = A2ARequest::new(operation.clone(), context.clone());
                async move {
                    let transport_req = A2AProtocolService::<T>::build_transport_request(
                        &request,
                        codec.as_ref(),
                    )?;

                    let mut frames = transport.execute_streaming(transport_req).await?;
                    let mut accumulator = StreamAccumulator::new();

                    // Consume to the end: the server closes after its
                    // terminal event, and an error event must win even when
                    // complete-looking data preceded it.
                    while let Some(frame) = frames.next().await {
                        let frame = frame?;
                        let Some(event) = StreamEvent::from_frame(&frame)? else {
                            debug!(event = %frame.event, "skipping unknown stream event");
                            continue;
                        };
                        accumulator.observe(&event);
                    }

                    accumulator.finish()
                }
            })
            .await
    }

    /// Probe the remote agent's health endpoint.
    ///
    /// Returns the parsed report (whatever its HTTP status), or `None` on
    /// any failure. Never returns an error.
    pub async fn health_check(&mut self) -> Option<Value> {
        let context = self.build_context();
        let service = self.service.clone();

        let response = self
            .retry
            .run(|| {
                let mut service = service.clone();
                let request = A2ARequest::new(A2AOperation::HealthCheck, context.clone());
                async move { service.call(request).await }
            })
            .await;

        match response {
            Ok(response) => response.into_health(),
            Err(error) => {
                debug!(error = %error, "health check failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde_json::json;

    use crate::{
        codec::JsonRpcCodec,
        protocol::agent::{AgentCard, Capability, ParameterSpec},
        transport::{MockTransport, TransportResponse},
    };

    use super::*;

    fn card_body() -> Vec<u8> {
        let card = AgentCard::new(
            "Test Agent",
            "A test agent",
            "https://agent.example.com".parse().unwrap(),
            vec![Capability::new("text_analysis", "Analyze text")
                .with_parameter("text", ParameterSpec::required("string", "Text"))],
        );
        serde_json::to_vec(&card).unwrap()
    }

    fn card_response() -> TransportResponse {
        TransportResponse::new(200)
            .header("content-type", "application/json")
            .body(Bytes::from(card_body()))
    }

    fn client(transport: MockTransport) -> AgentClient<MockTransport> {
        AgentClient::new(
            transport,
            Arc::new(JsonRpcCodec::new()),
            ClientConfig::new("mock://agent"),
        )
        .with_retry_policy(RetryPolicy::new(3).with_delays(
            std::time::Duration::from_millis(1),
            std::time::Duration::from_millis(2),
        ))
    }

    #[tokio::test]
    async fn test_discover_and_invoke() {
        let transport = MockTransport::new(|req| {
            let response = match req.endpoint.as_str() {
                "/.well-known/agent.json" => card_response(),
                "/invoke" => TransportResponse::new(200).body(Bytes::from(
                    r#"{"jsonrpc":"2.0","result":{"status":"completed","result":{"sentiment":"positive"}},"id":"1"}"#,
                )),
                _ => TransportResponse::new(404),
            };
            Ok(response)
        });

        let mut client = client(transport);
        let card = client.fetch_agent_card(false).await.unwrap();
        assert_eq!(card.name, "Test Agent");

        let mut params = Map::new();
        params.insert("text".into(), json!("I love this!"));
        let result = client.invoke_skill("text_analysis", params).await.unwrap();
        assert_eq!(result.result["sentiment"], "positive");
    }

    #[tokio::test]
    async fn test_unknown_skill_fails_without_invoke_call() {
        let transport = MockTransport::new(|req| {
            assert_ne!(req.endpoint, "/invoke", "must not reach /invoke");
            Ok(card_response())
        });

        let mut client = client(transport.clone());
        let result = client.invoke_skill("nonexistent", Map::new()).await;

        match result {
            Err(A2AError::SkillNotFound { skill, available }) => {
                assert_eq!(skill, "nonexistent");
                assert_eq!(available, vec!["text_analysis"]);
            }
            other => panic!("expected skill not found, got {:?}", other),
        }
        assert_eq!(transport.requests_to("/invoke"), 0);
    }

    #[tokio::test]
    async fn test_health_check_never_errors() {
        let transport =
            MockTransport::new(|_| Err(A2AError::Network("connection refused".into())));
        let mut client = client(transport);
        assert!(client.health_check().await.is_none());

        let transport = MockTransport::new(|_| {
            Ok(TransportResponse::new(503)
                .body(Bytes::from(r#"{"status":"unhealthy","checks":[]}"#)))
        });
        let mut client = client(transport);
        let report = client.health_check().await.unwrap();
        assert_eq!(report["status"], "unhealthy");
    }
}
