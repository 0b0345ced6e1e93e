//! Core A2A protocol service implementation

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tower_service::Service;

use crate::{
    codec::Codec,
    protocol::{error::A2AError, operation::A2AOperation},
    service::{A2ARequest, A2AResponse},
    transport::{Transport, TransportRequest, TransportResponse},
};

/// Core A2A protocol service that wraps a transport
///
/// Implements the Tower `Service` trait, turning A2A operations into
/// transport requests and transport responses back into typed protocol
/// responses. HTTP status codes are classified into the error taxonomy here,
/// so every layer above deals only in typed errors.
pub struct A2AProtocolService<T> {
    transport: T,
    codec: Arc<dyn Codec>,
}

impl<T> A2AProtocolService<T>
where
    T: Transport,
{
    /// Create a new A2A protocol service
    pub fn new(transport: T, codec: Arc<dyn Codec>) -> Self {
        Self { transport, codec }
    }

    /// Build a transport request from an A2A operation.
    ///
    /// Shared with the client's streaming path, which bypasses the service
    /// to reach the transport's SSE interface.
    pub(crate) fn build_transport_request(
        req: &A2ARequest,
        codec: &dyn Codec,
    ) -> Result<TransportRequest, A2AError> {
        let endpoint = req.operation.endpoint();
        let method = req.operation.method();

        let mut transport_req = TransportRequest::new(endpoint, method);

        let accept = if req.operation.is_streaming() {
            "text/event-stream"
        } else {
            "application/json"
        };
        transport_req = transport_req
            .header("Accept", accept)
            .header("X-Request-ID", req.context.request_id.clone())
            .header("User-Agent", req.context.user_agent.clone());

        if method != "GET" {
            transport_req = transport_req.header("Content-Type", codec.content_type());
        }

        // Conditional revalidation headers for discovery
        if let A2AOperation::FetchAgentCard {
            etag,
            last_modified,
        } = &req.operation
        {
            if let Some(etag) = etag {
                transport_req = transport_req.header("If-None-Match", etag.clone());
            }
            if let Some(last_modified) = last_modified {
                transport_req = transport_req.header("If-Modified-Since", last_modified.clone());
            }
        }

        if let Some(auth) = &req.context.auth {
            let (header, value) = auth.to_header();
            transport_req = transport_req.header(header, value);
        }

        for (key, value) in &req.context.metadata {
            transport_req = transport_req.header(key.clone(), value.clone());
        }

        let body = codec.encode_request(&req.operation)?;
        if !body.is_empty() && method != "GET" {
            transport_req = transport_req.body(body);
        }

        Ok(transport_req)
    }

    /// Parse a transport response into an A2A response
    fn parse_transport_response(
        transport_resp: TransportResponse,
        codec: &dyn Codec,
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        // 304 on discovery short-circuits to the cached card
        if transport_resp.status == 304
            && matches!(operation, A2AOperation::FetchAgentCard { .. })
        {
            return Ok(A2AResponse::NotModified);
        }

        // A degraded server still reports useful health detail on a 503
        if matches!(operation, A2AOperation::HealthCheck) && !transport_resp.body.is_empty() {
            return codec.decode_response(&transport_resp, operation);
        }

        if !transport_resp.is_success() {
            return Err(Self::handle_error_response(&transport_resp, operation));
        }

        codec.decode_response(&transport_resp, operation)
    }

    /// Classify error statuses into the typed taxonomy.
    ///
    /// 4xx are permanent (never retried); 5xx are server faults treated as
    /// transient network failures.
    fn handle_error_response(
        transport_resp: &TransportResponse,
        operation: &A2AOperation,
    ) -> A2AError {
        let status = transport_resp.status;
        let message = serde_json::from_slice::<serde_json::Value>(&transport_resp.body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .or_else(|| json.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            401 | 403 => A2AError::Auth(message),
            404 if matches!(operation, A2AOperation::FetchAgentCard { .. }) => {
                A2AError::AgentCard(format!("discovery document not found: {}", message))
            }
            408 => A2AError::Timeout,
            400..=499 => A2AError::Invocation {
                code: -32600,
                message,
                status: Some(status),
            },
            _ => A2AError::Network(format!("HTTP {}: {}", status, message)),
        }
    }
}

impl<T> Service<A2ARequest> for A2AProtocolService<T>
where
    T: Transport + Clone,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.transport.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        let transport = self.transport.clone();
        let codec = self.codec.clone();

        Box::pin(async move {
            let transport_req = Self::build_transport_request(&req, codec.as_ref())?;

            let transport_resp = transport.execute(transport_req).await?;

            Self::parse_transport_response(transport_resp, codec.as_ref(), &req.operation)
        })
    }
}

impl<T> Clone for A2AProtocolService<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            codec: self.codec.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use crate::{
        codec::JsonRpcCodec,
        protocol::operation::InvocationTask,
        service::RequestContext,
        transport::{MockTransport, TransportResponse},
    };

    use super::*;

    fn invoke_request() -> A2ARequest {
        A2ARequest::new(
            A2AOperation::InvokeSkill {
                task: InvocationTask::new("req-1", "echo"),
                stream: false,
            },
            RequestContext::new("mock://agent"),
        )
    }

    #[tokio::test]
    async fn test_service_invoke_success() {
        let transport = MockTransport::new(|_req| {
            let body = r#"{"jsonrpc":"2.0","result":{"status":"completed","result":{"echo":"hi"}},"id":"req-1"}"#;
            Ok(TransportResponse::new(200).body(Bytes::from(body)))
        });

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let response = service.call(invoke_request()).await.unwrap();
        let result = response.into_invocation().unwrap();
        assert_eq!(result.result["echo"], "hi");
    }

    #[tokio::test]
    async fn test_service_maps_auth_status() {
        let transport = MockTransport::new(|_req| {
            Ok(TransportResponse::new(401).body(Bytes::from(r#"{"message":"Unauthorized"}"#)))
        });

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let result = service.call(invoke_request()).await;
        assert!(matches!(result, Err(A2AError::Auth(_))));
    }

    #[tokio::test]
    async fn test_service_maps_server_fault_to_network() {
        let transport = MockTransport::new(|_req| Ok(TransportResponse::new(502)));

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let result = service.call(invoke_request()).await;
        assert!(matches!(result, Err(A2AError::Network(_))));
    }

    #[tokio::test]
    async fn test_service_maps_client_error_to_invocation() {
        let transport = MockTransport::new(|_req| {
            Ok(TransportResponse::new(422).body(Bytes::from(r#"{"error":"bad params"}"#)))
        });

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let result = service.call(invoke_request()).await;
        match result {
            Err(A2AError::Invocation { status, .. }) => assert_eq!(status, Some(422)),
            other => panic!("expected invocation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_service_304_becomes_not_modified() {
        let transport = MockTransport::new(|_req| Ok(TransportResponse::new(304)));

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let request = A2ARequest::new(
            A2AOperation::FetchAgentCard {
                etag: Some("\"abc\"".into()),
                last_modified: None,
            },
            RequestContext::new("mock://agent"),
        );

        let response = service.call(request).await.unwrap();
        assert!(matches!(response, A2AResponse::NotModified));
    }

    #[tokio::test]
    async fn test_request_carries_identity_headers() {
        let transport = MockTransport::new(|req| {
            assert!(req.get_header("x-request-id").is_some());
            assert!(req.get_header("user-agent").is_some());
            Ok(TransportResponse::new(200).body(Bytes::from("{\"status\":\"ok\"}")))
        });

        let codec = Arc::new(JsonRpcCodec::new());
        let mut service = A2AProtocolService::new(transport, codec);

        let request = A2ARequest::new(A2AOperation::HealthCheck, RequestContext::new("mock://"));
        service.call(request).await.unwrap();
    }
}
