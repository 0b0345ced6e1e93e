//! HTTP transport implementation for A2A protocol

use std::{
    task::{Context, Poll},
    time::Duration,
};

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use url::Url;

use crate::{codec::sse::SseFrame, protocol::error::A2AError};

use super::{FrameStream, Transport, TransportRequest, TransportResponse};

/// HTTP transport implementation using reqwest
///
/// Implements the HTTP+JSON binding of the A2A protocol. The underlying
/// reqwest client enforces the per-request timeout and bounds the outbound
/// connection pool; connections are returned to the pool when the response
/// is dropped, success or failure.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport with default timeout and pool bounds
    pub fn new(base_url: Url) -> Self {
        Self::with_limits(base_url, Duration::from_secs(30), 8)
    }

    /// Create a transport with an explicit timeout and connection pool size
    pub fn with_limits(base_url: Url, timeout: Duration, pool_size: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(pool_size)
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    /// Create a new HTTP transport with a custom reqwest client
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    fn build_request(
        &self,
        request: &TransportRequest,
    ) -> Result<reqwest::RequestBuilder, A2AError> {
        let url = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.endpoint
        );

        let mut builder = match request.method.as_str() {
            "POST" => self.client.post(&url),
            "GET" => self.client.get(&url),
            "PUT" => self.client.put(&url),
            "DELETE" => self.client.delete(&url),
            other => {
                return Err(A2AError::Network(format!(
                    "Unsupported HTTP method: {}",
                    other
                )))
            }
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        Ok(builder)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), A2AError>> {
        // HTTP client is always ready
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, A2AError> {
        let response = self.build_request(&request)?.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    /// Execute a streaming request (Server-Sent Events).
    ///
    /// Frames are yielded strictly in arrival order; the stream ends when
    /// the server closes the connection.
    async fn execute_streaming(&self, request: TransportRequest) -> Result<FrameStream, A2AError> {
        let mut builder = self.build_request(&request)?;
        if request.get_header("accept").is_none() {
            builder = builder.header("Accept", "text/event-stream");
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(A2AError::Network(format!(
                "streaming request failed with status {}: {}",
                status, body
            )));
        }

        let frames = response.bytes_stream().eventsource().map(|result| {
            result
                .map(|event| SseFrame {
                    event: event.event,
                    data: event.data,
                    id: if event.id.is_empty() {
                        None
                    } else {
                        Some(event.id)
                    },
                })
                .map_err(|e| A2AError::Network(format!("SSE stream error: {}", e)))
        });

        Ok(frames.boxed())
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_creation() {
        let transport = HttpTransport::new(Url::parse("https://example.com").unwrap());
        assert_eq!(transport.base_url().as_str(), "https://example.com/");
        assert!(transport.supports_streaming());
    }

    #[test]
    fn test_unsupported_method_rejected() {
        let transport = HttpTransport::new(Url::parse("https://example.com").unwrap());
        let request = TransportRequest::new("/invoke", "PATCH");
        assert!(matches!(
            transport.build_request(&request),
            Err(A2AError::Network(_))
        ));
    }
}
