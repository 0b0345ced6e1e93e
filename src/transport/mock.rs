//! In-memory transport double for tests
//!
//! Records every request it serves so tests can assert on call counts per
//! endpoint (e.g. that a cached discovery performs zero network calls).
//! Always compiled so downstream crates can use it in their own tests.

use std::{
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use async_trait::async_trait;
use futures::stream;
use url::Url;

use crate::{codec::sse::SseFrame, protocol::error::A2AError};

use super::{FrameStream, Transport, TransportRequest, TransportResponse};

type Handler = dyn Fn(&TransportRequest) -> Result<TransportResponse, A2AError> + Send + Sync;
type StreamHandler = dyn Fn(&TransportRequest) -> Result<Vec<SseFrame>, A2AError> + Send + Sync;

/// Mock transport with programmable handlers and request recording
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    stream_handler: Option<Arc<StreamHandler>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    base_url: Url,
}

impl MockTransport {
    /// Create a new mock transport with a custom request handler
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<TransportResponse, A2AError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            stream_handler: None,
            requests: Arc::new(Mutex::new(Vec::new())),
            base_url: Url::parse("mock://agent").expect("static url"),
        }
    }

    /// Create a mock transport that always returns 200 OK with an empty body
    pub fn ok() -> Self {
        Self::new(|_| Ok(TransportResponse::new(200)))
    }

    /// Attach a streaming handler returning fixture frames
    pub fn with_stream_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&TransportRequest) -> Result<Vec<SseFrame>, A2AError> + Send + Sync + 'static,
    {
        self.stream_handler = Some(Arc::new(handler));
        self
    }

    /// Total number of requests served (streaming included)
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("mock lock").len()
    }

    /// Number of requests served for a given endpoint path
    pub fn requests_to(&self, endpoint: &str) -> usize {
        self.requests
            .lock()
            .expect("mock lock")
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .count()
    }

    /// Snapshot of all recorded requests
    pub fn recorded(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("mock lock").clone()
    }

    fn record(&self, request: &TransportRequest) {
        self.requests.lock().expect("mock lock").push(request.clone());
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), A2AError>> {
        Poll::Ready(Ok(()))
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, A2AError> {
        self.record(&request);
        (self.handler)(&request)
    }

    async fn execute_streaming(&self, request: TransportRequest) -> Result<FrameStream, A2AError> {
        self.record(&request);
        let Some(handler) = &self.stream_handler else {
            return Err(A2AError::Protocol(
                "mock transport has no stream handler".into(),
            ));
        };
        let frames: Vec<Result<SseFrame, A2AError>> =
            handler(&request)?.into_iter().map(Ok).collect();
        Ok(Box::pin(stream::iter(frames)))
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn supports_streaming(&self) -> bool {
        self.stream_handler.is_some()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish()
    }
}
