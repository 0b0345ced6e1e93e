//! Validation layer for A2A protocol requests
//!
//! Rejects malformed invocations before any network call is made, so local
//! validation failures never consume a retry attempt or a connection.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{error::A2AError, operation::A2AOperation},
    service::{A2ARequest, A2AResponse},
};

/// Layer that validates A2A protocol requests
#[derive(Clone, Debug, Default)]
pub struct A2AValidationLayer;

impl A2AValidationLayer {
    /// Create a new validation layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for A2AValidationLayer {
    type Service = A2AValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        A2AValidationService { inner }
    }
}

/// Validation service that wraps an inner service
#[derive(Clone)]
pub struct A2AValidationService<S> {
    inner: S,
}

impl<S> A2AValidationService<S> {
    /// Validate an A2A request
    fn validate_request(req: &A2ARequest) -> Result<(), A2AError> {
        if let A2AOperation::InvokeSkill { task, .. } = &req.operation {
            if task.skill.is_empty() {
                return Err(A2AError::Validation("skill name cannot be empty".into()));
            }
            if task.id.is_empty() {
                return Err(A2AError::Validation("request id cannot be empty".into()));
            }
            if let Some(webhook) = &task.webhook_url {
                if url::Url::parse(webhook).is_err() {
                    return Err(A2AError::Validation(format!(
                        "webhook url is not a valid URL: {}",
                        webhook
                    )));
                }
            }
        }

        if req.context.agent_url.is_empty() {
            return Err(A2AError::Validation("agent URL cannot be empty".into()));
        }

        Ok(())
    }
}

impl<S> Service<A2ARequest> for A2AValidationService<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        if let Err(e) = Self::validate_request(&req) {
            return Box::pin(async move { Err(e) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use crate::{protocol::operation::InvocationTask, service::RequestContext};

    use super::*;

    fn request(task: InvocationTask) -> A2ARequest {
        A2ARequest::new(
            A2AOperation::InvokeSkill {
                task,
                stream: false,
            },
            RequestContext::new("https://example.com"),
        )
    }

    #[test]
    fn test_validate_invoke() {
        let req = request(InvocationTask::new("req-1", "summarize"));
        assert!(A2AValidationService::<()>::validate_request(&req).is_ok());
    }

    #[test]
    fn test_validate_empty_skill() {
        let req = request(InvocationTask::new("req-1", ""));
        assert!(matches!(
            A2AValidationService::<()>::validate_request(&req),
            Err(A2AError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_bad_webhook() {
        let mut task = InvocationTask::new("req-1", "summarize");
        task.webhook_url = Some("not a url".into());
        let req = request(task);
        assert!(matches!(
            A2AValidationService::<()>::validate_request(&req),
            Err(A2AError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_empty_agent_url() {
        let req = A2ARequest::new(A2AOperation::HealthCheck, RequestContext::new(""));
        assert!(matches!(
            A2AValidationService::<()>::validate_request(&req),
            Err(A2AError::Validation(_))
        ));
    }
}
