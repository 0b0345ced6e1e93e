//! A2A service response types

use serde_json::Value;

use crate::{codec::jsonrpc::InvocationResult, protocol::agent::AgentCard};

/// Response from an A2A service operation
#[derive(Debug, Clone)]
pub enum A2AResponse {
    /// Agent card response, with cache validators from the response headers
    AgentCard {
        card: Box<AgentCard>,
        etag: Option<String>,
        last_modified: Option<String>,
    },

    /// The server confirmed the cached card is still current (304)
    NotModified,

    /// Invocation result (from InvokeSkill)
    Invocation(Box<InvocationResult>),

    /// Health report (from HealthCheck)
    Health(Value),

    /// Empty response
    Empty,
}

impl A2AResponse {
    /// Extract an agent card from the response, if present
    pub fn into_agent_card(self) -> Option<AgentCard> {
        match self {
            A2AResponse::AgentCard { card, .. } => Some(*card),
            _ => None,
        }
    }

    /// Extract an invocation result from the response, if present
    pub fn into_invocation(self) -> Option<InvocationResult> {
        match self {
            A2AResponse::Invocation(result) => Some(*result),
            _ => None,
        }
    }

    /// Extract a health report from the response, if present
    pub fn into_health(self) -> Option<Value> {
        match self {
            A2AResponse::Health(value) => Some(value),
            _ => None,
        }
    }

    /// Check if the response is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, A2AResponse::Empty)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::codec::jsonrpc::InvocationStatus;

    use super::*;

    #[test]
    fn test_response_invocation() {
        let result = InvocationResult {
            status: InvocationStatus::Completed,
            result: Default::default(),
            artifacts: vec![],
            metadata: Default::default(),
        };
        let response = A2AResponse::Invocation(Box::new(result));

        let extracted = response.into_invocation().unwrap();
        assert_eq!(extracted.status, InvocationStatus::Completed);
    }

    #[test]
    fn test_response_health() {
        let response = A2AResponse::Health(json!({"status": "healthy"}));
        let value = response.into_health().unwrap();
        assert_eq!(value["status"], "healthy");
    }

    #[test]
    fn test_response_empty() {
        assert!(A2AResponse::Empty.is_empty());
        assert!(A2AResponse::NotModified.into_agent_card().is_none());
    }
}
