//! A2A protocol operations

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single skill invocation as carried inside the JSON-RPC envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvocationTask {
    pub id: String,

    pub skill: String,

    #[serde(default)]
    pub parameters: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl InvocationTask {
    pub fn new(id: impl Into<String>, skill: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skill: skill.into(),
            parameters: Map::new(),
            webhook_url: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

/// A2A protocol operations
///
/// Each operation maps to one endpoint of the remote agent. Conditional
/// validators on `FetchAgentCard` become `If-None-Match`/`If-Modified-Since`
/// headers on the wire.
#[derive(Debug, Clone)]
pub enum A2AOperation {
    /// Fetch the discovery document
    FetchAgentCard {
        etag: Option<String>,
        last_modified: Option<String>,
    },

    /// Invoke a named skill
    InvokeSkill { task: InvocationTask, stream: bool },

    /// Probe the remote agent's health endpoint
    HealthCheck,
}

impl A2AOperation {
    /// Fetch without conditional validators
    pub fn fetch_agent_card() -> Self {
        Self::FetchAgentCard {
            etag: None,
            last_modified: None,
        }
    }

    /// Get the HTTP endpoint path for this operation
    pub fn endpoint(&self) -> &'static str {
        match self {
            A2AOperation::FetchAgentCard { .. } => "/.well-known/agent.json",
            A2AOperation::InvokeSkill { .. } => "/invoke",
            A2AOperation::HealthCheck => "/health",
        }
    }

    /// Get the HTTP method for this operation
    pub fn method(&self) -> &'static str {
        match self {
            A2AOperation::InvokeSkill { .. } => "POST",
            _ => "GET",
        }
    }

    /// Check if this operation expects a streaming response
    pub fn is_streaming(&self) -> bool {
        matches!(self, A2AOperation::InvokeSkill { stream: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_endpoints() {
        let op = A2AOperation::fetch_agent_card();
        assert_eq!(op.endpoint(), "/.well-known/agent.json");
        assert_eq!(op.method(), "GET");

        let op = A2AOperation::InvokeSkill {
            task: InvocationTask::new("req-1", "summarize"),
            stream: false,
        };
        assert_eq!(op.endpoint(), "/invoke");
        assert_eq!(op.method(), "POST");

        let op = A2AOperation::HealthCheck;
        assert_eq!(op.endpoint(), "/health");
        assert_eq!(op.method(), "GET");
    }

    #[test]
    fn test_operation_streaming() {
        let op = A2AOperation::InvokeSkill {
            task: InvocationTask::new("req-1", "summarize"),
            stream: true,
        };
        assert!(op.is_streaming());

        let op = A2AOperation::fetch_agent_card();
        assert!(!op.is_streaming());
    }

    #[test]
    fn test_task_wire_shape() {
        let task = InvocationTask::new("req-1", "summarize");
        let wire = serde_json::to_value(&task).unwrap();
        assert_eq!(wire["id"], "req-1");
        assert_eq!(wire["skill"], "summarize");
        assert!(wire.get("webhookUrl").is_none());
    }
}
