//! JSON-RPC 2.0 codec for A2A invocations
//!
//! Builds the `{jsonrpc, method: "invoke", params: {task: ...}, id}` envelope
//! and unwraps the matching response envelope. Discovery and health bodies
//! are plain JSON and are decoded here as well, with header validation for
//! the discovery document.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    codec::Codec,
    protocol::{
        agent::AgentCard, artifact::Artifact, error::A2AError, operation::A2AOperation,
    },
    service::response::A2AResponse,
    transport::TransportResponse,
};

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: String,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
#[allow(unused)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
    id: Value,
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Deserialize)]
#[allow(unused)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Terminal status of a completed invocation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Completed,
    Failed,
}

/// The typed result of a skill invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvocationResult {
    pub status: InvocationStatus,

    #[serde(default)]
    pub result: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl InvocationResult {
    /// Build a result from a JSON-RPC `result` object
    pub fn from_value(value: &Value) -> Result<Self, A2AError> {
        serde_json::from_value(value.clone())
            .map_err(|e| A2AError::Protocol(format!("invalid invocation result: {}", e)))
    }
}

/// JSON-RPC 2.0 codec for the A2A HTTP binding
#[derive(Debug, Clone, Default)]
pub struct JsonRpcCodec;

impl JsonRpcCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonRpcCodec {
    fn encode_request(&self, operation: &A2AOperation) -> Result<Bytes, A2AError> {
        match operation {
            A2AOperation::InvokeSkill { task, stream } => {
                let params = json!({
                    "task": {
                        "id": task.id,
                        "skill": task.skill,
                        "parameters": task.parameters,
                        "options": {
                            "stream": stream,
                            "webhookUrl": task.webhook_url,
                        },
                    },
                });

                let request = JsonRpcRequest {
                    jsonrpc: "2.0".to_string(),
                    method: "invoke".to_string(),
                    params,
                    id: task.id.clone(),
                };

                let bytes = serde_json::to_vec(&request)?;
                Ok(Bytes::from(bytes))
            }
            // GET operations carry no body
            _ => Ok(Bytes::new()),
        }
    }

    fn decode_response(
        &self,
        response: &TransportResponse,
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError> {
        match operation {
            A2AOperation::FetchAgentCard { .. } => {
                let content_type = response.get_header("content-type").unwrap_or_default();
                if !content_type.contains("application/json") {
                    return Err(A2AError::AgentCard(format!(
                        "discovery endpoint returned {}, expected application/json",
                        if content_type.is_empty() {
                            "no content type"
                        } else {
                            content_type.as_str()
                        }
                    )));
                }

                let value: Value = serde_json::from_slice(&response.body)
                    .map_err(|e| A2AError::Protocol(format!("invalid agent card body: {}", e)))?;
                let card = AgentCard::from_wire(&value)?;

                Ok(A2AResponse::AgentCard {
                    card: Box::new(card),
                    etag: response.get_header("etag"),
                    last_modified: response.get_header("last-modified"),
                })
            }
            A2AOperation::InvokeSkill { .. } => {
                let envelope: JsonRpcResponse = serde_json::from_slice(&response.body)
                    .map_err(|e| {
                        A2AError::Protocol(format!("invalid JSON-RPC response: {}", e))
                    })?;

                if let Some(error) = envelope.error {
                    return Err(A2AError::Invocation {
                        code: error.code,
                        message: error.message,
                        status: None,
                    });
                }

                let result = envelope.result.ok_or_else(|| {
                    A2AError::Protocol("JSON-RPC response missing 'result' field".to_string())
                })?;

                Ok(A2AResponse::Invocation(Box::new(
                    InvocationResult::from_value(&result)?,
                )))
            }
            A2AOperation::HealthCheck => {
                let value: Value = serde_json::from_slice(&response.body)
                    .map_err(|e| A2AError::Protocol(format!("invalid health body: {}", e)))?;
                Ok(A2AResponse::Health(value))
            }
        }
    }

    fn content_type(&self) -> &str {
        "application/json"
    }
}
