//! Server-Sent Events codec for streaming invocations
//!
//! The wire format is standard SSE frames (`event:`/`data:`/`id:` lines
//! separated by a blank line) whose data payloads are JSON. The client-side
//! [`StreamAccumulator`] mirrors the server's state machine:
//! `Started -> TaskRunning* -> Completed | Failed`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    codec::jsonrpc::{InvocationResult, InvocationStatus},
    protocol::{artifact::Artifact, error::A2AError},
};

/// A raw SSE frame as read off the wire
#[derive(Debug, Clone, PartialEq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

impl SseFrame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }
}

/// Event kinds a streaming invocation can emit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StreamEventKind {
    Start,
    TaskStart,
    TaskComplete,
    Complete,
    Error,
}

impl StreamEventKind {
    /// Map an SSE event name to a kind. Unknown names yield `None` and are
    /// skipped by the accumulator.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "task_start" => Some(Self::TaskStart),
            "task_complete" => Some(Self::TaskComplete),
            "complete" => Some(Self::Complete),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::TaskStart => "task_start",
            Self::TaskComplete => "task_complete",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// A parsed streaming event
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub kind: StreamEventKind,
    pub payload: Value,
}

impl StreamEvent {
    /// Parse a raw frame into a typed event.
    ///
    /// Returns `Ok(None)` for frames with an unrecognized event name; a frame
    /// whose data is not valid JSON is a protocol error.
    pub fn from_frame(frame: &SseFrame) -> Result<Option<Self>, A2AError> {
        let Some(kind) = StreamEventKind::from_name(&frame.event) else {
            return Ok(None);
        };

        let payload: Value = serde_json::from_str(&frame.data)
            .map_err(|e| A2AError::Protocol(format!("invalid SSE event data: {}", e)))?;

        Ok(Some(Self { kind, payload }))
    }

    /// Whether this event terminates the stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            StreamEventKind::Complete | StreamEventKind::Error
        )
    }
}

/// Client-side mirror of the streaming state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Started,
    TaskRunning,
    Completed,
    Failed,
}

/// Accumulates streaming events into a single invocation result
///
/// Events must be observed in arrival order. `task_complete` and `complete`
/// payloads are shallow-merged so later chunks win on key collisions; any
/// `error` event forces the failed state regardless of what came before it.
#[derive(Debug)]
pub struct StreamAccumulator {
    state: StreamState,
    merged: Map<String, Value>,
    artifacts: Vec<Artifact>,
    metadata: Map<String, Value>,
    errors: Vec<String>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self {
            state: StreamState::Started,
            merged: Map::new(),
            artifacts: Vec::new(),
            metadata: Map::new(),
            errors: Vec::new(),
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Feed one event into the state machine
    pub fn observe(&mut self, event: &StreamEvent) {
        match event.kind {
            StreamEventKind::Start => {}
            StreamEventKind::TaskStart => {
                if self.state == StreamState::Started {
                    self.state = StreamState::TaskRunning;
                }
            }
            StreamEventKind::TaskComplete => {
                if self.state == StreamState::Started {
                    self.state = StreamState::TaskRunning;
                }
                self.merge_result_payload(&event.payload);
            }
            StreamEventKind::Complete => {
                self.merge_result_payload(&event.payload);
                self.collect_outputs(&event.payload);
                if self.state != StreamState::Failed {
                    self.state = StreamState::Completed;
                }
            }
            StreamEventKind::Error => {
                let message = event
                    .payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unspecified stream error")
                    .to_string();
                self.errors.push(message);
                self.state = StreamState::Failed;
            }
        }
    }

    /// Merge the `result` object of a payload (or the payload's own object
    /// entries when no `result` key is present) into the accumulated map.
    fn merge_result_payload(&mut self, payload: &Value) {
        if let Some(inner) = payload.get("result").and_then(Value::as_object) {
            for (key, value) in inner {
                self.merged.insert(key.clone(), value.clone());
            }
            return;
        }

        if let Some(obj) = payload.as_object() {
            for (key, value) in obj {
                if matches!(
                    key.as_str(),
                    "artifacts" | "metadata" | "status" | "skill" | "taskId"
                ) {
                    continue;
                }
                self.merged.insert(key.clone(), value.clone());
            }
        }
    }

    fn collect_outputs(&mut self, payload: &Value) {
        if let Some(artifacts) = payload.get("artifacts").and_then(Value::as_array) {
            for raw in artifacts {
                if let Ok(artifact) = Artifact::from_wire(raw) {
                    self.artifacts.push(artifact);
                }
            }
        }
        if let Some(metadata) = payload.get("metadata").and_then(Value::as_object) {
            self.metadata.extend(metadata.clone());
        }
    }

    /// Conclude the stream.
    ///
    /// Any observed `error` event wins over accumulated results; a stream
    /// that ended without a terminal event is a network failure, not a
    /// silent success.
    pub fn finish(self) -> Result<InvocationResult, A2AError> {
        if !self.errors.is_empty() || self.state == StreamState::Failed {
            let message = if self.errors.is_empty() {
                "stream reported failure".to_string()
            } else {
                self.errors.join("; ")
            };
            return Err(A2AError::Invocation {
                code: -32000,
                message,
                status: None,
            });
        }

        if self.state != StreamState::Completed {
            return Err(A2AError::Network("unexpected stream termination".into()));
        }

        Ok(InvocationResult {
            status: InvocationStatus::Completed,
            result: self.merged,
            artifacts: self.artifacts,
            metadata: self.metadata,
        })
    }
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn event(kind: StreamEventKind, payload: Value) -> StreamEvent {
        StreamEvent { kind, payload }
    }

    #[test]
    fn test_event_kind_mapping() {
        assert_eq!(
            StreamEventKind::from_name("task_complete"),
            Some(StreamEventKind::TaskComplete)
        );
        assert_eq!(StreamEventKind::from_name("heartbeat"), None);
        assert_eq!(StreamEventKind::Complete.name(), "complete");
    }

    #[test]
    fn test_frame_parsing() {
        let frame = SseFrame::new("start", r#"{"taskId": "t-1"}"#);
        let event = StreamEvent::from_frame(&frame).unwrap().unwrap();
        assert_eq!(event.kind, StreamEventKind::Start);
        assert_eq!(event.payload["taskId"], "t-1");

        let unknown = SseFrame::new("heartbeat", "{}");
        assert!(StreamEvent::from_frame(&unknown).unwrap().is_none());

        let garbage = SseFrame::new("complete", "not json");
        assert!(StreamEvent::from_frame(&garbage).is_err());
    }

    #[test]
    fn test_accumulator_merges_chunks() {
        let mut acc = StreamAccumulator::new();
        acc.observe(&event(StreamEventKind::Start, json!({"taskId": "t-1"})));
        acc.observe(&event(StreamEventKind::TaskStart, json!({"skill": "s"})));
        acc.observe(&event(
            StreamEventKind::TaskComplete,
            json!({"result": {"chunk": 1}}),
        ));
        acc.observe(&event(
            StreamEventKind::TaskComplete,
            json!({"result": {"extra": "two"}}),
        ));
        acc.observe(&event(
            StreamEventKind::Complete,
            json!({
                "status": "completed",
                "result": {"final": true},
                "metadata": {"executor": "engine"}
            }),
        ));

        let result = acc.finish().unwrap();
        assert_eq!(result.status, InvocationStatus::Completed);
        assert_eq!(result.result["chunk"], 1);
        assert_eq!(result.result["extra"], "two");
        assert_eq!(result.result["final"], true);
        assert_eq!(result.metadata["executor"], "engine");
    }

    #[test]
    fn test_error_event_wins_over_results() {
        let mut acc = StreamAccumulator::new();
        acc.observe(&event(StreamEventKind::Start, json!({})));
        acc.observe(&event(
            StreamEventKind::Complete,
            json!({"result": {"looks": "fine"}}),
        ));
        acc.observe(&event(
            StreamEventKind::Error,
            json!({"message": "executor crashed"}),
        ));

        match acc.finish() {
            Err(A2AError::Invocation { message, .. }) => {
                assert!(message.contains("executor crashed"));
            }
            other => panic!("expected invocation error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_stream_is_network_error() {
        let mut acc = StreamAccumulator::new();
        acc.observe(&event(StreamEventKind::Start, json!({})));
        acc.observe(&event(
            StreamEventKind::TaskComplete,
            json!({"result": {"partial": 1}}),
        ));

        match acc.finish() {
            Err(A2AError::Network(msg)) => {
                assert!(msg.contains("unexpected stream termination"));
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }

    #[test]
    fn test_state_transitions() {
        let mut acc = StreamAccumulator::new();
        assert_eq!(acc.state(), StreamState::Started);

        acc.observe(&event(StreamEventKind::TaskStart, json!({})));
        assert_eq!(acc.state(), StreamState::TaskRunning);

        acc.observe(&event(StreamEventKind::Error, json!({"message": "x"})));
        assert_eq!(acc.state(), StreamState::Failed);

        // Terminal: a later complete cannot resurrect a failed stream
        acc.observe(&event(StreamEventKind::Complete, json!({})));
        assert_eq!(acc.state(), StreamState::Failed);
    }
}
