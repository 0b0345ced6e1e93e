//! Skill invocation handler
//!
//! Accepts the JSON-RPC 2.0 invoke envelope, resolves the skill against the
//! registry, executes it through the workflow engine, and answers either a
//! single JSON-RPC response or an SSE event stream when the caller asks for
//! `text/event-stream`.

use std::convert::Infallible;

use async_stream::stream;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, error};
use uuid::Uuid;

use crate::protocol::artifact::Artifact;

use super::{
    registry::{ExecutionContext, ExecutionResult},
    router::AppState,
};

#[derive(Debug, Deserialize)]
struct InvokeEnvelope {
    jsonrpc: Option<Value>,
    method: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TaskBody {
    #[serde(default)]
    id: Option<String>,
    skill: String,
    #[serde(default)]
    parameters: Map<String, Value>,
}

struct ValidInvoke {
    request_id: Value,
    task_id: String,
    skill: String,
    parameters: Map<String, Value>,
}

/// POST `/invoke` - execute a registered skill.
///
/// Envelope violations are 400s with a descriptive message; an unknown
/// skill is also a 400 since the endpoint itself exists. Execution failures
/// stay JSON-RPC-shaped: a 200 carrying an `error` object.
pub async fn invoke_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let invoke = match validate_envelope(&body) {
        Ok(invoke) => invoke,
        Err(message) => return bad_request(message),
    };

    let Some(executor) = state.registry.find(&invoke.skill) else {
        return bad_request(format!(
            "Unknown skill: {} (available: {})",
            invoke.skill,
            state.registry.skill_names().join(", ")
        ));
    };

    let wants_stream = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/event-stream"))
        .unwrap_or(false);

    debug!(skill = %invoke.skill, streaming = wants_stream, "invoking skill");

    if wants_stream {
        return stream_invocation(state, invoke, executor).into_response();
    }

    let context = ExecutionContext::new(invoke.parameters.clone());
    match executor.execute(context).await {
        Ok(result) if result.success => {
            let payload = build_result(&state, &invoke.skill, &result);
            Json(json!({
                "jsonrpc": "2.0",
                "result": payload,
                "id": invoke.request_id,
            }))
            .into_response()
        }
        Ok(result) => {
            let message = result
                .error
                .unwrap_or_else(|| "execution reported failure".into());
            jsonrpc_error(&invoke.request_id, -32000, &message)
        }
        Err(error) => {
            error!(skill = %invoke.skill, error = %error, "skill execution failed");
            jsonrpc_error(&invoke.request_id, error.jsonrpc_code(), &error.to_string())
        }
    }
}

fn validate_envelope(body: &str) -> Result<ValidInvoke, String> {
    let envelope: InvokeEnvelope = serde_json::from_str(body)
        .map_err(|e| format!("Request body is not valid JSON: {}", e))?;

    match envelope.jsonrpc {
        Some(Value::String(ref version)) if version == "2.0" => {}
        Some(other) => return Err(format!("jsonrpc must be \"2.0\", got {}", other)),
        None => return Err("jsonrpc field is required".into()),
    }

    match envelope.method {
        Some(Value::String(ref method)) if method == "invoke" => {}
        Some(other) => return Err(format!("method must be \"invoke\", got {}", other)),
        None => return Err("method field is required".into()),
    }

    let request_id = envelope.id.ok_or("id field is required")?;

    let task_value = envelope
        .params
        .as_ref()
        .and_then(|params| params.get("task"))
        .cloned()
        .ok_or("params.task is required")?;

    let task: TaskBody = serde_json::from_value(task_value)
        .map_err(|e| format!("params.task is malformed: {}", e))?;

    if task.skill.is_empty() {
        return Err("task.skill must not be empty".into());
    }

    Ok(ValidInvoke {
        request_id,
        task_id: task.id.unwrap_or_else(|| Uuid::now_v7().to_string()),
        skill: task.skill,
        parameters: task.parameters,
    })
}

/// Build the JSON-RPC `result` object for a successful execution.
///
/// Non-internal context pairs form the result map; oversized strings become
/// document artifacts and structured values become data artifacts.
fn build_result(state: &AppState, skill: &str, result: &ExecutionResult) -> Value {
    let pairs = result.context.non_internal_pairs();
    let artifacts = derive_artifacts(&pairs, state.config.artifact_threshold);

    json!({
        "status": "completed",
        "result": pairs,
        "artifacts": artifacts,
        "metadata": {
            "executor": skill,
            "executedAt": Utc::now().to_rfc3339(),
        },
    })
}

fn derive_artifacts(pairs: &Map<String, Value>, threshold: usize) -> Vec<Value> {
    pairs
        .iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) if s.len() >= threshold => {
                Some(Artifact::document(key.clone(), s.clone()).to_wire())
            }
            Value::Object(_) | Value::Array(_) => {
                Some(Artifact::data(key.clone(), value.clone()).to_wire())
            }
            _ => None,
        })
        .collect()
}

/// Stream the invocation as SSE: `start`, one `task_start`/`task_complete`
/// pair around execution, then a final `complete` or `error`.
fn stream_invocation(
    state: AppState,
    invoke: ValidInvoke,
    executor: std::sync::Arc<dyn super::registry::SkillExecutor>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let events = stream! {
        yield sse_event("start", json!({
            "taskId": invoke.task_id,
            "skill": invoke.skill,
            "status": "started",
        }));

        yield sse_event("task_start", json!({"skill": invoke.skill}));

        let context = ExecutionContext::new(invoke.parameters.clone());
        match executor.execute(context).await {
            Ok(result) if result.success => {
                let pairs = result.context.non_internal_pairs();
                yield sse_event("task_complete", json!({
                    "skill": invoke.skill,
                    "result": pairs,
                }));
                yield sse_event("complete", build_result(&state, &invoke.skill, &result));
            }
            Ok(result) => {
                let message = result
                    .error
                    .unwrap_or_else(|| "execution reported failure".into());
                yield sse_event("error", json!({"message": message, "code": -32000}));
            }
            Err(error) => {
                error!(skill = %invoke.skill, error = %error, "skill execution failed");
                yield sse_event("error", json!({
                    "message": error.to_string(),
                    "code": error.jsonrpc_code(),
                }));
            }
        }
    };

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn sse_event(name: &'static str, payload: Value) -> Result<Event, Infallible> {
    // Payloads are plain JSON values, so serialization cannot fail
    Ok(Event::default()
        .event(name)
        .json_data(&payload)
        .unwrap_or_else(|_| Event::default().event(name).data("{}")))
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": message, "code": "bad_request"})),
    )
        .into_response()
}

fn jsonrpc_error(request_id: &Value, code: i64, message: &str) -> Response {
    Json(json!({
        "jsonrpc": "2.0",
        "error": {"code": code, "message": message},
        "id": request_id,
    }))
    .into_response()
}
