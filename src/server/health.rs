//! Health check handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::router::AppState;

#[derive(Debug, Serialize)]
struct CheckOutcome {
    name: &'static str,
    pass: bool,
    detail: String,
}

/// GET `/health` - aggregate health report.
///
/// Returns 200 when healthy or degraded (a minority of checks failing) and
/// 503 when unhealthy. Check evaluation is infallible, so nothing can
/// propagate past the handler boundary.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let checks = run_checks(&state);
    let failed = checks.iter().filter(|c| !c.pass).count();

    let status = if failed == 0 {
        "healthy"
    } else if failed * 2 <= checks.len() {
        "degraded"
    } else {
        "unhealthy"
    };

    if failed > 0 {
        warn!(status, failed, total = checks.len(), "health checks failing");
    }

    let http_status = if status == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let body = json!({
        "status": status,
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "version": state.config.version,
        "checks": checks,
    });

    (http_status, Json(body))
}

fn run_checks(state: &AppState) -> Vec<CheckOutcome> {
    vec![
        registry_check(state),
        memory_check(state),
        configuration_check(state),
        serialization_check(),
        transport_check(),
    ]
}

fn registry_check(state: &AppState) -> CheckOutcome {
    let count = state.registry.len();
    CheckOutcome {
        name: "registry",
        pass: count > 0,
        detail: format!("{} skills registered", count),
    }
}

fn memory_check(state: &AppState) -> CheckOutcome {
    match resident_memory_bytes() {
        Some(resident) => CheckOutcome {
            name: "memory",
            pass: resident < state.config.memory_limit_bytes,
            detail: format!(
                "{} MiB resident, limit {} MiB",
                resident / (1024 * 1024),
                state.config.memory_limit_bytes / (1024 * 1024)
            ),
        },
        None => CheckOutcome {
            name: "memory",
            pass: true,
            detail: "resident memory not measurable on this platform".into(),
        },
    }
}

fn configuration_check(state: &AppState) -> CheckOutcome {
    let url_ok = state.config.service_endpoint_url.host_str().is_some();
    let name_ok = !state.config.agent_name.is_empty();
    CheckOutcome {
        name: "configuration",
        pass: url_ok && name_ok,
        detail: if url_ok && name_ok {
            "endpoint URL and agent identity configured".into()
        } else {
            "endpoint URL or agent name missing".into()
        },
    }
}

/// Smoke test of the serialization stack the wire format depends on
fn serialization_check() -> CheckOutcome {
    let probe = json!({"probe": true, "n": 1});
    let ok = serde_json::to_string(&probe)
        .ok()
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .map(|v| v == probe)
        .unwrap_or(false);
    CheckOutcome {
        name: "serialization",
        pass: ok,
        detail: if ok {
            "json round trip ok".into()
        } else {
            "json round trip failed".into()
        },
    }
}

/// Smoke test of the HTTP client stack, TLS backend included
fn transport_check() -> CheckOutcome {
    let ok = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(1))
        .build()
        .is_ok();
    CheckOutcome {
        name: "transport",
        pass: ok,
        detail: if ok {
            "http client and tls backend initialized".into()
        } else {
            "http client initialization failed".into()
        },
    }
}

/// Resident set size from /proc, where available
#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::server::{config::ServerConfig, registry::SkillRegistry};

    use super::*;

    fn state(registry: SkillRegistry) -> AppState {
        AppState::new(
            Arc::new(registry),
            ServerConfig::new(
                "Test Agent",
                "desc",
                "https://agent.example.com".parse().unwrap(),
            ),
        )
    }

    #[test]
    fn test_empty_registry_fails_check() {
        let outcome = registry_check(&state(SkillRegistry::new()));
        assert!(!outcome.pass);
    }

    #[test]
    fn test_configuration_check_passes() {
        let outcome = configuration_check(&state(SkillRegistry::new()));
        assert!(outcome.pass);
    }

    #[test]
    fn test_serialization_check_passes() {
        assert!(serialization_check().pass);
    }

    #[test]
    fn test_transport_check_passes() {
        assert!(transport_check().pass);
    }

    #[tokio::test]
    async fn test_single_failed_check_is_degraded() {
        // Empty registry: one failing check out of five
        let response = health_handler(State(state(SkillRegistry::new())))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
