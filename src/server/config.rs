//! Server configuration

use serde_json::{Map, Value};
use url::Url;

/// Configuration for the server-side handlers
///
/// Immutable once the router is built; passed explicitly into handlers via
/// shared state rather than read from process globals.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Name advertised in the agent card
    pub agent_name: String,

    /// Description advertised in the agent card
    pub description: String,

    /// Advertised version
    pub version: String,

    /// Public endpoint URL advertised in the agent card
    pub service_endpoint_url: Url,

    /// Authentication requirements advertised in the agent card
    pub authentication_requirements: Map<String, Value>,

    /// String values in a result context at or above this byte length
    /// become document artifacts
    pub artifact_threshold: usize,

    /// Resident memory limit for the health check, in bytes
    pub memory_limit_bytes: u64,
}

impl ServerConfig {
    /// Create a configuration with defaults
    pub fn new(
        agent_name: impl Into<String>,
        description: impl Into<String>,
        service_endpoint_url: Url,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            description: description.into(),
            version: "1.0.0".to_string(),
            service_endpoint_url,
            authentication_requirements: Map::new(),
            artifact_threshold: 500,
            memory_limit_bytes: 512 * 1024 * 1024,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_authentication_requirements(mut self, requirements: Map<String, Value>) -> Self {
        self.authentication_requirements = requirements;
        self
    }

    pub fn with_artifact_threshold(mut self, threshold: usize) -> Self {
        self.artifact_threshold = threshold;
        self
    }
}
