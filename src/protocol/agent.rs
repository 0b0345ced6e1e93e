//! Agent discovery and capability types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

use super::error::A2AError;

/// Content modalities an agent can accept and produce
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Json,
    File,
    Data,
}

/// Declared shape of a single capability parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterSpec {
    #[serde(rename = "type")]
    pub param_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            param_type: param_type.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// An input/output example attached to a capability
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapabilityExample {
    pub input: Value,
    pub output: Value,
}

/// A single named, invocable operation an agent exposes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub name: String,

    pub description: String,

    /// Parameter name to declared shape. A `BTreeMap` keeps serialization
    /// order stable so identical registries yield byte-identical cards.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterSpec>,

    /// Return-shape description
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub returns: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<CapabilityExample>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_permissions: Vec<String>,
}

impl Capability {
    /// Create a capability with the two required fields
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: BTreeMap::new(),
            returns: Value::Null,
            examples: Vec::new(),
            tags: Vec::new(),
            required_permissions: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, spec: ParameterSpec) -> Self {
        self.parameters.insert(name.into(), spec);
        self
    }

    pub fn with_returns(mut self, returns: Value) -> Self {
        self.returns = returns;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_example(mut self, input: Value, output: Value) -> Self {
        self.examples.push(CapabilityExample { input, output });
        self
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), A2AError> {
        if self.name.is_empty() {
            return Err(A2AError::Validation("capability name is required".into()));
        }
        if self.description.is_empty() {
            return Err(A2AError::Validation(format!(
                "capability {} is missing a description",
                self.name
            )));
        }
        Ok(())
    }
}

/// Agent Card for agent discovery
///
/// The card is published at `/.well-known/agent.json` and describes the
/// agent's identity, supported modalities, authentication requirements, and
/// invocable capabilities. Server-side it is derived fresh from the live
/// skill registry per request; client-side it is deserialized from the wire
/// and cached with a TTL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    pub id: String,

    pub name: String,

    pub description: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(rename = "serviceEndpointURL")]
    pub service_endpoint_url: Url,

    #[serde(default = "default_modalities")]
    pub supported_modalities: Vec<Modality>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub authentication_requirements: Map<String, Value>,

    pub capabilities: Vec<Capability>,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_modalities() -> Vec<Modality> {
    vec![Modality::Text, Modality::Json]
}

impl AgentCard {
    /// Create a new agent card
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        service_endpoint_url: Url,
        capabilities: Vec<Capability>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            description: description.into(),
            version: default_version(),
            service_endpoint_url,
            supported_modalities: default_modalities(),
            authentication_requirements: Map::new(),
            capabilities,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the agent version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Describe the authentication the agent expects
    pub fn with_authentication(mut self, requirements: Map<String, Value>) -> Self {
        self.authentication_requirements = requirements;
        self
    }

    /// Validate the card invariants: a well-formed endpoint is guaranteed by
    /// the [`Url`] type; capabilities must be non-empty and individually
    /// valid.
    pub fn validate(&self) -> Result<(), A2AError> {
        if self.name.is_empty() {
            return Err(A2AError::Validation("agent name is required".into()));
        }
        if self.capabilities.is_empty() {
            return Err(A2AError::Validation(
                "agent card must advertise at least one capability".into(),
            ));
        }
        for capability in &self.capabilities {
            capability.validate()?;
        }
        Ok(())
    }

    /// Find a capability by name
    pub fn find_capability(&self, name: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.name == name)
    }

    /// Names of all advertised capabilities, in card order
    pub fn capability_names(&self) -> Vec<String> {
        self.capabilities.iter().map(|c| c.name.clone()).collect()
    }

    /// Parse a card from its wire representation and validate it.
    ///
    /// A malformed body is a [`A2AError::Protocol`]; a well-formed body that
    /// violates card invariants is a [`A2AError::AgentCard`].
    pub fn from_wire(value: &Value) -> Result<Self, A2AError> {
        let card: AgentCard = serde_json::from_value(value.clone())
            .map_err(|e| A2AError::Protocol(format!("invalid agent card body: {}", e)))?;
        card.validate()
            .map_err(|e| A2AError::AgentCard(e.to_string()))?;
        Ok(card)
    }

    /// Serialize to the wire representation
    pub fn to_wire(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_card() -> AgentCard {
        let capability = Capability::new("text_analysis", "Analyze text sentiment")
            .with_parameter("text", ParameterSpec::required("string", "Text to analyze"))
            .with_returns(json!({"type": "object"}))
            .with_tag("ai")
            .with_example(json!({"text": "great"}), json!({"sentiment": "positive"}));

        AgentCard::new(
            "Workflow Agent",
            "Runs registered workflows",
            "https://agent.example.com".parse().unwrap(),
            vec![capability],
        )
    }

    #[test]
    fn test_card_wire_keys_are_camel_case() {
        let card = sample_card();
        let wire = card.to_wire();

        assert!(wire.get("serviceEndpointURL").is_some());
        assert!(wire.get("supportedModalities").is_some());
        assert!(wire.get("createdAt").is_some());
        assert!(wire.get("updatedAt").is_some());
        assert!(wire.get("service_endpoint_url").is_none());
    }

    #[test]
    fn test_card_round_trip() {
        let card = sample_card();
        let parsed = AgentCard::from_wire(&card.to_wire()).unwrap();
        assert_eq!(card, parsed);
    }

    #[test]
    fn test_card_defaults_applied_on_parse() {
        let wire = json!({
            "id": "abc",
            "name": "Minimal",
            "description": "d",
            "serviceEndpointURL": "https://x.example.com",
            "capabilities": [{"name": "noop", "description": "does nothing"}],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        let card = AgentCard::from_wire(&wire).unwrap();
        assert_eq!(card.version, "1.0.0");
        assert_eq!(
            card.supported_modalities,
            vec![Modality::Text, Modality::Json]
        );
    }

    #[test]
    fn test_card_requires_capabilities() {
        let wire = json!({
            "id": "abc",
            "name": "Empty",
            "description": "d",
            "serviceEndpointURL": "https://x.example.com",
            "capabilities": [],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        assert!(matches!(
            AgentCard::from_wire(&wire),
            Err(A2AError::AgentCard(_))
        ));
    }

    #[test]
    fn test_card_rejects_malformed_endpoint() {
        let wire = json!({
            "id": "abc",
            "name": "Bad",
            "description": "d",
            "serviceEndpointURL": "not a url",
            "capabilities": [{"name": "noop", "description": "d"}],
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });

        assert!(matches!(
            AgentCard::from_wire(&wire),
            Err(A2AError::Protocol(_))
        ));
    }

    #[test]
    fn test_find_capability() {
        let card = sample_card();
        assert!(card.find_capability("text_analysis").is_some());
        assert!(card.find_capability("missing").is_none());
        assert_eq!(card.capability_names(), vec!["text_analysis"]);
    }

    #[test]
    fn test_capability_validation() {
        assert!(Capability::new("", "desc").validate().is_err());
        assert!(Capability::new("name", "").validate().is_err());
        assert!(Capability::new("name", "desc").validate().is_ok());
    }
}
