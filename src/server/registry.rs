//! Skill registry and agent card derivation
//!
//! The registry maps skill names to executables backed by the external
//! workflow engine. It is populated by explicit `register` calls at startup
//! and keeps registration order, so the derived agent card is deterministic:
//! the same registry state always yields the same capability list.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::protocol::{
    agent::{AgentCard, Capability, ParameterSpec},
    error::A2AError,
};

use super::config::ServerConfig;

/// Category of a skill, used to derive capability tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillCategory {
    Ai,
    Data,
    ExternalCall,
    Notification,
    General,
}

impl SkillCategory {
    fn tags(self) -> Vec<String> {
        match self {
            SkillCategory::Ai => vec!["ai".into(), "ml".into()],
            SkillCategory::Data => vec!["data".into()],
            SkillCategory::ExternalCall => vec!["integration".into()],
            SkillCategory::Notification => vec!["notification".into()],
            SkillCategory::General => vec![],
        }
    }
}

/// Execution context handed to a skill executor
///
/// Keys starting with an underscore are internal bookkeeping and are never
/// exposed in invocation responses.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Create a context seeded with the invocation parameters
    pub fn new(initial: Map<String, Value>) -> Self {
        Self { values: initial }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// All entries, internal ones included
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Entries safe to expose in a response
    pub fn non_internal_pairs(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(k, _)| !k.starts_with('_'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Outcome of executing a skill
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub context: ExecutionContext,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn success(context: ExecutionContext) -> Self {
        Self {
            success: true,
            context,
            error: None,
        }
    }

    pub fn failure(context: ExecutionContext, error: impl Into<String>) -> Self {
        Self {
            success: false,
            context,
            error: Some(error.into()),
        }
    }
}

/// An executable skill backed by the external workflow engine
///
/// Implementations wrap `execute(workflow, context)` of the engine; the
/// remaining methods supply the metadata the agent card is derived from.
#[async_trait]
pub trait SkillExecutor: Send + Sync {
    /// Human-readable description; a default is generated when absent
    fn description(&self) -> Option<String> {
        None
    }

    /// Category used to derive capability tags
    fn category(&self) -> SkillCategory {
        SkillCategory::General
    }

    /// Declared required inputs as (name, type, description) triples.
    /// An empty list advertises a generic dynamic-parameters object.
    fn required_inputs(&self) -> Vec<(String, String, String)> {
        Vec::new()
    }

    /// Return-shape description for the capability
    fn returns(&self) -> Value {
        json!({"type": "object", "description": "Execution result context"})
    }

    /// Permissions a caller must hold to invoke this skill
    fn required_permissions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Execute the skill against the supplied context
    async fn execute(&self, context: ExecutionContext) -> Result<ExecutionResult, A2AError>;
}

struct Registration {
    name: String,
    executor: Arc<dyn SkillExecutor>,
}

/// Insertion-ordered registry of invocable skills
#[derive(Default)]
pub struct SkillRegistry {
    entries: Vec<Registration>,
    /// Name prefix applied in gateway mode (e.g. "workflows")
    namespace: Option<String>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry whose capability names are prefixed, for gateways
    /// fronting several executable sets
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            entries: Vec::new(),
            namespace: Some(namespace.into()),
        }
    }

    /// Register an executor under a skill name. Re-registering a name
    /// replaces the previous executor in place, keeping its position.
    pub fn register(&mut self, name: impl Into<String>, executor: Arc<dyn SkillExecutor>) {
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|r| r.name == name) {
            existing.executor = executor;
        } else {
            self.entries.push(Registration { name, executor });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Look up an executor by its advertised capability name
    pub fn find(&self, name: &str) -> Option<Arc<dyn SkillExecutor>> {
        self.entries
            .iter()
            .find(|r| self.qualified_name(&r.name) == name || r.name == name)
            .map(|r| r.executor.clone())
    }

    /// Advertised capability names, in registration order
    pub fn skill_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|r| self.qualified_name(&r.name))
            .collect()
    }

    fn qualified_name(&self, name: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, name),
            None => name.to_string(),
        }
    }

    /// Derive the agent card describing this registry.
    ///
    /// Deterministic: capability order is registration order and all derived
    /// fields are pure functions of the executor metadata.
    pub fn agent_card(&self, config: &ServerConfig) -> AgentCard {
        let capabilities = self
            .entries
            .iter()
            .map(|registration| self.derive_capability(registration))
            .collect();

        let mut card = AgentCard::new(
            config.agent_name.clone(),
            config.description.clone(),
            config.service_endpoint_url.clone(),
            capabilities,
        )
        .with_version(config.version.clone());

        card.authentication_requirements = config.authentication_requirements.clone();
        card
    }

    fn derive_capability(&self, registration: &Registration) -> Capability {
        let executor = &registration.executor;
        let description = executor
            .description()
            .unwrap_or_else(|| format!("Execute the {} workflow", registration.name));

        let mut capability = Capability::new(self.qualified_name(&registration.name), description)
            .with_returns(executor.returns());

        let inputs = executor.required_inputs();
        if inputs.is_empty() {
            capability = capability.with_parameter(
                "params",
                ParameterSpec::optional("object", "Dynamic workflow parameters"),
            );
        } else {
            for (name, param_type, description) in inputs {
                capability =
                    capability.with_parameter(name, ParameterSpec::required(param_type, description));
            }
        }

        for tag in executor.category().tags() {
            capability = capability.with_tag(tag);
        }
        capability.required_permissions = executor.required_permissions();

        capability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) struct EchoSkill;

    #[async_trait]
    impl SkillExecutor for EchoSkill {
        fn description(&self) -> Option<String> {
            Some("Echo parameters back".into())
        }

        fn category(&self) -> SkillCategory {
            SkillCategory::Data
        }

        fn required_inputs(&self) -> Vec<(String, String, String)> {
            vec![("text".into(), "string".into(), "Text to echo".into())]
        }

        async fn execute(&self, context: ExecutionContext) -> Result<ExecutionResult, A2AError> {
            Ok(ExecutionResult::success(context))
        }
    }

    fn config() -> ServerConfig {
        ServerConfig::new(
            "Test Agent",
            "Agent under test",
            "https://agent.example.com".parse().unwrap(),
        )
    }

    #[test]
    fn test_card_derivation_is_deterministic() {
        let mut registry = SkillRegistry::new();
        registry.register("echo", Arc::new(EchoSkill));

        let card_a = registry.agent_card(&config());
        let card_b = registry.agent_card(&config());

        assert_eq!(
            serde_json::to_value(&card_a.capabilities).unwrap(),
            serde_json::to_value(&card_b.capabilities).unwrap()
        );
    }

    #[test]
    fn test_capability_derivation() {
        let mut registry = SkillRegistry::new();
        registry.register("echo", Arc::new(EchoSkill));

        let card = registry.agent_card(&config());
        let capability = &card.capabilities[0];

        assert_eq!(capability.name, "echo");
        assert_eq!(capability.description, "Echo parameters back");
        assert!(capability.parameters.contains_key("text"));
        assert_eq!(capability.tags, vec!["data"]);
    }

    #[test]
    fn test_namespace_prefixes_names() {
        let mut registry = SkillRegistry::with_namespace("workflows");
        registry.register("echo", Arc::new(EchoSkill));

        assert_eq!(registry.skill_names(), vec!["workflows/echo"]);
        assert!(registry.find("workflows/echo").is_some());
        assert!(registry.find("echo").is_some());
    }

    #[test]
    fn test_dynamic_parameters_placeholder() {
        struct Bare;

        #[async_trait]
        impl SkillExecutor for Bare {
            async fn execute(
                &self,
                context: ExecutionContext,
            ) -> Result<ExecutionResult, A2AError> {
                Ok(ExecutionResult::success(context))
            }
        }

        let mut registry = SkillRegistry::new();
        registry.register("bare", Arc::new(Bare));

        let card = registry.agent_card(&config());
        let capability = &card.capabilities[0];
        assert_eq!(capability.description, "Execute the bare workflow");
        assert!(capability.parameters.contains_key("params"));
        assert!(!capability.parameters["params"].required);
    }

    #[test]
    fn test_context_filters_internal_keys() {
        let mut context = ExecutionContext::default();
        context.set("visible", serde_json::json!(1));
        context.set("_internal", serde_json::json!("hidden"));

        let pairs = context.non_internal_pairs();
        assert!(pairs.contains_key("visible"));
        assert!(!pairs.contains_key("_internal"));
    }

    #[test]
    fn test_reregistration_keeps_position() {
        let mut registry = SkillRegistry::new();
        registry.register("a", Arc::new(EchoSkill));
        registry.register("b", Arc::new(EchoSkill));
        registry.register("a", Arc::new(EchoSkill));

        assert_eq!(registry.skill_names(), vec!["a", "b"]);
        assert_eq!(registry.len(), 2);
    }
}
