//! High-level client API for A2A protocol

pub mod agent;
pub mod builder;
pub mod cache;
pub mod config;
pub mod retry;

pub use agent::{AgentClient, InvokeOptions};
pub use builder::A2AClientBuilder;
pub use cache::{AgentCardCache, CardValidators};
pub use config::ClientConfig;
pub use retry::RetryPolicy;
