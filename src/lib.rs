//! # a2a-bridge
//!
//! A client/server implementation of the Agent-to-Agent (A2A) protocol for
//! workflow execution systems. One instance discovers, authenticates to, and
//! invokes skills hosted by another over HTTP, with blocking and streaming
//! (Server-Sent Events) invocation.
//!
//! ## Features
//!
//! - **Discovery**: machine-readable agent cards at `/.well-known/agent.json`,
//!   cached client-side with a TTL and revalidated with conditional requests
//! - **Invocation**: JSON-RPC 2.0 envelopes over `POST /invoke`, blocking or
//!   streamed as SSE events
//! - **Typed errors**: a closed taxonomy callers can match exhaustively
//! - **Resilience**: bounded retries with exponential backoff for transient
//!   failures only
//!
//! ## Example
//!
//! ```rust,no_run
//! use a2a_bridge::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = "https://agent.example.com".parse().unwrap();
//!     let mut client = A2AClientBuilder::new_http(url)
//!         .with_bearer_auth("token123")
//!         .with_timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     let agent_card = client.fetch_agent_card(false).await?;
//!     println!("Connected to: {}", agent_card.name);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod codec;
pub mod layer;
pub mod protocol;
pub mod server;
pub mod service;
pub mod transport;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        client::{A2AClientBuilder, AgentClient, InvokeOptions},
        codec::{InvocationResult, InvocationStatus},
        protocol::error::A2AError,
        protocol::{AgentCard, Artifact, Capability, Message, Part, Role},
        server::{ServerConfig, SkillExecutor, SkillRegistry},
    };
}
