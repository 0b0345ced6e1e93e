//! Server-side handlers for the A2A endpoints

pub mod config;
pub mod discovery;
pub mod health;
pub mod invoke;
pub mod registry;
pub mod router;

pub use config::ServerConfig;
pub use registry::{
    ExecutionContext, ExecutionResult, SkillCategory, SkillExecutor, SkillRegistry,
};
pub use router::{router, AppState};
