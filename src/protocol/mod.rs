//! Core A2A protocol types and definitions

pub mod agent;
pub mod artifact;
pub mod error;
pub mod message;
pub mod operation;

pub use agent::{AgentCard, Capability, CapabilityExample, Modality, ParameterSpec};
pub use artifact::{Artifact, ArtifactDetail};
pub use error::{A2AError, A2AResult};
pub use message::{DataEncoding, DataPart, FilePart, Message, Part, Role, TextPart};
pub use operation::{A2AOperation, InvocationTask};
