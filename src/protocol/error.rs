//! Error taxonomy for A2A protocol operations

use thiserror::Error;

/// Main error type for A2A protocol operations
///
/// This is a closed taxonomy: every failure a caller can observe is one of
/// these kinds, so callers branch on the variant rather than on message text.
#[derive(Debug, Error)]
pub enum A2AError {
    /// Discovery document missing or invalid
    #[error("Agent card error: {0}")]
    AgentCard(String),

    /// The remote executed the invocation but reported failure
    #[error("Invocation failed ({code}): {message}")]
    Invocation {
        code: i64,
        message: String,
        /// HTTP status carrying the failure, when one applies
        status: Option<u16>,
    },

    /// The named capability is not advertised by the remote agent
    #[error("Skill not found: {skill} (available: {})", .available.join(", "))]
    SkillNotFound {
        skill: String,
        available: Vec<String>,
    },

    /// Credential rejection, locally or by the remote (401/403)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Malformed input or request shape
    #[error("Validation error: {0}")]
    Validation(String),

    /// No response within the configured deadline
    #[error("Request timeout")]
    Timeout,

    /// Connection-level failure (refused, reset, DNS) or server-side fault
    #[error("Network error: {0}")]
    Network(String),

    /// Response violates the expected wire shape
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Anything the classifier cannot place in a more specific kind
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl A2AError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Only connection-level and deadline failures are transient; everything
    /// else is permanent and must surface to the caller on the first attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, A2AError::Timeout | A2AError::Network(_))
    }

    /// Short machine-readable name for the error kind, used in wire bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            A2AError::AgentCard(_) => "agent_card_error",
            A2AError::Invocation { .. } => "invocation_error",
            A2AError::SkillNotFound { .. } => "skill_not_found",
            A2AError::Auth(_) => "authentication_error",
            A2AError::Validation(_) => "validation_error",
            A2AError::Timeout => "timeout_error",
            A2AError::Network(_) => "network_error",
            A2AError::Protocol(_) => "protocol_error",
            A2AError::Unknown(_) => "unknown_error",
        }
    }

    /// JSON-RPC error code for this kind, used in the `/invoke` error object.
    pub fn jsonrpc_code(&self) -> i64 {
        match self {
            A2AError::Validation(_) => -32602,
            A2AError::SkillNotFound { .. } => -32601,
            A2AError::Protocol(_) => -32700,
            A2AError::Invocation { code, .. } => *code,
            _ => -32000,
        }
    }
}

/// Result type alias for A2A operations
pub type A2AResult<T> = Result<T, A2AError>;

/// Classification of transport failures into the taxonomy.
///
/// Total by construction: every `reqwest::Error` lands in exactly one typed
/// kind and the original is never re-raised.
impl From<reqwest::Error> for A2AError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            A2AError::Timeout
        } else if err.is_connect() || err.is_request() {
            A2AError::Network(format!("Connection error: {}", err))
        } else if err.is_decode() || err.is_body() {
            A2AError::Protocol(format!("Malformed response body: {}", err))
        } else {
            A2AError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::Protocol(format!("JSON error: {}", err))
    }
}
