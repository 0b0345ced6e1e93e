//! Wire codecs for the A2A protocol

pub mod jsonrpc;
pub mod sse;

pub use jsonrpc::{InvocationResult, InvocationStatus, JsonRpcCodec};
pub use sse::{SseFrame, StreamAccumulator, StreamEvent, StreamEventKind, StreamState};

use crate::{
    protocol::{error::A2AError, operation::A2AOperation},
    service::response::A2AResponse,
    transport::TransportResponse,
};
use bytes::Bytes;

/// Codec trait for encoding and decoding A2A protocol messages
///
/// The codec owns the wire envelope: it turns operations into request bodies
/// and transport responses into typed protocol responses. Decoding receives
/// the full transport response because some operations validate headers
/// (content type, cache validators) as well as the body.
pub trait Codec: Send + Sync {
    /// Serialize an A2A operation to a request body
    fn encode_request(&self, operation: &A2AOperation) -> Result<Bytes, A2AError>;

    /// Deserialize a transport response into an A2A response
    fn decode_response(
        &self,
        response: &TransportResponse,
        operation: &A2AOperation,
    ) -> Result<A2AResponse, A2AError>;

    /// The request content type for this codec
    fn content_type(&self) -> &str;
}
