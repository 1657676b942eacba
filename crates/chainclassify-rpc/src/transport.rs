//! The `RpcTransport` trait — the seam between request building and the wire.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// Sends JSON-RPC requests to one node.
///
/// Object-safe, so it can be stored as `Arc<dyn RpcTransport>` and shared by
/// every pipeline worker.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// The transport's identifier (URL or name).
    fn url(&self) -> &str;
}
